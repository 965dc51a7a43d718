//! Embeddings Domain Library
//!
//! The ingestion and query path: HTTP requests become [`IngestJob`]s, the
//! dispatcher runs them on its worker pool, and each worker tokenizes the
//! text and calls the external embedding service.
//!
//! # Architecture
//!
//! ```text
//! POST /insert, /find_similar
//!          │ validate body
//!          ▼
//! ┌──────────────────┐  submit   ┌──────────────────┐
//! │ handlers::router │ ────────▶ │ IngestDispatcher │
//! └──────────────────┘           └────────┬─────────┘
//!                                         │ worker
//!                                ┌────────▼─────────┐   encode   ┌────────────┐
//!                                │ IngestProcessor  │ ─────────▶ │ MergeTable │
//!                                └────────┬─────────┘            └────────────┘
//!                                         │
//!                                ┌────────▼─────────┐
//!                                │ EmbeddingClient  │  (trait)
//!                                │ GrpcEmbedding-   │  embeddings.Embeddings
//!                                │ Client           │
//!                                └──────────────────┘
//! ```
//!
//! Business failures are returned with HTTP 200 and `{"status": "error"}`;
//! callers must inspect the `status` field.

pub mod client;
pub mod error;
pub mod handlers;
pub mod models;
pub mod processor;

pub use client::{EmbeddingClient, EmbeddingsClientConfig, GrpcEmbeddingClient};
pub use error::{EmbeddingsError, EmbeddingsResult};
pub use handlers::EmbeddingsApiDoc;
pub use models::{
    DEFAULT_TOP_K, FindSimilarRequest, IngestJob, IngestOutcome, InsertRequest, StatusResponse,
};
pub use processor::{IngestDispatcher, IngestProcessor};
