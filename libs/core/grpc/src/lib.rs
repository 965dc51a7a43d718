//! # gRPC Client Library
//!
//! Channel creation with HTTP/2 tuning and a retry helper for unary RPCs.
//!
//! ## Features
//!
//! - **Lazy Channels**: start without the upstream; connect on first RPC and
//!   reconnect after it restarts
//! - **Per-RPC Timeout**: every call on a channel is bounded
//! - **Retry Logic**: fixed backoff on `UNAVAILABLE`, other codes fail fast
//!
//! ## Quick Start
//!
//! ```ignore
//! use grpc_client::{create_channel_lazy, retry, ChannelConfig, RetryConfig};
//! use rpc::embeddings::embeddings_client::EmbeddingsClient;
//! use std::time::Duration;
//!
//! let config = ChannelConfig::default().with_request_timeout(Duration::from_secs(10));
//! let client = EmbeddingsClient::new(create_channel_lazy("http://[::1]:50053", &config)?);
//!
//! let response = retry(&RetryConfig::default(), "find_similar_embeddings", || {
//!     let mut client = client.clone();
//!     let request = request.clone();
//!     async move { client.find_similar_embeddings(request).await }
//! })
//! .await?;
//! ```

pub mod channel;
pub mod error;
pub mod retry;

pub use channel::{ChannelConfig, create_channel_lazy};
pub use error::{GrpcError, GrpcResult};
pub use retry::{RetryConfig, retry};
