//! Tokenizer Domain Library
//!
//! Byte-pair-encoding over Unicode code points: learn a merge table from a
//! corpus, then encode and decode text deterministically with it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   train    ┌────────────┐  save/load  ┌───────────────────┐
//! │  Corpus  │ ─────────▶ │ MergeTable │ ◀─────────▶ │ merges.json (v1)  │
//! └──────────┘  (Trainer) └─────┬──────┘             └───────────────────┘
//!                               │ Arc<MergeTable>, read-only
//!               ┌───────────────┼────────────────┐
//!               ▼               ▼                ▼
//!          encode/decode   HTTP handlers   TokenizerService (gRPC)
//! ```
//!
//! Training and serving never overlap: a table is built once, persisted,
//! and loaded read-only when serving starts.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_tokenizer::{Corpus, MergeTable, Trainer, TrainingConfig};
//!
//! # fn example() -> Result<(), domain_tokenizer::TokenizerError> {
//! let corpus = Corpus::from_files(&["data/sentences.txt"])?;
//! let (table, report) = Trainer::new(TrainingConfig::new(5.0)).train(corpus)?;
//! table.save("artifacts/merges.json")?;
//!
//! let table = MergeTable::load("artifacts/merges.json")?;
//! let tokens = table.encode("hello world");
//! assert_eq!(table.decode(&tokens)?, "hello world");
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod corpus;
pub mod error;
pub mod grpc;
pub mod handlers;
pub mod storage;
pub mod table;
pub mod trainer;
pub mod types;

pub use corpus::Corpus;
pub use error::{TokenizerError, TokenizerResult};
pub use grpc::TokenizerService;
pub use handlers::TokenizerApiDoc;
pub use storage::{DEFAULT_VOCABULARY_PATH, VOCABULARY_FORMAT_VERSION};
pub use table::MergeTable;
pub use trainer::{
    DEFAULT_COMPRESSION_THRESHOLD, PairStatistics, Trainer, TrainingConfig, TrainingReport,
};
pub use types::{MergeRule, TokenId, TokenPair};
