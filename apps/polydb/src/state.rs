//! Application state management.
//!
//! The state holds the loaded merge table and the ingest dispatcher. Both
//! are behind `Arc`, so cloning the state per handler is cheap.

use std::sync::Arc;

use dispatcher::Dispatcher;
use domain_embeddings::{EmbeddingClient, IngestDispatcher, IngestProcessor};
use domain_tokenizer::MergeTable;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: Config,
    /// Read-only merge table shared by HTTP, gRPC and the ingest workers
    pub table: Arc<MergeTable>,
    /// Worker pool running insert and find_similar jobs
    pub dispatcher: Arc<IngestDispatcher>,
}

impl AppState {
    /// Start the ingest dispatcher around `table` and `client`.
    ///
    /// Must be called inside a Tokio runtime; the worker tasks start here.
    pub fn new(config: Config, table: MergeTable, client: Arc<dyn EmbeddingClient>) -> Self {
        let table = Arc::new(table);
        let processor = IngestProcessor::new(Arc::clone(&table), client);
        let dispatcher = Dispatcher::start(processor, config.dispatcher.clone());

        Self {
            config,
            table,
            dispatcher: Arc::new(dispatcher),
        }
    }
}
