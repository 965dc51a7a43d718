//! `tokenizer.Tokenizer` gRPC service backed by a loaded [`MergeTable`].

use std::sync::Arc;

use rpc::tokenizer::tokenizer_server::Tokenizer;
use rpc::tokenizer::{EncodeRequest, EncodeResponse};
use tonic::{Request, Response, Status};
use tracing::debug;

use crate::table::MergeTable;

#[derive(Debug, Clone)]
pub struct TokenizerService {
    table: Arc<MergeTable>,
}

impl TokenizerService {
    pub fn new(table: Arc<MergeTable>) -> Self {
        Self { table }
    }
}

#[tonic::async_trait]
impl Tokenizer for TokenizerService {
    async fn encode(
        &self,
        request: Request<EncodeRequest>,
    ) -> Result<Response<EncodeResponse>, Status> {
        let req = request.into_inner();
        let tokens = self.table.encode(&req.text);
        let token_texts = self.table.token_texts(&tokens).map_err(Status::from)?;

        debug!(chars = req.text.chars().count(), tokens = tokens.len(), "Encoded text");

        Ok(Response::new(EncodeResponse {
            tokens: tokens.into_iter().map(i64::from).collect(),
            token_texts,
        }))
    }
}
