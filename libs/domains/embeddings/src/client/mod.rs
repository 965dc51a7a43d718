//! Embedding collaborator client contract and its gRPC implementation

pub mod config;
pub mod grpc;

pub use config::EmbeddingsClientConfig;
pub use grpc::{CORRELATION_ID_METADATA, GrpcEmbeddingClient};

use async_trait::async_trait;
use domain_tokenizer::TokenId;
use uuid::Uuid;

use crate::error::EmbeddingsResult;

/// Client for the external embedding and similarity service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Embed `token_ids` and persist the vector alongside `text`
    async fn generate_embeddings(
        &self,
        token_ids: &[TokenId],
        text: &str,
        correlation_id: Uuid,
    ) -> EmbeddingsResult<()>;

    /// Base64-encoded texts most similar to `token_ids`, most similar first
    async fn find_similar_embeddings(
        &self,
        token_ids: &[TokenId],
        top_k: i32,
        correlation_id: Uuid,
    ) -> EmbeddingsResult<Vec<String>>;
}
