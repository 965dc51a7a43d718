use async_trait::async_trait;
use domain_tokenizer::TokenId;
use grpc_client::{RetryConfig, create_channel_lazy, retry};
use rpc::embeddings::embeddings_client::EmbeddingsClient;
use rpc::embeddings::{EmbeddingsRequest, FindSimilarRequest};
use std::time::Duration;
use tonic::Request;
use tonic::transport::Channel;
use tracing::{debug, warn};
use uuid::Uuid;

use super::EmbeddingClient;
use super::config::EmbeddingsClientConfig;
use crate::error::{EmbeddingsError, EmbeddingsResult};

/// Metadata key carrying the dispatcher's correlation id
pub const CORRELATION_ID_METADATA: &str = "x-correlation-id";

/// [`EmbeddingClient`] over the `embeddings.Embeddings` gRPC service
///
/// Cloning is cheap; clones share one pooled HTTP/2 connection.
#[derive(Debug, Clone)]
pub struct GrpcEmbeddingClient {
    client: EmbeddingsClient<Channel>,
    retry: RetryConfig,
    rpc_timeout: Duration,
}

impl GrpcEmbeddingClient {
    /// Build a client whose channel connects on the first RPC
    pub fn connect_lazy(config: &EmbeddingsClientConfig) -> EmbeddingsResult<Self> {
        let channel = create_channel_lazy(&config.addr, &config.channel_config())
            .map_err(|e| EmbeddingsError::UpstreamUnavailable(e.to_string()))?;

        debug!(addr = %config.addr, "Embeddings client created");
        Ok(Self::new(channel, config.retry_config(), config.rpc_timeout))
    }

    pub fn new(channel: Channel, retry: RetryConfig, rpc_timeout: Duration) -> Self {
        Self {
            client: EmbeddingsClient::new(channel),
            retry,
            rpc_timeout,
        }
    }

    fn request<T>(&self, message: T, correlation_id: Uuid) -> Request<T> {
        let mut request = Request::new(message);
        request.set_timeout(self.rpc_timeout);
        if let Ok(value) = correlation_id.to_string().parse() {
            request.metadata_mut().insert(CORRELATION_ID_METADATA, value);
        }
        request
    }
}

fn to_wire(token_ids: &[TokenId]) -> Vec<i64> {
    token_ids.iter().map(|&id| i64::from(id)).collect()
}

#[async_trait]
impl EmbeddingClient for GrpcEmbeddingClient {
    async fn generate_embeddings(
        &self,
        token_ids: &[TokenId],
        text: &str,
        correlation_id: Uuid,
    ) -> EmbeddingsResult<()> {
        let message = EmbeddingsRequest {
            token_ids: to_wire(token_ids),
            text: text.to_string(),
            correlation_id: correlation_id.to_string(),
        };

        let response = retry(&self.retry, "generate_embeddings", || {
            let mut client = self.client.clone();
            let request = self.request(message.clone(), correlation_id);
            async move { client.generate_embeddings(request).await }
        })
        .await?
        .into_inner();

        if !response.success {
            warn!(
                correlation_id = %correlation_id,
                error = %response.error_message,
                "Embedding service rejected insert"
            );
            return Err(EmbeddingsError::UpstreamError(response.error_message));
        }
        Ok(())
    }

    async fn find_similar_embeddings(
        &self,
        token_ids: &[TokenId],
        top_k: i32,
        correlation_id: Uuid,
    ) -> EmbeddingsResult<Vec<String>> {
        let message = FindSimilarRequest {
            token_ids: to_wire(token_ids),
            top_k,
        };

        let response = retry(&self.retry, "find_similar_embeddings", || {
            let mut client = self.client.clone();
            let request = self.request(message.clone(), correlation_id);
            async move { client.find_similar_embeddings(request).await }
        })
        .await?
        .into_inner();

        Ok(response.similar_texts)
    }
}
