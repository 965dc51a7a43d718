//! Worker-side handling of ingest jobs: encode, then call the collaborator.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use dispatcher::{Dispatcher, JobProcessor};
use domain_tokenizer::MergeTable;
use tracing::debug;
use uuid::Uuid;

use crate::client::EmbeddingClient;
use crate::error::{EmbeddingsError, EmbeddingsResult};
use crate::models::{IngestJob, IngestOutcome, effective_top_k};

/// Dispatcher running [`IngestJob`]s
pub type IngestDispatcher = Dispatcher<IngestJob, IngestProcessor>;

pub struct IngestProcessor {
    table: Arc<MergeTable>,
    client: Arc<dyn EmbeddingClient>,
}

impl IngestProcessor {
    pub fn new(table: Arc<MergeTable>, client: Arc<dyn EmbeddingClient>) -> Self {
        Self { table, client }
    }

    async fn insert(&self, correlation_id: Uuid, text: &str) -> EmbeddingsResult<IngestOutcome> {
        let tokens = self.table.encode(text);
        debug!(
            correlation_id = %correlation_id,
            chars = text.chars().count(),
            tokens = tokens.len(),
            "Inserting text"
        );

        self.client
            .generate_embeddings(&tokens, text, correlation_id)
            .await?;
        Ok(IngestOutcome::Inserted)
    }

    async fn find_similar(
        &self,
        correlation_id: Uuid,
        text: &str,
        top_k: Option<i32>,
    ) -> EmbeddingsResult<IngestOutcome> {
        let top_k = effective_top_k(top_k);
        let tokens = self.table.encode(text);
        debug!(
            correlation_id = %correlation_id,
            tokens = tokens.len(),
            top_k,
            "Finding similar texts"
        );

        let candidates = self
            .client
            .find_similar_embeddings(&tokens, top_k, correlation_id)
            .await?;

        let texts = candidates
            .iter()
            .map(|candidate| decode_candidate(candidate))
            .collect::<EmbeddingsResult<Vec<_>>>()?;
        Ok(IngestOutcome::Similar(texts))
    }
}

/// Candidates travel base64-encoded; any bad candidate fails the whole request.
fn decode_candidate(candidate: &str) -> EmbeddingsResult<String> {
    let bytes = STANDARD
        .decode(candidate)
        .map_err(|e| EmbeddingsError::EncodingError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| EmbeddingsError::EncodingError(e.to_string()))
}

#[async_trait]
impl JobProcessor<IngestJob> for IngestProcessor {
    type Output = EmbeddingsResult<IngestOutcome>;

    async fn process(&self, correlation_id: Uuid, job: IngestJob) -> Self::Output {
        match job {
            IngestJob::Insert { text } => self.insert(correlation_id, &text).await,
            IngestJob::FindSimilar { text, top_k } => {
                self.find_similar(correlation_id, &text, top_k).await
            }
        }
    }

    fn name(&self) -> &'static str {
        "ingest_processor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockEmbeddingClient;
    use domain_tokenizer::{MergeRule, TokenId};
    use mockall::predicate::eq;

    fn table() -> Arc<MergeTable> {
        let rules = vec![
            MergeRule::new(('h' as TokenId, 'e' as TokenId).into(), 200),
            MergeRule::new(('l' as TokenId, 'l' as TokenId).into(), 201),
        ];
        Arc::new(MergeTable::from_rules(rules).unwrap())
    }

    fn processor(client: MockEmbeddingClient) -> IngestProcessor {
        IngestProcessor::new(table(), Arc::new(client))
    }

    #[tokio::test]
    async fn test_insert_sends_encoded_tokens() {
        let correlation_id = Uuid::new_v4();
        let mut client = MockEmbeddingClient::new();
        client
            .expect_generate_embeddings()
            .withf(move |tokens, text, id| {
                tokens == [200, 201, 'o' as TokenId] && text == "hello" && *id == correlation_id
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let outcome = processor(client)
            .process(correlation_id, IngestJob::insert("hello"))
            .await
            .unwrap();
        assert_eq!(outcome, IngestOutcome::Inserted);
    }

    #[tokio::test]
    async fn test_insert_surfaces_upstream_error() {
        let mut client = MockEmbeddingClient::new();
        client
            .expect_generate_embeddings()
            .returning(|_, _, _| Err(EmbeddingsError::UpstreamError("disk full".into())));

        let err = processor(client)
            .process(Uuid::new_v4(), IngestJob::insert("hello"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "embedding service error: disk full");
    }

    #[tokio::test]
    async fn test_find_similar_defaults_top_k_and_decodes() {
        let mut client = MockEmbeddingClient::new();
        client
            .expect_find_similar_embeddings()
            .with(eq(vec![200, 201, 'o' as TokenId]), eq(5), mockall::predicate::always())
            .times(2)
            .returning(|_, _, _| Ok(vec![STANDARD.encode("hello there"), STANDARD.encode("héllo")]));

        let processor = processor(client);
        for top_k in [None, Some(0)] {
            let outcome = processor
                .process(Uuid::new_v4(), IngestJob::find_similar("hello", top_k))
                .await
                .unwrap();
            assert_eq!(
                outcome,
                IngestOutcome::Similar(vec!["hello there".to_string(), "héllo".to_string()])
            );
        }
    }

    #[tokio::test]
    async fn test_find_similar_passes_explicit_top_k() {
        let mut client = MockEmbeddingClient::new();
        client
            .expect_find_similar_embeddings()
            .withf(|_, top_k, _| *top_k == 2)
            .times(1)
            .returning(|_, _, _| Ok(vec![]));

        let outcome = processor(client)
            .process(Uuid::new_v4(), IngestJob::find_similar("hi", Some(2)))
            .await
            .unwrap();
        assert_eq!(outcome, IngestOutcome::Similar(vec![]));
    }

    #[tokio::test]
    async fn test_one_bad_candidate_fails_request() {
        let mut client = MockEmbeddingClient::new();
        client
            .expect_find_similar_embeddings()
            .returning(|_, _, _| Ok(vec![STANDARD.encode("fine"), "%%not base64%%".to_string()]));

        let err = processor(client)
            .process(Uuid::new_v4(), IngestJob::find_similar("hello", None))
            .await
            .unwrap_err();
        assert!(matches!(err, EmbeddingsError::EncodingError(_)));
    }

    #[test]
    fn test_decode_candidate_rejects_invalid_utf8() {
        let encoded = STANDARD.encode([0xff, 0xfe]);
        assert!(matches!(
            decode_candidate(&encoded),
            Err(EmbeddingsError::EncodingError(_))
        ));
    }
}
