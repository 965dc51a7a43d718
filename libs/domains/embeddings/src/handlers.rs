use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};
use tracing::{debug, warn};
use utoipa::OpenApi;

use crate::error::{EmbeddingsError, EmbeddingsResult};
use crate::models::{FindSimilarRequest, IngestJob, IngestOutcome, InsertRequest, StatusResponse};
use crate::processor::IngestDispatcher;

fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> EmbeddingsResult<T> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            debug!(error = %rejection, "Rejected request body");
            Err(EmbeddingsError::invalid_json())
        }
    }
}

fn required_text(text: Option<String>) -> EmbeddingsResult<String> {
    text.filter(|t| !t.is_empty())
        .ok_or_else(|| EmbeddingsError::missing_field("text"))
}

fn log_failure(operation: &'static str, err: &EmbeddingsError) {
    match err {
        EmbeddingsError::InvalidInput(_) => {}
        EmbeddingsError::Overloaded | EmbeddingsError::Timeout => {
            debug!(operation, error = %err, "Request not served")
        }
        _ => warn!(operation, error = %err, "Request failed"),
    }
}

/// Tokenize and store a text
#[utoipa::path(
    post,
    path = "/insert",
    tag = "embeddings",
    request_body = InsertRequest,
    responses(
        (status = 200, description = "Outcome in `status`; business failures carry `error`", body = StatusResponse),
        (status = 400, description = "Invalid JSON or missing text", body = StatusResponse),
        (status = 503, description = "Server overloaded", body = StatusResponse)
    )
)]
pub async fn insert(
    State(dispatcher): State<Arc<IngestDispatcher>>,
    payload: Result<Json<InsertRequest>, JsonRejection>,
) -> EmbeddingsResult<Json<StatusResponse>> {
    submit_insert(&dispatcher, payload)
        .await
        .map(Json)
        .inspect_err(|e| log_failure("insert", e))
}

async fn submit_insert(
    dispatcher: &IngestDispatcher,
    payload: Result<Json<InsertRequest>, JsonRejection>,
) -> EmbeddingsResult<StatusResponse> {
    let text = required_text(parse_body(payload)?.text)?;
    dispatcher.submit(IngestJob::insert(text)).await??;
    Ok(StatusResponse::ok())
}

/// Find the stored texts most similar to a text
#[utoipa::path(
    post,
    path = "/find_similar",
    tag = "embeddings",
    request_body = FindSimilarRequest,
    responses(
        (status = 200, description = "Similar texts, most similar first, or an error in `error`", body = StatusResponse),
        (status = 400, description = "Invalid JSON or missing text", body = StatusResponse),
        (status = 503, description = "Server overloaded", body = StatusResponse)
    )
)]
pub async fn find_similar(
    State(dispatcher): State<Arc<IngestDispatcher>>,
    payload: Result<Json<FindSimilarRequest>, JsonRejection>,
) -> EmbeddingsResult<Json<StatusResponse>> {
    submit_find_similar(&dispatcher, payload)
        .await
        .map(Json)
        .inspect_err(|e| log_failure("find_similar", e))
}

async fn submit_find_similar(
    dispatcher: &IngestDispatcher,
    payload: Result<Json<FindSimilarRequest>, JsonRejection>,
) -> EmbeddingsResult<StatusResponse> {
    let req = parse_body(payload)?;
    let text = required_text(req.text)?;
    match dispatcher.submit(IngestJob::find_similar(text, req.top_k)).await?? {
        IngestOutcome::Similar(texts) => Ok(StatusResponse::similar(texts)),
        other => Err(EmbeddingsError::Internal(format!(
            "unexpected outcome for find_similar: {:?}",
            other
        ))),
    }
}

/// OpenAPI documentation for the ingest endpoints
#[derive(OpenApi)]
#[openapi(
    paths(insert, find_similar),
    components(schemas(InsertRequest, FindSimilarRequest, StatusResponse)),
    tags(
        (name = "embeddings", description = "Text ingestion and similarity search")
    )
)]
pub struct EmbeddingsApiDoc;

/// Create router for the ingest endpoints
pub fn router(dispatcher: Arc<IngestDispatcher>) -> Router {
    Router::new()
        .route("/insert", post(insert))
        .route("/find_similar", post(find_similar))
        .with_state(dispatcher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{EmbeddingClient, MockEmbeddingClient};
    use crate::processor::IngestProcessor;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use dispatcher::{Dispatcher, DispatcherConfig};
    use domain_tokenizer::{MergeTable, TokenId};
    use std::time::Duration;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app_with(client: Arc<dyn EmbeddingClient>, config: DispatcherConfig) -> Router {
        let table = Arc::new(MergeTable::from_rules(Vec::new()).unwrap());
        let dispatcher = Dispatcher::start(IngestProcessor::new(table, client), config);
        router(Arc::new(dispatcher))
    }

    fn app(client: MockEmbeddingClient) -> Router {
        app_with(Arc::new(client), DispatcherConfig::new("test").with_workers(2))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_insert_ok() {
        let mut client = MockEmbeddingClient::new();
        client
            .expect_generate_embeddings()
            .withf(|tokens, text, _| tokens.len() == 5 && text == "hello")
            .times(1)
            .returning(|_, _, _| Ok(()));

        let (status, body) = call(app(client), post_json("/insert", r#"{"text": "hello"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_insert_empty_text_never_reaches_dispatcher() {
        for body in [r#"{"text": ""}"#, "{}", r#"{"other": 1}"#] {
            let mut client = MockEmbeddingClient::new();
            client.expect_generate_embeddings().never();
            let (status, json) = call(app(client), post_json("/insert", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(
                json,
                serde_json::json!({ "status": "error", "error": "missing required field: text" })
            );
        }
    }

    #[tokio::test]
    async fn test_invalid_json_is_rejected() {
        for uri in ["/insert", "/find_similar"] {
            let (status, json) = call(app(MockEmbeddingClient::new()), post_json(uri, "{not json")).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json, serde_json::json!({ "status": "error", "error": "invalid JSON" }));
        }
    }

    #[tokio::test]
    async fn test_insert_upstream_failure_is_reported_in_body() {
        let mut client = MockEmbeddingClient::new();
        client
            .expect_generate_embeddings()
            .returning(|_, _, _| Err(EmbeddingsError::UpstreamUnavailable("connection refused".into())));

        let (status, json) = call(app(client), post_json("/insert", r#"{"text": "hello"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "embedding service unavailable: connection refused");
    }

    #[tokio::test]
    async fn test_find_similar_default_top_k_matches_explicit() {
        let mut client = MockEmbeddingClient::new();
        client
            .expect_find_similar_embeddings()
            .withf(|_, top_k, _| *top_k == 5)
            .times(2)
            .returning(|_, _, _| Ok(vec![STANDARD.encode("hello world")]));
        let app = app(client);

        let (_, implicit) = call(app.clone(), post_json("/find_similar", r#"{"text": "hello"}"#)).await;
        let (_, explicit) = call(app, post_json("/find_similar", r#"{"text": "hello", "top_k": 5}"#)).await;

        assert_eq!(implicit, explicit);
        assert_eq!(
            implicit,
            serde_json::json!({ "status": "ok", "similar_texts": ["hello world"] })
        );
    }

    #[tokio::test]
    async fn test_find_similar_bad_candidate() {
        let mut client = MockEmbeddingClient::new();
        client
            .expect_find_similar_embeddings()
            .returning(|_, _, _| Ok(vec!["***".to_string()]));

        let (status, json) = call(app(client), post_json("/find_similar", r#"{"text": "hello"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "error");
        assert!(json["error"].as_str().unwrap().starts_with("invalid candidate encoding"));
        assert!(json.get("similar_texts").is_none());
    }

    /// Never answers within the dispatcher timeout
    struct StalledClient;

    #[async_trait]
    impl EmbeddingClient for StalledClient {
        async fn generate_embeddings(&self, _: &[TokenId], _: &str, _: Uuid) -> EmbeddingsResult<()> {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok(())
        }

        async fn find_similar_embeddings(
            &self,
            _: &[TokenId],
            _: i32,
            _: Uuid,
        ) -> EmbeddingsResult<Vec<String>> {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_timeout_is_reported_in_body() {
        let app = app_with(
            Arc::new(StalledClient),
            DispatcherConfig::new("test")
                .with_workers(1)
                .with_submit_timeout(Duration::from_millis(20)),
        );

        let (status, json) = call(app, post_json("/insert", r#"{"text": "slow"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({ "status": "error", "error": "timeout" }));
    }
}
