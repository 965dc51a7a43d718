use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::error::TokenizerResult;
use crate::table::MergeTable;
use crate::types::TokenId;

// ===== HTTP Request/Response Types =====

/// Encoded token ids and the text of each token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EncodeResponse {
    pub tokens: Vec<TokenId>,
    pub token_texts: Vec<String>,
}

/// Token ids to decode
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DecodeRequest {
    pub tokens: Vec<TokenId>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VocabularySizeResponse {
    /// Highest token id plus one
    pub vocabulary_size: u64,
}

// ===== Handlers =====

/// Encode a JSON string into token ids
#[utoipa::path(
    post,
    path = "/encode",
    tag = "tokenizer",
    request_body = String,
    responses(
        (status = 200, description = "Encoded tokens", body = EncodeResponse),
        (status = 400, description = "Body is not a JSON string")
    )
)]
pub async fn encode(
    State(table): State<Arc<MergeTable>>,
    Json(text): Json<String>,
) -> TokenizerResult<Json<EncodeResponse>> {
    let tokens = table.encode(&text);
    let token_texts = table.token_texts(&tokens)?;

    Ok(Json(EncodeResponse {
        tokens,
        token_texts,
    }))
}

/// Decode token ids back into text
#[utoipa::path(
    post,
    path = "/decode",
    tag = "tokenizer",
    request_body = DecodeRequest,
    responses(
        (status = 200, description = "Decoded text", body = String),
        (status = 400, description = "Unknown token id")
    )
)]
pub async fn decode(
    State(table): State<Arc<MergeTable>>,
    Json(req): Json<DecodeRequest>,
) -> TokenizerResult<Json<String>> {
    Ok(Json(table.decode(&req.tokens)?))
}

/// Report the vocabulary size of the loaded table
#[utoipa::path(
    get,
    path = "/vocabulary-size",
    tag = "tokenizer",
    responses(
        (status = 200, description = "Vocabulary size", body = VocabularySizeResponse)
    )
)]
pub async fn vocabulary_size(State(table): State<Arc<MergeTable>>) -> Json<VocabularySizeResponse> {
    Json(VocabularySizeResponse {
        vocabulary_size: table.vocabulary_size(),
    })
}

/// OpenAPI documentation for the tokenizer debug API
#[derive(OpenApi)]
#[openapi(
    paths(encode, decode, vocabulary_size),
    components(schemas(EncodeResponse, DecodeRequest, VocabularySizeResponse)),
    tags(
        (name = "tokenizer", description = "Tokenizer encode/decode debugging")
    )
)]
pub struct TokenizerApiDoc;

/// Create router for the tokenizer debug endpoints
pub fn router(table: Arc<MergeTable>) -> Router {
    Router::new()
        .route("/encode", post(encode))
        .route("/decode", post(decode))
        .route("/vocabulary-size", get(vocabulary_size))
        .with_state(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MergeRule;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        let table = MergeTable::from_rules(vec![
            MergeRule { left: 'a' as TokenId, right: 'a' as TokenId, id: 200 },
            MergeRule { left: 200, right: 'b' as TokenId, id: 201 },
        ])
        .unwrap();
        router(Arc::new(table))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_encode_returns_tokens_and_texts() {
        let response = app().oneshot(post_json("/encode", "\"aabc\"")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["tokens"], serde_json::json!([201, 99]));
        assert_eq!(body["token_texts"], serde_json::json!(["aab", "c"]));
    }

    #[tokio::test]
    async fn test_encode_characters_above_minted_ids() {
        let response = app().oneshot(post_json("/encode", "\"aaé\"")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["tokens"], serde_json::json!([200, 233]));
        assert_eq!(body["token_texts"], serde_json::json!(["aa", "é"]));
    }

    #[tokio::test]
    async fn test_decode_round_trips() {
        let response = app()
            .oneshot(post_json("/decode", r#"{"tokens": [201, 99]}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!("aabc"));
    }

    #[tokio::test]
    async fn test_decode_unknown_token_is_bad_request() {
        let response = app()
            .oneshot(post_json("/decode", r#"{"tokens": [250]}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_vocabulary_size() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/vocabulary-size")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "vocabulary_size": 202 })
        );
    }
}
