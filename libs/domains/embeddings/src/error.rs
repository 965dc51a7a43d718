use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dispatcher::DispatchError;
use domain_tokenizer::TokenizerError;
use thiserror::Error;

use crate::models::StatusResponse;

#[derive(Debug, Error)]
pub enum EmbeddingsError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("timeout")]
    Timeout,

    #[error("embedding service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("embedding service error: {0}")]
    UpstreamError(String),

    #[error("invalid candidate encoding: {0}")]
    EncodingError(String),

    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),

    #[error("server overloaded")]
    Overloaded,

    #[error("internal error: {0}")]
    Internal(String),
}

pub type EmbeddingsResult<T> = Result<T, EmbeddingsError>;

impl EmbeddingsError {
    pub fn invalid_json() -> Self {
        EmbeddingsError::InvalidInput("invalid JSON".to_string())
    }

    pub fn missing_field(field: &str) -> Self {
        EmbeddingsError::InvalidInput(format!("missing required field: {}", field))
    }

    /// HTTP status for this error.
    ///
    /// Business failures keep 200 with the error in the body; only input
    /// rejected at the boundary and backpressure use transport-level codes.
    pub fn status_code(&self) -> StatusCode {
        match self {
            EmbeddingsError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            EmbeddingsError::Overloaded => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::OK,
        }
    }
}

impl From<DispatchError> for EmbeddingsError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Timeout(_) => EmbeddingsError::Timeout,
            DispatchError::QueueFull => EmbeddingsError::Overloaded,
            other => EmbeddingsError::Internal(other.to_string()),
        }
    }
}

impl From<tonic::Status> for EmbeddingsError {
    fn from(status: tonic::Status) -> Self {
        match status.code() {
            tonic::Code::Unavailable => {
                EmbeddingsError::UpstreamUnavailable(status.message().to_string())
            }
            // The channel's own request timeout surfaces as Cancelled
            tonic::Code::DeadlineExceeded | tonic::Code::Cancelled => EmbeddingsError::Timeout,
            _ => EmbeddingsError::UpstreamError(status.message().to_string()),
        }
    }
}

impl IntoResponse for EmbeddingsError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(StatusResponse::error(self.to_string()))).into_response()
    }
}
