use std::path::PathBuf;

use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

use crate::types::TokenId;

#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("Corrupt vocabulary: {0}")]
    CorruptVocabulary(String),

    #[error("Unknown token: {0}")]
    UnknownToken(TokenId),

    #[error("No mergeable pairs left after {merges} merges (compression ratio {ratio:.3})")]
    NoMergeablePairs { merges: usize, ratio: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Corpus contains no sentences")]
    EmptyCorpus,

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type TokenizerResult<T> = Result<T, TokenizerError>;

impl TokenizerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TokenizerError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        TokenizerError::CorruptVocabulary(msg.into())
    }
}

impl From<TokenizerError> for tonic::Status {
    fn from(err: TokenizerError) -> Self {
        match err {
            TokenizerError::UnknownToken(id) => {
                tonic::Status::invalid_argument(format!("Unknown token: {}", id))
            }
            TokenizerError::InvalidConfig(msg) => tonic::Status::invalid_argument(msg),
            TokenizerError::CorruptVocabulary(msg) => {
                tonic::Status::failed_precondition(format!("Corrupt vocabulary: {}", msg))
            }
            other => tonic::Status::internal(other.to_string()),
        }
    }
}

/// Convert TokenizerError to AppError for standardized HTTP error responses
impl From<TokenizerError> for AppError {
    fn from(err: TokenizerError) -> Self {
        match err {
            TokenizerError::UnknownToken(id) => AppError::BadRequest(format!("Unknown token: {}", id)),
            TokenizerError::InvalidConfig(msg) => AppError::BadRequest(msg),
            TokenizerError::Io { source, .. } => AppError::Io(source),
            other => AppError::InternalServerError(other.to_string()),
        }
    }
}

impl IntoResponse for TokenizerError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_mergeable_pairs_message_carries_progress() {
        let err = TokenizerError::NoMergeablePairs {
            merges: 12,
            ratio: 1.25,
        };
        let msg = err.to_string();
        assert!(msg.contains("12 merges"));
        assert!(msg.contains("1.250"));
    }

    #[test]
    fn test_unknown_token_maps_to_invalid_argument() {
        let status: tonic::Status = TokenizerError::UnknownToken(70_000).into();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
        assert!(status.message().contains("70000"));
    }

    #[test]
    fn test_io_error_displays_path() {
        let err = TokenizerError::io(
            "artifacts/merges.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("artifacts/merges.json"));
    }
}
