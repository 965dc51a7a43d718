use dispatcher::Job;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Candidates returned when the caller gives no usable `top_k`
pub const DEFAULT_TOP_K: i32 = 5;

/// `top_k` as sent to the collaborator: absent or non-positive means the default
pub fn effective_top_k(top_k: Option<i32>) -> i32 {
    match top_k {
        Some(k) if k > 0 => k,
        _ => DEFAULT_TOP_K,
    }
}

// ===== Dispatcher Jobs =====

/// Work accepted by the ingest dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestJob {
    /// Tokenize `text` and store its embedding
    Insert { text: String },
    /// Tokenize `text` and look up the most similar stored texts
    FindSimilar { text: String, top_k: Option<i32> },
}

impl IngestJob {
    pub fn insert(text: impl Into<String>) -> Self {
        IngestJob::Insert { text: text.into() }
    }

    pub fn find_similar(text: impl Into<String>, top_k: Option<i32>) -> Self {
        IngestJob::FindSimilar {
            text: text.into(),
            top_k,
        }
    }
}

impl Job for IngestJob {
    fn kind(&self) -> &'static str {
        match self {
            IngestJob::Insert { .. } => "insert",
            IngestJob::FindSimilar { .. } => "find_similar",
        }
    }
}

/// Successful result of an [`IngestJob`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Inserted,
    /// Decoded candidate texts, most similar first
    Similar(Vec<String>),
}

// ===== HTTP Request/Response Types =====

/// Request to store a text
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct InsertRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// Request to find texts similar to `text`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct FindSimilarRequest {
    #[serde(default)]
    pub text: Option<String>,
    /// Number of candidates; absent or non-positive means 5
    #[serde(default)]
    pub top_k: Option<i32>,
}

/// Response body for every ingest endpoint
///
/// `status` is `"ok"` or `"error"`; callers must inspect it even on HTTP 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similar_texts: Option<Vec<String>>,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            error: None,
            similar_texts: None,
        }
    }

    pub fn similar(texts: Vec<String>) -> Self {
        Self {
            similar_texts: Some(texts),
            ..Self::ok()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: Some(message.into()),
            similar_texts: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_top_k() {
        assert_eq!(effective_top_k(None), 5);
        assert_eq!(effective_top_k(Some(0)), 5);
        assert_eq!(effective_top_k(Some(-2)), 5);
        assert_eq!(effective_top_k(Some(12)), 12);
    }

    #[test]
    fn test_job_kind() {
        assert_eq!(IngestJob::insert("a").kind(), "insert");
        assert_eq!(IngestJob::find_similar("a", None).kind(), "find_similar");
    }

    #[test]
    fn test_status_response_shape() {
        assert_eq!(
            serde_json::to_value(StatusResponse::ok()).unwrap(),
            serde_json::json!({ "status": "ok" })
        );
        assert_eq!(
            serde_json::to_value(StatusResponse::similar(vec!["hi".into()])).unwrap(),
            serde_json::json!({ "status": "ok", "similar_texts": ["hi"] })
        );
        assert_eq!(
            serde_json::to_value(StatusResponse::error("timeout")).unwrap(),
            serde_json::json!({ "status": "error", "error": "timeout" })
        );
    }

    #[test]
    fn test_requests_tolerate_missing_fields() {
        let req: FindSimilarRequest = serde_json::from_str(r#"{"text": "hello"}"#).unwrap();
        assert_eq!(req.text.as_deref(), Some("hello"));
        assert_eq!(req.top_k, None);

        let req: InsertRequest = serde_json::from_str("{}").unwrap();
        assert!(req.text.is_none());
    }
}
