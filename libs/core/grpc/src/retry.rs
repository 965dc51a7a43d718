//! Retry helpers for unary RPCs
//!
//! Retries only on status codes that mean "the upstream could not be
//! reached": by default `UNAVAILABLE`. Every other status is returned to the
//! caller after the first attempt.

use std::future::Future;
use std::time::Duration;
use tonic::{Code, Status};

/// Retry policy with a fixed delay between attempts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay between attempts
    pub backoff: Duration,
    /// Status codes that trigger another attempt
    pub retry_on: Vec<Code>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(1000),
            retry_on: vec![Code::Unavailable],
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the total number of attempts (at least one)
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_retry_on(mut self, codes: impl IntoIterator<Item = Code>) -> Self {
        self.retry_on = codes.into_iter().collect();
        self
    }

    pub fn should_retry(&self, status: &Status) -> bool {
        self.retry_on.contains(&status.code())
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable status, or
/// runs out of attempts. The last status is returned on failure.
///
/// ## Example
/// ```ignore
/// use grpc_client::{retry, RetryConfig};
///
/// let response = retry(&RetryConfig::default(), "generate_embeddings", || {
///     let mut client = client.clone();
///     let request = request.clone();
///     async move { client.generate_embeddings(request).await }
/// })
/// .await?;
/// ```
pub async fn retry<T, F, Fut>(config: &RetryConfig, operation_name: &str, mut operation: F) -> Result<T, Status>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Status>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(target: "grpc_client", operation = operation_name, attempt, "RPC succeeded after retry");
                }
                return Ok(value);
            }
            Err(status) if attempt < max_attempts && config.should_retry(&status) => {
                tracing::warn!(
                    target: "grpc_client",
                    operation = operation_name,
                    attempt,
                    max_attempts,
                    code = ?status.code(),
                    backoff_ms = config.backoff.as_millis() as u64,
                    "RPC failed, retrying"
                );
                tokio::time::sleep(config.backoff).await;
                attempt += 1;
            }
            Err(status) => {
                if config.should_retry(&status) {
                    tracing::error!(
                        target: "grpc_client",
                        operation = operation_name,
                        attempts = attempt,
                        code = ?status.code(),
                        "RPC failed after exhausting retries"
                    );
                }
                return Err(status);
            }
        }
    }
}
