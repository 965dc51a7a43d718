//! Error types for the dispatcher

use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors returned to a caller of [`Dispatcher::submit`](crate::Dispatcher::submit)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The job queue is at capacity; the job was not enqueued
    #[error("job queue is full")]
    QueueFull,

    /// No result arrived within the configured timeout
    #[error("timed out after {0:?} waiting for a result")]
    Timeout(Duration),

    /// The dispatcher has been shut down
    #[error("dispatcher is closed")]
    Closed,

    /// The worker handling the job dropped it without producing a result
    #[error("worker dropped the job without a result")]
    WorkerLost,

    /// A slot for this correlation id is already registered
    #[error("correlation id {0} is already pending")]
    DuplicateCorrelation(Uuid),
}

impl DispatchError {
    /// Short label used for metrics and logs
    pub fn label(&self) -> &'static str {
        match self {
            DispatchError::QueueFull => "queue_full",
            DispatchError::Timeout(_) => "timeout",
            DispatchError::Closed => "closed",
            DispatchError::WorkerLost => "worker_lost",
            DispatchError::DuplicateCorrelation(_) => "duplicate",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(DispatchError::QueueFull.label(), "queue_full");
        assert_eq!(DispatchError::Closed.label(), "closed");
        assert_eq!(DispatchError::WorkerLost.label(), "worker_lost");
        assert_eq!(
            DispatchError::DuplicateCorrelation(Uuid::nil()).label(),
            "duplicate"
        );
    }

    #[test]
    fn test_display() {
        let err = DispatchError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "timed out after 250ms waiting for a result");
        assert_eq!(err.label(), "timeout");
    }
}
