//! Prometheus metrics for the dispatcher

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::time::Duration;
use tracing::info;

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder
///
/// Call this once at startup. Subsequent calls return the existing handle.
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    PROMETHEUS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;
        info!("Prometheus metrics initialized");
        Ok(handle)
    })
}

/// Get the Prometheus handle for rendering metrics
pub fn prometheus_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

/// Dispatcher metrics helper
#[derive(Debug, Clone)]
pub struct DispatcherMetrics {
    dispatcher: String,
    processor: String,
}

impl DispatcherMetrics {
    pub fn new(dispatcher: impl Into<String>, processor: impl Into<String>) -> Self {
        Self {
            dispatcher: dispatcher.into(),
            processor: processor.into(),
        }
    }

    /// Record a job accepted into the queue
    pub fn job_submitted(&self, kind: &'static str) {
        counter!(
            "dispatcher_jobs_submitted_total",
            "dispatcher" => self.dispatcher.clone(),
            "kind" => kind
        )
        .increment(1);
    }

    /// Record a job turned away before it was queued
    pub fn job_rejected(&self, reason: &'static str) {
        counter!(
            "dispatcher_jobs_rejected_total",
            "dispatcher" => self.dispatcher.clone(),
            "reason" => reason
        )
        .increment(1);
    }

    /// Record a processed job and how long the worker spent on it
    pub fn job_processed(&self, kind: &'static str, duration: Duration) {
        counter!(
            "dispatcher_jobs_processed_total",
            "dispatcher" => self.dispatcher.clone(),
            "processor" => self.processor.clone(),
            "kind" => kind
        )
        .increment(1);

        histogram!(
            "dispatcher_job_duration_seconds",
            "dispatcher" => self.dispatcher.clone(),
            "processor" => self.processor.clone(),
            "kind" => kind
        )
        .record(duration.as_secs_f64());
    }

    /// Record a job whose processor panicked
    pub fn job_panicked(&self, kind: &'static str) {
        counter!(
            "dispatcher_jobs_panicked_total",
            "dispatcher" => self.dispatcher.clone(),
            "processor" => self.processor.clone(),
            "kind" => kind
        )
        .increment(1);
    }

    /// Record a caller that gave up waiting
    pub fn job_timed_out(&self, kind: &'static str) {
        counter!(
            "dispatcher_jobs_timed_out_total",
            "dispatcher" => self.dispatcher.clone(),
            "kind" => kind
        )
        .increment(1);
    }

    /// Record a result that arrived after its caller stopped waiting
    pub fn late_result(&self, kind: &'static str) {
        counter!(
            "dispatcher_late_results_total",
            "dispatcher" => self.dispatcher.clone(),
            "kind" => kind
        )
        .increment(1);
    }

    /// Time between enqueue and a worker picking the job up
    pub fn queue_wait(&self, duration: Duration) {
        histogram!(
            "dispatcher_queue_wait_seconds",
            "dispatcher" => self.dispatcher.clone()
        )
        .record(duration.as_secs_f64());
    }

    pub fn queue_depth(&self, depth: usize) {
        gauge!(
            "dispatcher_queue_depth",
            "dispatcher" => self.dispatcher.clone()
        )
        .set(depth as f64);
    }

    pub fn pending(&self, count: usize) {
        gauge!(
            "dispatcher_pending_results",
            "dispatcher" => self.dispatcher.clone()
        )
        .set(count as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = DispatcherMetrics::new("ingest", "ingest_processor");
        assert_eq!(metrics.dispatcher, "ingest");
        assert_eq!(metrics.processor, "ingest_processor");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        let metrics = DispatcherMetrics::new("ingest", "ingest_processor");
        metrics.job_submitted("insert");
        metrics.queue_depth(3);
    }
}
