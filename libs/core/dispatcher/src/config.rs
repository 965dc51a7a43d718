//! Dispatcher configuration
//!
//! `DispatcherConfig` sizes the worker pool and the job queue and sets how
//! long a caller waits for its result.

use core_config::{env_or_default, ConfigError, FromEnv};
use std::thread;
use std::time::Duration;

/// Default time a caller waits for its result
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Queue slots per worker when no capacity is configured
pub const QUEUE_SLOTS_PER_WORKER: usize = 64;

/// Configuration for a [`Dispatcher`](crate::Dispatcher)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Name used in logs and metric labels
    pub name: String,

    /// Number of worker tasks
    pub workers: usize,

    /// Maximum number of queued, not yet started jobs
    pub queue_capacity: usize,

    /// How long `submit` waits for a result
    pub submit_timeout: Duration,
}

impl DispatcherConfig {
    /// Create a config sized to the machine's parallelism
    pub fn new(name: impl Into<String>) -> Self {
        let workers = default_workers();
        Self {
            name: name.into(),
            workers,
            queue_capacity: workers * QUEUE_SLOTS_PER_WORKER,
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
        }
    }

    /// Set the worker count (at least one)
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the queue capacity (at least one)
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    pub fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = timeout;
        self
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self::new("dispatcher")
    }
}

impl FromEnv for DispatcherConfig {
    /// Reads from environment variables:
    /// - DISPATCHER_WORKERS: defaults to the available parallelism
    /// - DISPATCHER_QUEUE_CAPACITY: defaults to workers * 64
    /// - DISPATCHER_TIMEOUT_MS: defaults to 5000
    fn from_env() -> Result<Self, ConfigError> {
        let workers = match std::env::var("DISPATCHER_WORKERS") {
            Ok(raw) => parse_positive("DISPATCHER_WORKERS", &raw)?,
            Err(_) => default_workers(),
        };

        let queue_capacity = match std::env::var("DISPATCHER_QUEUE_CAPACITY") {
            Ok(raw) => parse_positive("DISPATCHER_QUEUE_CAPACITY", &raw)?,
            Err(_) => workers * QUEUE_SLOTS_PER_WORKER,
        };

        let timeout_ms = parse_positive(
            "DISPATCHER_TIMEOUT_MS",
            &env_or_default(
                "DISPATCHER_TIMEOUT_MS",
                &DEFAULT_SUBMIT_TIMEOUT.as_millis().to_string(),
            ),
        )?;

        Ok(Self {
            name: "dispatcher".to_string(),
            workers,
            queue_capacity,
            submit_timeout: Duration::from_millis(timeout_ms as u64),
        })
    }
}

fn default_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

fn parse_positive(key: &str, raw: &str) -> Result<usize, ConfigError> {
    let value: usize = raw.trim().parse().map_err(|e| ConfigError::ParseError {
        key: key.to_string(),
        details: format!("{}", e),
    })?;
    if value == 0 {
        return Err(ConfigError::ParseError {
            key: key.to_string(),
            details: "must be at least 1".to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 3] = [
        "DISPATCHER_WORKERS",
        "DISPATCHER_QUEUE_CAPACITY",
        "DISPATCHER_TIMEOUT_MS",
    ];

    #[test]
    fn test_defaults() {
        let config = DispatcherConfig::new("ingest");
        assert_eq!(config.name, "ingest");
        assert!(config.workers >= 1);
        assert_eq!(config.queue_capacity, config.workers * QUEUE_SLOTS_PER_WORKER);
        assert_eq!(config.submit_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_builder_clamps_zero() {
        let config = DispatcherConfig::default()
            .with_workers(0)
            .with_queue_capacity(0)
            .with_submit_timeout(Duration::from_millis(10));
        assert_eq!(config.workers, 1);
        assert_eq!(config.queue_capacity, 1);
        assert_eq!(config.submit_timeout, Duration::from_millis(10));
    }

    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars(VARS.map(|k| (k, None::<&str>)), || {
            let config = DispatcherConfig::from_env().unwrap();
            assert_eq!(config.workers, default_workers());
            assert_eq!(config.queue_capacity, config.workers * QUEUE_SLOTS_PER_WORKER);
            assert_eq!(config.submit_timeout, DEFAULT_SUBMIT_TIMEOUT);
        });
    }

    #[test]
    fn test_from_env_custom_values() {
        temp_env::with_vars(
            [
                ("DISPATCHER_WORKERS", Some("3")),
                ("DISPATCHER_QUEUE_CAPACITY", None),
                ("DISPATCHER_TIMEOUT_MS", Some("750")),
            ],
            || {
                let config = DispatcherConfig::from_env().unwrap();
                assert_eq!(config.workers, 3);
                assert_eq!(config.queue_capacity, 3 * QUEUE_SLOTS_PER_WORKER);
                assert_eq!(config.submit_timeout, Duration::from_millis(750));
            },
        );
    }

    #[test]
    fn test_from_env_rejects_zero_and_garbage() {
        temp_env::with_var("DISPATCHER_WORKERS", Some("0"), || {
            let err = DispatcherConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("DISPATCHER_WORKERS"));
        });

        temp_env::with_var("DISPATCHER_QUEUE_CAPACITY", Some("lots"), || {
            let err = DispatcherConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("DISPATCHER_QUEUE_CAPACITY"));
        });
    }
}
