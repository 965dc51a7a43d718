use core_config::{ConfigError, FromEnv, env_or_default};
use grpc_client::{ChannelConfig, RetryConfig};
use std::time::Duration;

pub const DEFAULT_EMBEDDINGS_ADDR: &str = "http://[::1]:50053";

/// Connection settings for the embedding collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingsClientConfig {
    pub addr: String,
    /// Deadline for each individual RPC
    pub rpc_timeout: Duration,
    /// Attempts per RPC while the collaborator is unreachable
    pub retry_attempts: u32,
    pub retry_backoff: Duration,
}

impl EmbeddingsClientConfig {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            ..Self::default()
        }
    }

    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, attempts: u32, backoff: Duration) -> Self {
        self.retry_attempts = attempts.max(1);
        self.retry_backoff = backoff;
        self
    }

    pub fn channel_config(&self) -> ChannelConfig {
        ChannelConfig::default().with_request_timeout(self.rpc_timeout)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new()
            .with_max_attempts(self.retry_attempts)
            .with_backoff(self.retry_backoff)
    }
}

impl Default for EmbeddingsClientConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_EMBEDDINGS_ADDR.to_string(),
            rpc_timeout: Duration::from_secs(10),
            retry_attempts: 3,
            retry_backoff: Duration::from_millis(1000),
        }
    }
}

impl FromEnv for EmbeddingsClientConfig {
    /// Reads from environment variables:
    /// - EMBEDDINGS_ADDR: defaults to http://[::1]:50053
    /// - EMBEDDINGS_RPC_TIMEOUT_SECS: defaults to 10
    /// - EMBEDDINGS_RETRY_ATTEMPTS: defaults to 3
    /// - EMBEDDINGS_RETRY_BACKOFF_MS: defaults to 1000
    fn from_env() -> Result<Self, ConfigError> {
        let addr = env_or_default("EMBEDDINGS_ADDR", DEFAULT_EMBEDDINGS_ADDR);
        let rpc_timeout_secs: u64 = parse("EMBEDDINGS_RPC_TIMEOUT_SECS", "10")?;
        let retry_attempts: u32 = parse("EMBEDDINGS_RETRY_ATTEMPTS", "3")?;
        let retry_backoff_ms: u64 = parse("EMBEDDINGS_RETRY_BACKOFF_MS", "1000")?;

        Ok(Self::new(addr)
            .with_rpc_timeout(Duration::from_secs(rpc_timeout_secs))
            .with_retry(retry_attempts, Duration::from_millis(retry_backoff_ms)))
    }
}

fn parse<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env_or_default(key, default)
        .parse()
        .map_err(|e: T::Err| ConfigError::ParseError {
            key: key.to_string(),
            details: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 4] = [
        "EMBEDDINGS_ADDR",
        "EMBEDDINGS_RPC_TIMEOUT_SECS",
        "EMBEDDINGS_RETRY_ATTEMPTS",
        "EMBEDDINGS_RETRY_BACKOFF_MS",
    ];

    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars(VARS.map(|k| (k, None::<&str>)), || {
            let config = EmbeddingsClientConfig::from_env().unwrap();
            assert_eq!(config, EmbeddingsClientConfig::default());
            assert_eq!(config.retry_config().max_attempts, 3);
            assert_eq!(config.channel_config().request_timeout, Duration::from_secs(10));
        });
    }

    #[test]
    fn test_from_env_custom_values() {
        temp_env::with_vars(
            [
                ("EMBEDDINGS_ADDR", Some("http://embeddings:9000")),
                ("EMBEDDINGS_RPC_TIMEOUT_SECS", Some("2")),
                ("EMBEDDINGS_RETRY_ATTEMPTS", Some("5")),
                ("EMBEDDINGS_RETRY_BACKOFF_MS", Some("50")),
            ],
            || {
                let config = EmbeddingsClientConfig::from_env().unwrap();
                assert_eq!(config.addr, "http://embeddings:9000");
                assert_eq!(config.rpc_timeout, Duration::from_secs(2));
                assert_eq!(config.retry_attempts, 5);
                assert_eq!(config.retry_backoff, Duration::from_millis(50));
            },
        );
    }

    #[test]
    fn test_from_env_invalid_number() {
        temp_env::with_var("EMBEDDINGS_RETRY_ATTEMPTS", Some("many"), || {
            let err = EmbeddingsClientConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("EMBEDDINGS_RETRY_ATTEMPTS"));
        });
    }
}
