use crate::{ConfigError, FromEnv, env_or_default};
use std::net::{Ipv4Addr, SocketAddr};

/// Bind address for a listener
///
/// The HTTP API reads `HOST`/`PORT`. Other listeners in the same process
/// (the tokenizer gRPC service) use [`ServerConfig::from_env_keys`] with
/// their own variable names and defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn new(host: String, port: u16) -> Self {
        Self { host, port }
    }

    /// "host:port", as accepted by `TcpListener::bind`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parsed socket address. Hosts must be IP literals (`[::1]`, `0.0.0.0`).
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = self.address();
        addr.parse().map_err(|e| ConfigError::ParseError {
            key: "host".to_string(),
            details: format!("{}: {}", addr, e),
        })
    }

    /// Read host and port from `host_key`/`port_key`, falling back to `defaults`
    pub fn from_env_keys(
        host_key: &str,
        port_key: &str,
        defaults: Self,
    ) -> Result<Self, ConfigError> {
        let host = env_or_default(host_key, &defaults.host);
        let port = match std::env::var(port_key) {
            Ok(raw) => raw.parse().map_err(|e| ConfigError::ParseError {
                key: port_key.to_string(),
                details: format!("{}", e),
            })?,
            Err(_) => defaults.port,
        };

        Ok(Self { host, port })
    }
}

impl FromEnv for ServerConfig {
    /// - HOST: defaults to 0.0.0.0
    /// - PORT: defaults to 8080
    fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_keys("HOST", "PORT", Self::default())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::UNSPECIFIED.to_string(),
            port: 8080,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_defaults() {
        temp_env::with_vars_unset(["HOST", "PORT"], || {
            let config = ServerConfig::from_env().unwrap();
            assert_eq!(config, ServerConfig::default());
            assert_eq!(config.address(), "0.0.0.0:8080");
        });
    }

    #[test]
    fn test_http_overrides() {
        temp_env::with_vars([("HOST", Some("127.0.0.1")), ("PORT", Some("3000"))], || {
            let config = ServerConfig::from_env().unwrap();
            assert_eq!(config.address(), "127.0.0.1:3000");
        });
    }

    #[test]
    fn test_invalid_port_names_the_variable() {
        temp_env::with_var("PORT", Some("99999"), || {
            let err = ServerConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("PORT"));
        });
    }

    #[test]
    fn test_custom_keys_use_their_own_defaults() {
        let defaults = ServerConfig::new("[::1]".to_string(), 50051);

        temp_env::with_vars_unset(["GRPC_HOST", "GRPC_PORT"], || {
            let config =
                ServerConfig::from_env_keys("GRPC_HOST", "GRPC_PORT", defaults.clone()).unwrap();
            assert_eq!(config, defaults);
        });

        temp_env::with_var("GRPC_PORT", Some("abc"), || {
            let err = ServerConfig::from_env_keys("GRPC_HOST", "GRPC_PORT", defaults.clone())
                .unwrap_err();
            assert!(err.to_string().contains("GRPC_PORT"));
        });
    }

    #[test]
    fn test_socket_addr() {
        let addr = ServerConfig::new("[::1]".to_string(), 50051).socket_addr().unwrap();
        assert!(addr.is_ipv6());
        assert_eq!(addr.port(), 50051);

        assert!(ServerConfig::new("not a host".to_string(), 1).socket_addr().is_err());
    }
}
