use std::path::PathBuf;

use core_config::{AppInfo, FromEnv, app_info, env_or_default, server::ServerConfig};
use dispatcher::DispatcherConfig;
use domain_embeddings::EmbeddingsClientConfig;
use domain_tokenizer::DEFAULT_VOCABULARY_PATH;
use eyre::WrapErr;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Default bind address of the `tokenizer.Tokenizer` gRPC listener
pub fn grpc_server_defaults() -> ServerConfig {
    ServerConfig::new("[::1]".to_string(), 50051)
}

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    /// `GRPC_HOST`/`GRPC_PORT`
    pub grpc: ServerConfig,
    /// Merge table loaded when serving starts
    pub vocabulary_path: PathBuf,
    pub embeddings: EmbeddingsClientConfig,
    pub dispatcher: DispatcherConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env().wrap_err("Invalid HTTP server configuration")?;
        let grpc = ServerConfig::from_env_keys("GRPC_HOST", "GRPC_PORT", grpc_server_defaults())
            .wrap_err("Invalid gRPC server configuration")?;
        let embeddings =
            EmbeddingsClientConfig::from_env().wrap_err("Invalid embeddings client configuration")?;
        let dispatcher = DispatcherConfig::from_env()
            .wrap_err("Invalid dispatcher configuration")?;
        let vocabulary_path = PathBuf::from(env_or_default("VOCABULARY_PATH", DEFAULT_VOCABULARY_PATH));

        Ok(Self {
            app: app_info!(),
            environment,
            server,
            grpc,
            vocabulary_path,
            embeddings,
            dispatcher: DispatcherConfig {
                name: "ingest".to_string(),
                ..dispatcher
            },
        })
    }
}
