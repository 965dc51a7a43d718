pub mod config;

pub use config::ChannelConfig;

use crate::error::{GrpcError, GrpcResult};
use tonic::transport::{Channel, Endpoint};

fn endpoint(addr: &str, config: &ChannelConfig) -> GrpcResult<Endpoint> {
    let endpoint = Endpoint::from_shared(addr.to_string()).map_err(|e| {
        tracing::error!(target: "grpc_client", addr = %addr, error = ?e, "Invalid URI");
        GrpcError::InvalidUri(e)
    })?;
    Ok(config.apply_to_endpoint(endpoint))
}

/// Creates a lazy gRPC channel that connects on first request
///
/// Returns immediately without touching the network, so a service can start
/// before its upstream is reachable. The channel reconnects on its own after
/// the upstream restarts, and clones share the same connection.
///
/// ## Example
/// ```ignore
/// use grpc_client::{create_channel_lazy, ChannelConfig};
/// use rpc::embeddings::embeddings_client::EmbeddingsClient;
///
/// let channel = create_channel_lazy("http://[::1]:50053", &ChannelConfig::default())?;
/// let client = EmbeddingsClient::new(channel);
/// ```
pub fn create_channel_lazy(addr: impl AsRef<str>, config: &ChannelConfig) -> GrpcResult<Channel> {
    let addr = addr.as_ref();
    let endpoint = endpoint(addr, config)?;

    tracing::debug!(
        target: "grpc_client",
        addr = %addr,
        "Creating lazy gRPC channel (connects on first request)"
    );

    Ok(endpoint.connect_lazy())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_uri() {
        let result = create_channel_lazy("not a valid uri", &ChannelConfig::default());
        assert!(matches!(result, Err(GrpcError::InvalidUri(_))));
    }

    #[tokio::test]
    async fn test_lazy_channel_does_not_connect() {
        // Nothing listens here; a lazy channel must still be created
        let result = create_channel_lazy("http://127.0.0.1:1", &ChannelConfig::default());
        assert!(result.is_ok());
    }
}
