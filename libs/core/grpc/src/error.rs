use thiserror::Error;

pub type GrpcResult<T> = Result<T, GrpcError>;

/// Errors that can occur while creating a gRPC channel
#[derive(Error, Debug)]
pub enum GrpcError {
    /// Invalid URI provided for connection
    #[error("Invalid URI: {0}")]
    InvalidUri(#[from] tonic::transport::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::transport::Endpoint;

    #[test]
    fn test_invalid_uri_message() {
        let err: GrpcError = Endpoint::from_shared("not a uri".to_string())
            .unwrap_err()
            .into();
        assert!(err.to_string().starts_with("Invalid URI"));
    }
}
