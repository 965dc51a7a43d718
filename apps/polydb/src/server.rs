//! `polydb serve`: HTTP API plus the tokenizer gRPC service
//!
//! Startup order:
//! 1. Install the Prometheus recorder
//! 2. Load the merge table (fails fast if missing or corrupt)
//! 3. Create the lazy embeddings client and start the ingest dispatcher
//! 4. Spawn the gRPC listener, then run the HTTP server in the foreground
//!
//! Both listeners share one `ShutdownCoordinator`. On SIGINT/SIGTERM (or if
//! either server fails) HTTP drains in-flight requests, then the dispatcher
//! closes its queue and joins its workers.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum_helpers::server::{
    ShutdownCoordinator, create_production_app, create_router, health_router,
};
use domain_embeddings::GrpcEmbeddingClient;
use domain_tokenizer::{MergeTable, TokenizerService};
use eyre::{Result, WrapErr};
use rpc::tokenizer::tokenizer_server::{SERVICE_NAME, TokenizerServer};
use tonic::codec::CompressionEncoding;
use tonic::transport::Server;
use tonic_health::server::health_reporter;
use tracing::info;

use crate::api;
use crate::config::Config;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Upper bound on post-drain cleanup
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Full HTTP application: documented API routes, `/health` and `/ready`
pub fn build_app(state: &AppState) -> io::Result<Router> {
    let router = create_router::<ApiDoc>(api::routes(state))?;

    Ok(router
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone())))
}

pub async fn serve(config: Config) -> Result<()> {
    info!(
        name = %config.app.name,
        version = %config.app.version,
        "Starting PolyDB server"
    );

    dispatcher::init_metrics().wrap_err("Failed to install Prometheus recorder")?;

    let table = MergeTable::load(&config.vocabulary_path).wrap_err_with(|| {
        format!(
            "Failed to load vocabulary from {} (run `polydb train` first)",
            config.vocabulary_path.display()
        )
    })?;

    let client = GrpcEmbeddingClient::connect_lazy(&config.embeddings)
        .wrap_err("Failed to configure embeddings client")?;
    info!(addr = %config.embeddings.addr, "Embeddings client configured (connects on first use)");

    let grpc_addr = config
        .grpc
        .socket_addr()
        .wrap_err("Invalid GRPC_HOST/GRPC_PORT")?;
    let state = AppState::new(config, table, Arc::new(client));

    let (coordinator, _rx) = ShutdownCoordinator::new();
    let grpc_task = tokio::spawn(serve_grpc(
        grpc_addr,
        Arc::clone(&state.table),
        coordinator.clone(),
    ));

    let app = build_app(&state)?;
    let dispatcher = Arc::clone(&state.dispatcher);

    info!("Starting HTTP server with graceful shutdown ({:?} cleanup timeout)", SHUTDOWN_TIMEOUT);
    create_production_app(
        app,
        &state.config.server,
        coordinator,
        SHUTDOWN_TIMEOUT,
        async move {
            info!("Shutting down: draining ingest dispatcher");
            dispatcher.shutdown().await;
        },
    )
    .await
    .wrap_err("HTTP server failed")?;

    grpc_task.await.wrap_err("gRPC server task failed")??;

    info!("PolyDB shutdown complete");
    Ok(())
}

/// Serve `tokenizer.Tokenizer` and `grpc.health.v1.Health` until shutdown
async fn serve_grpc(
    addr: SocketAddr,
    table: Arc<MergeTable>,
    coordinator: ShutdownCoordinator,
) -> Result<()> {
    let (health_reporter, health_service) = health_reporter();
    health_reporter
        .set_service_status(SERVICE_NAME, tonic_health::ServingStatus::Serving)
        .await;
    // Empty service name for generic health checks
    health_reporter
        .set_service_status("", tonic_health::ServingStatus::Serving)
        .await;

    info!("Tokenizer gRPC service listening on {}", addr);

    let result = Server::builder()
        .add_service(health_service)
        .add_service(
            TokenizerServer::new(TokenizerService::new(table))
                .accept_compressed(CompressionEncoding::Zstd)
                .send_compressed(CompressionEncoding::Zstd),
        )
        .serve_with_shutdown(addr, coordinator.notified())
        .await
        .wrap_err_with(|| format!("gRPC server on {} failed", addr));

    // A failed gRPC listener takes the HTTP server down with it
    coordinator.shutdown();
    result
}
