use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};

use crate::state::AppState;

/// API routes, merged at the root by `create_router`.
///
/// - `/insert`, `/find_similar`: ingest path through the dispatcher
/// - `/encode`, `/decode`, `/vocabulary-size`: tokenizer debugging
/// - `/metrics`: Prometheus scrape endpoint
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .merge(domain_embeddings::handlers::router(state.dispatcher.clone()))
        .merge(domain_tokenizer::handlers::router(state.table.clone()))
        .route("/metrics", get(metrics_handler))
}

/// Creates a router with the /ready endpoint.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(ready_handler))
        .with_state(state)
}

/// Ready once a non-empty vocabulary is loaded and the dispatcher accepts jobs
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![
        (
            "vocabulary",
            Box::pin(async {
                if state.table.is_empty() {
                    Err("no merge rules loaded".to_string())
                } else {
                    Ok(())
                }
            }),
        ),
        (
            "dispatcher",
            Box::pin(async {
                if state.dispatcher.is_closed() {
                    Err("dispatcher is shut down".to_string())
                } else {
                    Ok(())
                }
            }),
        ),
    ];

    run_health_checks(checks).await.into_response()
}

/// Prometheus metrics in text exposition format
pub async fn metrics_handler() -> Response {
    match dispatcher::prometheus_handle() {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            handle.render(),
        )
            .into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            "Metrics not initialized".to_string(),
        )
            .into_response(),
    }
}
