use axum::routing::get;
use axum::Router;
use http::header::{ACCEPT, AUTHORIZATION, ORIGIN};
use http::Method;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse};
use tower_http::LatencyUnit;

mod auth;
mod config;
mod handlers;
mod health;

pub use config::Config;

use crate::GalleryState;

const STATUS_PREFIX: &str = "/_status";

/// Build the gallery router: index at `/`, health under `/_status`, and
/// every other GET resolved against the configured albums.
pub fn router(state: GalleryState) -> Router {
    // Gallery is read-only, GET only
    let cors_layer = CorsLayer::new()
        .allow_methods(vec![Method::GET, Method::HEAD])
        .allow_headers(vec![ACCEPT, ORIGIN, AUTHORIZATION])
        .allow_origin(Any)
        .allow_credentials(false);

    Router::new()
        .route("/", get(handlers::index::handler))
        .nest(STATUS_PREFIX, health::router(state.clone()))
        .fallback(handlers::album::handler)
        .with_state(state)
        .layer(cors_layer)
}

/// Run the gallery HTTP server until the shutdown signal fires.
pub async fn run(
    config: Config,
    state: GalleryState,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<(), HttpServerError> {
    let listen_addr = config.listen_addr;
    let log_level = config.log_level;
    let trace_layer = TraceLayer::new_for_http()
        .on_response(
            DefaultOnResponse::new()
                .include_headers(false)
                .level(log_level)
                .latency_unit(LatencyUnit::Micros),
        )
        .on_failure(DefaultOnFailure::new().latency_unit(LatencyUnit::Micros));

    let router = router(state).layer(trace_layer);

    tracing::info!(addr = ?listen_addr, "Gallery server listening");
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        })
        .await?;

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("an error occurred running the HTTP server: {0}")]
    ServingFailed(#[from] std::io::Error),
}
