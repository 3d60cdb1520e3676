use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::signaling::{RelayService, ws_handler};
use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use std::path::Path;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

/// `/ws` for signaling, an empty favicon, and optionally a static directory
/// for everything else.
pub fn build_router(service: RelayService, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/ws", get(ws_handler))
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }));

    if let Some(dir) = static_dir {
        info!("Serving static files from {}", dir.display());
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(service)
}

pub async fn serve(config: RelayConfig) -> Result<(), RelayError> {
    let service = RelayService::new(&config);
    let app = build_router(service, config.static_dir.as_deref());

    let listener = TcpListener::bind(config.bind)
        .await
        .map_err(|source| RelayError::Bind {
            addr: config.bind,
            source,
        })?;
    info!("Signaling relay listening on http://{}", config.bind);

    axum::serve(listener, app).await.map_err(RelayError::Serve)
}
