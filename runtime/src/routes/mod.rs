use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, routing::get};
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::AppState;

pub mod process;
pub mod types;

pub use process::process_routes;
pub use types::ProcessResponse;

pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.uploads.body_limit();

    let mut router = Router::new()
        .route("/health", get(health))
        .merge(process_routes());

    if let Some(dir) = state.config.server.static_dir.clone() {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[inline]
async fn health() -> &'static str {
    "ok"
}
