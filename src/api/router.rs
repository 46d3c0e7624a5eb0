use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);
    let resources = ServeDir::new(&state.config.resources_dir);

    // Viewer page and its assets
    let pages = Router::new()
        .route("/", get(handlers::assets::index))
        .route("/img/:filename", get(handlers::assets::image))
        .nest_service("/static", static_files)
        .nest_service("/resources", resources);

    let api = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render))
        .route("/latest", get(handlers::blocks::latest))
        .route("/block/:height", get(handlers::blocks::block))
        .route("/ws", get(handlers::ws::handler));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    pages
        .merge(api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
