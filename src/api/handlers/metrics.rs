use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use metrics::gauge;

use crate::AppState;

/// Prometheus scrape endpoint. Refreshes the viewer gauge first so it is
/// exact even between broadcasts.
pub async fn render(State(state): State<AppState>) -> impl IntoResponse {
    gauge!("viewers_connected").set(state.hub.viewer_count() as f64);
    ([(CONTENT_TYPE, "text/plain; version=0.0.4")], state.metrics_handle.render())
}
