use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let ledger = if state.gateway().is_configured() {
        "configured"
    } else {
        "offline"
    };
    let latest_height = state.latest.get().await.map(|b| b.height);

    Json(json!({
        "status": "healthy",
        "ledger": ledger,
        "viewers": state.hub.viewer_count(),
        "latest_height": latest_height,
    }))
}
