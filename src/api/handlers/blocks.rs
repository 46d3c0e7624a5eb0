use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use crate::ingestion::AddressCap;
use crate::models::BlockDataset;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BlockResponse {
    Block(BlockDataset),
    Error { error: String },
}

/// On-demand lookup of one height, every address resolved.
pub async fn block(State(state): State<AppState>, Path(height): Path<u64>) -> Json<BlockResponse> {
    tracing::info!(height, "Querying block");

    match state.pipeline.enrich(height, AddressCap::Unbounded).await {
        Ok(dataset) => Json(BlockResponse::Block(dataset)),
        Err(e) => Json(BlockResponse::Error {
            error: e.to_string(),
        }),
    }
}

/// Current upstream tip, else the cached latest dataset, else `{}`.
pub async fn latest(State(state): State<AppState>) -> Json<Value> {
    match state.gateway().latest_height().await {
        Ok(height) => Json(json!({ "height": height })),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch latest block height");
            match state.latest.get().await {
                Some(dataset) => Json(serde_json::to_value(dataset.as_ref()).unwrap_or_default()),
                None => Json(json!({})),
            }
        }
    }
}
