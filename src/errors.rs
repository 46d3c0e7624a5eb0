use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::ledger::ProviderError;

/// Failure of a whole block enrichment attempt.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("API not configured - please set BLOCKFROST_API_KEY")]
    Configuration,

    #[error("Block {height} not found")]
    Provider {
        height: u64,
        #[source]
        source: ProviderError,
    },
}

impl EnrichError {
    pub fn height(&self) -> Option<u64> {
        match self {
            EnrichError::Configuration => None,
            EnrichError::Provider { height, .. } => Some(*height),
        }
    }
}

/// A single item inside a block could not be enriched. Always scoped to that
/// item: logged and skipped, never propagated past the pipeline.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("transaction {tx_id} could not be fetched: {source}")]
    Transaction {
        tx_id: String,
        #[source]
        source: ProviderError,
    },

    #[error("address {address} could not be resolved: {source}")]
    Address {
        address: String,
        #[source]
        source: ProviderError,
    },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Io(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
