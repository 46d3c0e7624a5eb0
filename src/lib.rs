pub mod api;
pub mod blockfrost;
pub mod config;
pub mod display;
pub mod errors;
pub mod ingestion;
pub mod intelligence;
pub mod ledger;
pub mod metrics;
pub mod models;
pub mod services;

use std::sync::Arc;

use crate::blockfrost::BlockfrostClient;
use crate::config::AppConfig;
use crate::ingestion::BlockPipeline;
use crate::ledger::{LedgerGateway, OfflineLedger};
use crate::services::{BroadcastHub, LatestBlock};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub pipeline: BlockPipeline,
    pub hub: BroadcastHub,
    pub latest: LatestBlock,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}

impl AppState {
    pub fn gateway(&self) -> &Arc<dyn LedgerGateway> {
        self.pipeline.gateway()
    }
}

/// Pick the ledger gateway once: Blockfrost when a key is configured,
/// otherwise the offline stand-in.
pub fn build_gateway(config: &AppConfig) -> anyhow::Result<Arc<dyn LedgerGateway>> {
    match &config.blockfrost_api_key {
        Some(key) => {
            let client = BlockfrostClient::new(
                key.clone(),
                config.blockfrost_url.clone(),
                config.blockfrost_timeout(),
            )?;
            tracing::info!(url = %config.blockfrost_url, "Using Blockfrost ledger gateway");
            Ok(Arc::new(client))
        }
        None => {
            tracing::warn!(
                "BLOCKFROST_API_KEY not set, block queries will report a configuration error"
            );
            Ok(Arc::new(OfflineLedger::new(config.fallback_height)))
        }
    }
}
