use metrics::{counter, gauge};
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::sleep;

use crate::ingestion::pipeline::{AddressCap, BlockPipeline, POLLER_ADDRESS_CAP};
use crate::models::{BlockDataset, BlocksUpdate};
use crate::services::broadcast_hub::BroadcastHub;

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Heights enriched per new tip, ending at the tip.
pub const RECENT_BLOCK_WINDOW: u64 = 3;

/// Single-slot cache of the newest dataset the poller produced.
#[derive(Debug, Clone, Default)]
pub struct LatestBlock {
    slot: Arc<RwLock<Option<Arc<BlockDataset>>>>,
}

impl LatestBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<Arc<BlockDataset>> {
        self.slot.read().await.clone()
    }

    pub async fn set(&self, dataset: BlockDataset) {
        *self.slot.write().await = Some(Arc::new(dataset));
    }
}

#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub interval: Duration,
    pub window: u64,
    pub address_cap: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            window: RECENT_BLOCK_WINDOW,
            address_cap: POLLER_ADDRESS_CAP,
        }
    }
}

/// What a single poll step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tip could not be fetched; nothing changed.
    TipUnavailable,
    /// The tip has already been broadcast.
    UpToDate { tip: u64 },
    /// Every height in the window failed to enrich.
    NothingEnriched { tip: u64 },
    Broadcast { heights: Vec<u64>, delivered: usize },
}

/// The `window` heights ending at `tip`, clamped at genesis.
pub fn window_heights(tip: u64, window: u64) -> RangeInclusive<u64> {
    tip.saturating_sub(window.saturating_sub(1))..=tip
}

/// Watches the chain tip and pushes freshly enriched blocks to viewers.
pub struct ChainPoller {
    pipeline: BlockPipeline,
    hub: BroadcastHub,
    latest: LatestBlock,
    config: PollerConfig,
    last_broadcast: Option<u64>,
}

impl ChainPoller {
    pub fn new(
        pipeline: BlockPipeline,
        hub: BroadcastHub,
        latest: LatestBlock,
        config: PollerConfig,
    ) -> Self {
        Self {
            pipeline,
            hub,
            latest,
            config,
            last_broadcast: None,
        }
    }

    pub fn last_broadcast_height(&self) -> Option<u64> {
        self.last_broadcast
    }

    /// Run forever: one tick, then a fixed sleep, regardless of outcome.
    pub async fn run(mut self) {
        tracing::info!(
            interval_secs = self.config.interval.as_secs(),
            window = self.config.window,
            address_cap = self.config.address_cap,
            "Chain poller started"
        );

        loop {
            let outcome = self.tick().await;
            tracing::debug!(?outcome, "Poll tick finished");
            sleep(self.config.interval).await;
        }
    }

    pub async fn tick(&mut self) -> TickOutcome {
        counter!("poll_ticks_total").increment(1);

        let tip = match self.pipeline.gateway().latest_height().await {
            Ok(h) => h,
            Err(e) => {
                counter!("tip_fetch_failures_total").increment(1);
                tracing::warn!(error = %e, "Failed to fetch latest block height");
                return TickOutcome::TipUnavailable;
            }
        };

        if self.last_broadcast.is_some_and(|last| tip <= last) {
            return TickOutcome::UpToDate { tip };
        }

        let cap = AddressCap::First(self.config.address_cap);
        let mut blocks = Vec::new();
        for height in window_heights(tip, self.config.window) {
            match self.pipeline.enrich(height, cap).await {
                Ok(dataset) => blocks.push(dataset),
                Err(e) => {
                    tracing::warn!(height, error = %e, "Skipping height in poll window");
                }
            }
        }

        // Advance even on total failure so the same tip is not reprocessed.
        self.last_broadcast = Some(tip);
        gauge!("last_broadcast_height").set(tip as f64);

        let Some(newest) = blocks.last().cloned() else {
            tracing::warn!(tip, "No block in the poll window could be enriched");
            return TickOutcome::NothingEnriched { tip };
        };
        self.latest.set(newest).await;

        let heights: Vec<u64> = blocks.iter().map(|b| b.height).collect();
        let update = BlocksUpdate { blocks };
        let delivered = match self.hub.broadcast(&update) {
            Ok(report) => report.delivered,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialise block update");
                0
            }
        };

        tracing::info!(tip, ?heights, viewers = delivered, "Broadcast block update");
        TickOutcome::Broadcast { heights, delivered }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_heights() {
        assert_eq!(window_heights(100, 3).collect::<Vec<_>>(), vec![98, 99, 100]);
        assert_eq!(window_heights(1, 3).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(window_heights(0, 3).collect::<Vec<_>>(), vec![0]);
        assert_eq!(window_heights(7, 1).collect::<Vec<_>>(), vec![7]);
    }
}
