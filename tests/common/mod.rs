use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use reefwatch::config::AppConfig;
use reefwatch::ingestion::BlockPipeline;
use reefwatch::ledger::{Amount, BlockId, BlockRef, LedgerGateway, ProviderError, TxOutput, TxUtxos};
use reefwatch::services::{BroadcastHub, LatestBlock};
use reefwatch::AppState;

pub const LOVELACE_PER_ADA: u64 = 1_000_000;

/// Build a transaction from input addresses and `(address, ada)` outputs.
#[allow(dead_code)]
pub fn tx(inputs: &[&str], outputs: &[(&str, u64)]) -> TxUtxos {
    TxUtxos {
        inputs: inputs.iter().map(|a| a.to_string()).collect(),
        outputs: outputs
            .iter()
            .map(|(address, ada)| TxOutput {
                address: address.to_string(),
                amount: vec![Amount::lovelace(ada * LOVELACE_PER_ADA)],
            })
            .collect(),
    }
}

/// In-memory ledger with scriptable failures.
#[derive(Default)]
pub struct MockLedger {
    tip: Mutex<Option<u64>>,
    blocks: Mutex<HashMap<u64, Vec<(String, TxUtxos)>>>,
    failing_txs: Mutex<HashSet<String>>,
    balances: Mutex<HashMap<String, u64>>,
    balance_calls: AtomicUsize,
}

#[allow(dead_code)]
impl MockLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// `None` makes `latest_height` fail.
    pub fn set_tip(&self, tip: Option<u64>) {
        *self.tip.lock().unwrap() = tip;
    }

    pub fn add_block(&self, height: u64, txs: Vec<(&str, TxUtxos)>) {
        let txs = txs.into_iter().map(|(id, u)| (id.to_string(), u)).collect();
        self.blocks.lock().unwrap().insert(height, txs);
    }

    pub fn remove_block(&self, height: u64) {
        self.blocks.lock().unwrap().remove(&height);
    }

    pub fn fail_tx(&self, tx_id: &str) {
        self.failing_txs.lock().unwrap().insert(tx_id.to_string());
    }

    pub fn set_balance(&self, address: &str, ada: u64) {
        self.balances
            .lock()
            .unwrap()
            .insert(address.to_string(), ada * LOVELACE_PER_ADA);
    }

    pub fn set_balance_lovelace(&self, address: &str, lovelace: u64) {
        self.balances
            .lock()
            .unwrap()
            .insert(address.to_string(), lovelace);
    }

    pub fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }
}

fn height_from_hash(hash: &str) -> Option<u64> {
    hash.strip_prefix("hash")?.parse().ok()
}

#[async_trait]
impl LedgerGateway for MockLedger {
    async fn latest_height(&self) -> Result<u64, ProviderError> {
        self.tip.lock().unwrap().ok_or(ProviderError::RateLimited)
    }

    async fn block(&self, id: BlockId) -> Result<BlockRef, ProviderError> {
        let height = match &id {
            BlockId::Height(h) => Some(*h),
            BlockId::Hash(hash) => height_from_hash(hash),
        };
        match height {
            Some(h) if self.blocks.lock().unwrap().contains_key(&h) => Ok(BlockRef {
                hash: format!("hash{h}"),
                height: h,
            }),
            _ => Err(ProviderError::NotFound(format!("/blocks/{id}"))),
        }
    }

    async fn transactions(&self, block_hash: &str) -> Result<Vec<String>, ProviderError> {
        let blocks = self.blocks.lock().unwrap();
        let ids: Option<Vec<String>> = height_from_hash(block_hash)
            .and_then(|h| blocks.get(&h))
            .map(|txs| txs.iter().map(|(id, _)| id.clone()).collect());
        ids.ok_or_else(|| ProviderError::NotFound(format!("/blocks/{block_hash}/txs")))
    }

    async fn utxos(&self, tx_id: &str) -> Result<TxUtxos, ProviderError> {
        if self.failing_txs.lock().unwrap().contains(tx_id) {
            return Err(ProviderError::Status {
                status: 500,
                body: "boom".into(),
            });
        }
        self.blocks
            .lock()
            .unwrap()
            .values()
            .flatten()
            .find(|(id, _)| id == tx_id)
            .map(|(_, utxos)| utxos.clone())
            .ok_or_else(|| ProviderError::NotFound(format!("/txs/{tx_id}/utxos")))
    }

    async fn address_balance(&self, address: &str) -> Result<u64, ProviderError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        self.balances
            .lock()
            .unwrap()
            .get(address)
            .copied()
            .ok_or_else(|| ProviderError::NotFound(format!("/addresses/{address}")))
    }
}

/// Application state wired to the given gateway, with a fresh hub and cache.
#[allow(dead_code)]
pub fn test_state(gateway: Arc<dyn LedgerGateway>) -> AppState {
    AppState {
        config: AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            poller_enabled: false,
            ..AppConfig::default()
        },
        pipeline: BlockPipeline::new(gateway),
        hub: BroadcastHub::new(),
        latest: LatestBlock::new(),
        metrics_handle: reefwatch::metrics::init_metrics(),
    }
}
