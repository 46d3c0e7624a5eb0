use indexmap::IndexMap;
use metrics::{counter, histogram};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::display::random_y;
use crate::errors::{EnrichError, ResolutionError};
use crate::intelligence::aggregator::{AddressActivity, TransactionAggregator};
use crate::ledger::{AddressInfo, BlockId, LedgerGateway};
use crate::models::{BlockDataset, CounterpartyInfo, Creature};

/// Addresses resolved per block on the polling path.
pub const POLLER_ADDRESS_CAP: usize = 5;

/// How many of a block's addresses get turned into creatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressCap {
    Unbounded,
    First(usize),
}

impl AddressCap {
    fn limit(&self) -> usize {
        match self {
            AddressCap::Unbounded => usize::MAX,
            AddressCap::First(n) => *n,
        }
    }
}

/// Turns a block height into a fully enriched `BlockDataset`.
///
/// Flow:
/// 1. Fetch the block and its transaction ids (failure aborts the height)
/// 2. Fold every transaction's UTXOs into per-address activity
/// 3. Resolve each address's balance and tier, plus up to 3 counterparties
///    per direction
/// 4. Skip any transaction or address that cannot be resolved
#[derive(Clone)]
pub struct BlockPipeline {
    gateway: Arc<dyn LedgerGateway>,
}

impl BlockPipeline {
    pub fn new(gateway: Arc<dyn LedgerGateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Arc<dyn LedgerGateway> {
        &self.gateway
    }

    pub async fn enrich(&self, height: u64, cap: AddressCap) -> Result<BlockDataset, EnrichError> {
        if !self.gateway.is_configured() {
            return Err(EnrichError::Configuration);
        }

        let start = Instant::now();
        let result = self.enrich_configured(height, cap).await;
        histogram!("block_enrich_latency_seconds").record(start.elapsed().as_secs_f64());

        match &result {
            Ok(_) => counter!("blocks_enriched_total").increment(1),
            Err(e) => {
                counter!("block_enrich_failures_total").increment(1);
                tracing::warn!(height, error = %e, "Block enrichment failed");
            }
        }

        result
    }

    async fn enrich_configured(
        &self,
        height: u64,
        cap: AddressCap,
    ) -> Result<BlockDataset, EnrichError> {
        let activity = self.collect_activity(height).await?;

        let mut resolver = Resolver::new(self.gateway.as_ref());
        let mut creatures = Vec::new();

        for entry in activity.values().take(cap.limit()) {
            match build_creature(entry, &mut resolver).await {
                Ok(creature) => creatures.push(creature),
                Err(e) => {
                    counter!("address_resolution_failures_total").increment(1);
                    tracing::warn!(height, error = %e, "Skipping unresolved address");
                }
            }
        }

        tracing::info!(
            height,
            addresses = activity.len(),
            creatures = creatures.len(),
            "Block enriched"
        );
        for creature in &creatures {
            tracing::debug!(height, address = %creature.address, "{creature}");
        }

        Ok(BlockDataset { height, creatures })
    }

    async fn collect_activity(
        &self,
        height: u64,
    ) -> Result<IndexMap<String, AddressActivity>, EnrichError> {
        let block = self
            .gateway
            .block(BlockId::Height(height))
            .await
            .map_err(|source| EnrichError::Provider { height, source })?;

        let tx_ids = self
            .gateway
            .transactions(&block.hash)
            .await
            .map_err(|source| EnrichError::Provider { height, source })?;

        tracing::info!(height, tx_count = tx_ids.len(), "Processing block");

        let mut aggregator = TransactionAggregator::new();
        for tx_id in &tx_ids {
            match self.gateway.utxos(tx_id).await {
                Ok(utxos) => aggregator.record(tx_id, &utxos),
                Err(source) => {
                    counter!("tx_utxo_failures_total").increment(1);
                    let e = ResolutionError::Transaction {
                        tx_id: tx_id.clone(),
                        source,
                    };
                    tracing::warn!(height, error = %e, "Skipping transaction");
                }
            }
        }

        Ok(aggregator.into_activity())
    }
}

async fn build_creature(
    entry: &AddressActivity,
    resolver: &mut Resolver<'_>,
) -> Result<Creature, ResolutionError> {
    let info = resolver.resolve(&entry.address).await?;

    let sent_to_info = resolver.resolve_previews(entry.sent_to.iter()).await;
    let received_from_info = resolver.resolve_previews(entry.received_from.iter()).await;

    Ok(Creature {
        address: info.address,
        ada: info.ada,
        tier: info.tier,
        y: random_y(),
        transaction_id: entry.tx_id.clone(),
        amount_transferred: entry.amount,
        role: entry.role_label(),
        sent_to_info,
        received_from_info,
    })
}

/// Balance lookups memoised for the lifetime of one enrichment. Failures
/// are not remembered, so a later lookup of the same address retries.
struct Resolver<'a> {
    gateway: &'a dyn LedgerGateway,
    memo: HashMap<String, AddressInfo>,
}

impl<'a> Resolver<'a> {
    fn new(gateway: &'a dyn LedgerGateway) -> Self {
        Self {
            gateway,
            memo: HashMap::new(),
        }
    }

    async fn resolve(&mut self, address: &str) -> Result<AddressInfo, ResolutionError> {
        if let Some(info) = self.memo.get(address) {
            return Ok(info.clone());
        }

        let info = self
            .gateway
            .address_info(address)
            .await
            .map_err(|source| ResolutionError::Address {
                address: address.to_string(),
                source,
            })?;

        self.memo.insert(address.to_string(), info.clone());
        Ok(info)
    }

    /// Resolve counterparties, dropping any that fail.
    async fn resolve_previews<'b>(
        &mut self,
        addresses: impl Iterator<Item = &'b String>,
    ) -> Vec<CounterpartyInfo> {
        let mut previews = Vec::new();
        for address in addresses {
            match self.resolve(address).await {
                Ok(info) => previews.push(info.into()),
                Err(e) => {
                    counter!("address_resolution_failures_total").increment(1);
                    tracing::debug!(error = %e, "Counterparty omitted from preview");
                }
            }
        }
        previews
    }
}
