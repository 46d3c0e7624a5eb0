pub mod offline;

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

use crate::intelligence::classifier::{classify, lovelace_to_ada};
use crate::models::CreatureTier;

pub use offline::OfflineLedger;

/// The only native unit that contributes to balances and transfer totals.
pub const LOVELACE_UNIT: &str = "lovelace";

/// Upstream call failure. Every variant is treated as transient by callers.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("rate limited by upstream")]
    RateLimited,

    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed upstream response: {0}")]
    Decode(String),

    #[error("ledger gateway is not configured")]
    NotConfigured,
}

/// Block lookup key: the upstream accepts either a height or a hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockId {
    Height(u64),
    Hash(String),
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockId::Height(h) => write!(f, "{h}"),
            BlockId::Hash(hash) => f.write_str(hash),
        }
    }
}

impl From<u64> for BlockId {
    fn from(height: u64) -> Self {
        BlockId::Height(height)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRef {
    pub hash: String,
    pub height: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amount {
    pub unit: String,
    pub quantity: u64,
}

impl Amount {
    pub fn lovelace(quantity: u64) -> Self {
        Self {
            unit: LOVELACE_UNIT.into(),
            quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    pub address: String,
    pub amount: Vec<Amount>,
}

/// Inputs and outputs of one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxUtxos {
    pub inputs: Vec<String>,
    pub outputs: Vec<TxOutput>,
}

impl TxUtxos {
    /// Sum of lovelace across all outputs, in smallest units.
    pub fn total_output_lovelace(&self) -> u64 {
        self.outputs
            .iter()
            .flat_map(|o| o.amount.iter())
            .filter(|a| a.unit == LOVELACE_UNIT)
            .fold(0u64, |acc, a| acc.saturating_add(a.quantity))
    }
}

/// A resolved address: display balance plus its tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressInfo {
    pub address: String,
    pub ada: Decimal,
    pub tier: CreatureTier,
}

/// Capability interface to the upstream chain data provider.
///
/// Implementations are selected once at startup and shared behind an `Arc`.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// False for the offline stand-in used when no upstream credential exists.
    fn is_configured(&self) -> bool {
        true
    }

    async fn latest_height(&self) -> Result<u64, ProviderError>;

    async fn block(&self, id: BlockId) -> Result<BlockRef, ProviderError>;

    /// Transaction ids of a block, in block order.
    async fn transactions(&self, block_hash: &str) -> Result<Vec<String>, ProviderError>;

    async fn utxos(&self, tx_id: &str) -> Result<TxUtxos, ProviderError>;

    /// Total lovelace held by `address`.
    async fn address_balance(&self, address: &str) -> Result<u64, ProviderError>;

    /// Balance lookup followed by classification.
    async fn address_info(&self, address: &str) -> Result<AddressInfo, ProviderError> {
        let lovelace = self.address_balance(address).await?;
        let ada = lovelace_to_ada(lovelace);
        Ok(AddressInfo {
            address: address.to_string(),
            ada,
            tier: classify(ada),
        })
    }
}
