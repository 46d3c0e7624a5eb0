use async_trait::async_trait;
use rust_decimal::Decimal;

use super::{AddressInfo, BlockId, BlockRef, LedgerGateway, ProviderError, TxUtxos};
use crate::models::CreatureTier;

/// Height reported by `/latest` when no upstream is configured.
pub const DEFAULT_FALLBACK_HEIGHT: u64 = 3_744_495;

/// Stand-in gateway used when no Blockfrost credential is available.
///
/// Reports a fixed tip height and a placeholder record for every address;
/// everything else fails with `ProviderError::NotConfigured`.
#[derive(Debug, Clone)]
pub struct OfflineLedger {
    fallback_height: u64,
}

impl Default for OfflineLedger {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_HEIGHT)
    }
}

impl OfflineLedger {
    pub fn new(fallback_height: u64) -> Self {
        Self { fallback_height }
    }

    pub fn placeholder(address: &str) -> AddressInfo {
        AddressInfo {
            address: address.to_string(),
            ada: Decimal::from(100),
            tier: CreatureTier::Fish,
        }
    }
}

#[async_trait]
impl LedgerGateway for OfflineLedger {
    fn is_configured(&self) -> bool {
        false
    }

    async fn latest_height(&self) -> Result<u64, ProviderError> {
        Ok(self.fallback_height)
    }

    async fn block(&self, _id: BlockId) -> Result<BlockRef, ProviderError> {
        Err(ProviderError::NotConfigured)
    }

    async fn transactions(&self, _block_hash: &str) -> Result<Vec<String>, ProviderError> {
        Err(ProviderError::NotConfigured)
    }

    async fn utxos(&self, _tx_id: &str) -> Result<TxUtxos, ProviderError> {
        Err(ProviderError::NotConfigured)
    }

    async fn address_balance(&self, _address: &str) -> Result<u64, ProviderError> {
        Err(ProviderError::NotConfigured)
    }

    async fn address_info(&self, address: &str) -> Result<AddressInfo, ProviderError> {
        Ok(Self::placeholder(address))
    }
}
