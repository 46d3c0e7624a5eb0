use serde::{Deserialize, Deserializer};

use crate::ledger::{Amount, BlockRef, TxOutput, TxUtxos};

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ApiBlock {
    pub hash: String,
    /// Null only for the genesis block.
    #[serde(default)]
    pub height: Option<u64>,
    #[serde(default)]
    pub slot: Option<u64>,
    #[serde(default)]
    pub tx_count: Option<u64>,
}

impl From<ApiBlock> for BlockRef {
    fn from(block: ApiBlock) -> Self {
        Self {
            hash: block.hash,
            height: block.height.unwrap_or(0),
        }
    }
}

// ---------------------------------------------------------------------------
// Amounts (quantities arrive as decimal strings)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ApiAmount {
    pub unit: String,
    #[serde(deserialize_with = "quantity_from_str")]
    pub quantity: u64,
}

fn quantity_from_str<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Quantity {
        Text(String),
        Number(u64),
    }

    match Quantity::deserialize(deserializer)? {
        Quantity::Text(s) => s.parse().map_err(serde::de::Error::custom),
        Quantity::Number(n) => Ok(n),
    }
}

impl From<ApiAmount> for Amount {
    fn from(a: ApiAmount) -> Self {
        Self {
            unit: a.unit,
            quantity: a.quantity,
        }
    }
}

// ---------------------------------------------------------------------------
// Transaction UTXOs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ApiUtxo {
    pub address: String,
    #[serde(default)]
    pub amount: Vec<ApiAmount>,
    #[serde(default)]
    pub collateral: bool,
    #[serde(default)]
    pub reference: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiTxUtxos {
    pub hash: String,
    #[serde(default)]
    pub inputs: Vec<ApiUtxo>,
    #[serde(default)]
    pub outputs: Vec<ApiUtxo>,
}

impl From<ApiTxUtxos> for TxUtxos {
    fn from(tx: ApiTxUtxos) -> Self {
        Self {
            inputs: tx.inputs.into_iter().map(|i| i.address).collect(),
            outputs: tx
                .outputs
                .into_iter()
                .map(|o| TxOutput {
                    address: o.address,
                    amount: o.amount.into_iter().map(Amount::from).collect(),
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Addresses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ApiAddress {
    pub address: String,
    #[serde(default)]
    pub amount: Vec<ApiAmount>,
    #[serde(default, rename = "type")]
    pub address_type: Option<String>,
}

impl ApiAddress {
    pub fn lovelace(&self) -> u64 {
        self.amount
            .iter()
            .filter(|a| a.unit == crate::ledger::LOVELACE_UNIT)
            .fold(0u64, |acc, a| acc.saturating_add(a.quantity))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
