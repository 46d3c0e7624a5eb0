use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ledger::AddressInfo;

// ---------------------------------------------------------------------------
// CreatureTier
// ---------------------------------------------------------------------------

/// Size category of an address, ordered from smallest to largest holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreatureTier {
    Shrimp,
    Crab,
    Octopus,
    Fish,
    Tuna,
    Dolphin,
    Shark,
    Whale,
}

impl CreatureTier {
    pub const ALL: [CreatureTier; 8] = [
        CreatureTier::Shrimp,
        CreatureTier::Crab,
        CreatureTier::Octopus,
        CreatureTier::Fish,
        CreatureTier::Tuna,
        CreatureTier::Dolphin,
        CreatureTier::Shark,
        CreatureTier::Whale,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CreatureTier::Shrimp => "shrimp",
            CreatureTier::Crab => "crab",
            CreatureTier::Octopus => "octopus",
            CreatureTier::Fish => "fish",
            CreatureTier::Tuna => "tuna",
            CreatureTier::Dolphin => "dolphin",
            CreatureTier::Shark => "shark",
            CreatureTier::Whale => "whale",
        }
    }
}

impl fmt::Display for CreatureTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Creature: per-address record pushed to viewers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterpartyInfo {
    pub address: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub ada: Decimal,
    #[serde(rename = "type")]
    pub tier: CreatureTier,
}

impl From<AddressInfo> for CounterpartyInfo {
    fn from(info: AddressInfo) -> Self {
        Self {
            address: info.address,
            ada: info.ada,
            tier: info.tier,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    pub address: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub ada: Decimal,
    #[serde(rename = "type")]
    pub tier: CreatureTier,
    /// Display-only vertical position, 10..=90.
    pub y: u8,
    pub transaction_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount_transferred: Decimal,
    pub role: String,
    pub sent_to_info: Vec<CounterpartyInfo>,
    pub received_from_info: Vec<CounterpartyInfo>,
}

impl fmt::Display for Creature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} with {} ADA ({})",
            self.tier,
            self.ada.round_dp(2),
            self.role,
        )
    }
}
