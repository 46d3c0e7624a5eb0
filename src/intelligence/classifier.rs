use rust_decimal::Decimal;

use crate::models::CreatureTier;

/// Smallest-unit quantities per display ADA.
pub const LOVELACE_PER_ADA: u64 = 1_000_000;

/// Ascending lower bounds (in ADA) of every tier above `Shrimp`.
const TIER_THRESHOLDS: [(i64, CreatureTier); 7] = [
    (100, CreatureTier::Crab),
    (1_000, CreatureTier::Octopus),
    (3_000, CreatureTier::Fish),
    (10_000, CreatureTier::Tuna),
    (40_000, CreatureTier::Dolphin),
    (100_000, CreatureTier::Shark),
    (300_000, CreatureTier::Whale),
];

/// Convert a lovelace quantity into display ADA without float rounding.
pub fn lovelace_to_ada(lovelace: u64) -> Decimal {
    Decimal::from_i128_with_scale(lovelace as i128, 6)
}

/// Map a balance to its tier.
///
/// Each threshold is the inclusive lower bound of the next tier up, so a
/// balance of exactly 100 is a crab while 99.999999 is still a shrimp.
pub fn classify(ada: Decimal) -> CreatureTier {
    TIER_THRESHOLDS
        .iter()
        .rev()
        .find(|(threshold, _)| ada >= Decimal::from(*threshold))
        .map(|(_, tier)| *tier)
        .unwrap_or(CreatureTier::Shrimp)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
