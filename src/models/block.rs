use serde::{Deserialize, Serialize};

use super::Creature;

/// One enriched block. Produced fresh per enrichment and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDataset {
    pub height: u64,
    pub creatures: Vec<Creature>,
}

/// Batch pushed to every viewer after a poll tick, ascending by height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlocksUpdate {
    pub blocks: Vec<BlockDataset>,
}

impl BlocksUpdate {
    pub fn max_height(&self) -> Option<u64> {
        self.blocks.iter().map(|b| b.height).max()
    }
}
