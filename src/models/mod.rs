pub mod block;
pub mod creature;

pub use block::{BlockDataset, BlocksUpdate};
pub use creature::{CounterpartyInfo, Creature, CreatureTier};
