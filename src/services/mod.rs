pub mod broadcast_hub;
pub mod chain_poller;

pub use broadcast_hub::{BroadcastHub, BroadcastReport, ViewerHandle, ViewerId};
pub use chain_poller::{ChainPoller, LatestBlock, PollerConfig, TickOutcome};
