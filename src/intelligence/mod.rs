pub mod aggregator;
pub mod classifier;

pub use aggregator::{aggregate, AddressActivity, Role, TransactionAggregator};
pub use classifier::{classify, lovelace_to_ada};
