pub mod pipeline;

pub use pipeline::{AddressCap, BlockPipeline};
