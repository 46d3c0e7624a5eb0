pub mod assets;
pub mod blocks;
pub mod health;
pub mod metrics;
pub mod ws;
