pub mod client;
pub mod types;

pub use client::{BlockfrostClient, PREPROD_BASE_URL};
