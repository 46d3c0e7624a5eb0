use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::blockfrost::client::{DEFAULT_TIMEOUT_SECS, PREPROD_BASE_URL};
use crate::ledger::offline::DEFAULT_FALLBACK_HEIGHT;
use crate::services::chain_poller::{PollerConfig, DEFAULT_POLL_INTERVAL_SECS};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    // Blockfrost (optional: without a key the service runs offline)
    pub blockfrost_api_key: Option<String>,
    pub blockfrost_url: String,
    pub blockfrost_timeout_secs: u64,

    // Chain poller
    pub poller_enabled: bool,
    pub poll_interval_secs: u64,
    pub fallback_height: u64,

    // Viewer assets
    pub static_dir: String,
    pub resources_dir: String,
    pub templates_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            blockfrost_api_key: None,
            blockfrost_url: PREPROD_BASE_URL.into(),
            blockfrost_timeout_secs: DEFAULT_TIMEOUT_SECS,
            poller_enabled: true,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            fallback_height: DEFAULT_FALLBACK_HEIGHT,
            static_dir: "static".into(),
            resources_dir: "resources".into(),
            templates_dir: "templates".into(),
        }
    }
}

fn parse_var<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{key} is invalid ({raw:?}): {e}")),
        _ => Ok(default),
    }
}

fn string_var(key: &str, default: String) -> String {
    env::var(key)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            host: string_var("HOST", defaults.host),
            port: parse_var("PORT", defaults.port)?,

            blockfrost_api_key: env::var("BLOCKFROST_API_KEY")
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            blockfrost_url: string_var("BLOCKFROST_URL", defaults.blockfrost_url),
            blockfrost_timeout_secs: parse_var(
                "BLOCKFROST_TIMEOUT_SECS",
                defaults.blockfrost_timeout_secs,
            )?,

            poller_enabled: parse_var("POLLER_ENABLED", defaults.poller_enabled)?,
            poll_interval_secs: parse_var("POLL_INTERVAL_SECS", defaults.poll_interval_secs)?,
            fallback_height: parse_var("FALLBACK_HEIGHT", defaults.fallback_height)?,

            static_dir: string_var("STATIC_DIR", defaults.static_dir),
            resources_dir: string_var("RESOURCES_DIR", defaults.resources_dir),
            templates_dir: string_var("TEMPLATES_DIR", defaults.templates_dir),
        })
    }

    /// Returns true if a Blockfrost project id is configured.
    pub fn has_blockfrost_key(&self) -> bool {
        self.blockfrost_api_key.is_some()
    }

    pub fn blockfrost_timeout(&self) -> Duration {
        Duration::from_secs(self.blockfrost_timeout_secs)
    }

    pub fn poller(&self) -> PollerConfig {
        PollerConfig {
            interval: Duration::from_secs(self.poll_interval_secs),
            ..PollerConfig::default()
        }
    }
}
