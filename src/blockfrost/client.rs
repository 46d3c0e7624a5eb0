use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::types::{ApiAddress, ApiBlock, ApiErrorBody, ApiTxUtxos};
use crate::ledger::{BlockId, BlockRef, LedgerGateway, ProviderError, TxUtxos};

pub const PREPROD_BASE_URL: &str = "https://cardano-preprod.blockfrost.io/api/v0";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Blockfrost returns at most this many items per page.
const PAGE_SIZE: usize = 100;
/// Upper bound on pages fetched for a single block's transaction list.
const MAX_TX_PAGES: u32 = 10;

/// Ledger gateway backed by the Blockfrost REST API.
#[derive(Debug, Clone)]
pub struct BlockfrostClient {
    http: Client,
    base_url: String,
    project_id: String,
}

impl BlockfrostClient {
    pub fn new(project_id: String, base_url: String, timeout: Duration) -> Result<Self, ProviderError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, project_id, base_url))
    }

    pub fn with_client(http: Client, project_id: String, base_url: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .get(&url)
            .header("project_id", &self.project_id)
            .send()
            .await?;

        let resp = check_status(resp, path).await?;
        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ProviderError::Decode(format!("{path}: {e}")))
    }
}

async fn check_status(resp: Response, path: &str) -> Result<Response, ProviderError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    match status {
        StatusCode::NOT_FOUND => Err(ProviderError::NotFound(path.to_string())),
        // 418 is Blockfrost's "auto-banned for flooding"
        StatusCode::TOO_MANY_REQUESTS | StatusCode::IM_A_TEAPOT => Err(ProviderError::RateLimited),
        _ => {
            let text = resp.text().await.unwrap_or_default();
            let body = serde_json::from_str::<ApiErrorBody>(&text)
                .ok()
                .and_then(|b| b.message.or(b.error))
                .unwrap_or(text);
            Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl LedgerGateway for BlockfrostClient {
    async fn latest_height(&self) -> Result<u64, ProviderError> {
        let block: ApiBlock = self.get_json("/blocks/latest").await?;
        block
            .height
            .ok_or_else(|| ProviderError::Decode("latest block has no height".into()))
    }

    async fn block(&self, id: BlockId) -> Result<BlockRef, ProviderError> {
        let block: ApiBlock = self.get_json(&format!("/blocks/{id}")).await?;
        Ok(block.into())
    }

    async fn transactions(&self, block_hash: &str) -> Result<Vec<String>, ProviderError> {
        let mut tx_ids = Vec::new();
        for page in 1..=MAX_TX_PAGES {
            let batch: Vec<String> = self
                .get_json(&format!("/blocks/{block_hash}/txs?page={page}"))
                .await?;
            let len = batch.len();
            tx_ids.extend(batch);
            if len < PAGE_SIZE {
                break;
            }
        }
        Ok(tx_ids)
    }

    async fn utxos(&self, tx_id: &str) -> Result<TxUtxos, ProviderError> {
        let tx: ApiTxUtxos = self.get_json(&format!("/txs/{tx_id}/utxos")).await?;
        Ok(tx.into())
    }

    async fn address_balance(&self, address: &str) -> Result<u64, ProviderError> {
        let info: ApiAddress = self.get_json(&format!("/addresses/{address}")).await?;
        Ok(info.lovelace())
    }
}
