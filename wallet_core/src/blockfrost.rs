//! Blockfrost-backed wallet and ledger collaborators.

use std::time::Duration;

use agora_locker::{CollaboratorError, LedgerQuery, WalletSource};
use agora_types::{
    AssetBundle, AssetId, Holding, NetworkId, OutRef, SpendableOutput, Timestamp, TxHash,
    WalletAddress,
};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::cache::AssetCache;
use crate::error::WalletError;
use crate::holdings::aggregate_holdings;

/// Results per page; a shorter page is the last one.
pub const PAGE_SIZE: usize = 100;

/// Public endpoint for `network`.
pub fn default_base_url(network: NetworkId) -> &'static str {
    match network {
        NetworkId::Mainnet => "https://cardano-mainnet.blockfrost.io/api/v0",
        NetworkId::Preprod => "https://cardano-preprod.blockfrost.io/api/v0",
        NetworkId::Preview => "https://cardano-preview.blockfrost.io/api/v0",
    }
}

// ── Response types ──────────────────────────────────────────────────────

/// One entry of `/addresses/{address}/utxos`.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockfrostUtxo {
    pub address: String,
    pub tx_hash: String,
    pub output_index: u32,
    pub amount: Vec<BlockfrostAmount>,
    #[serde(default)]
    pub inline_datum: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockfrostAmount {
    pub unit: String,
    pub quantity: String,
}

impl BlockfrostUtxo {
    pub fn into_output(self) -> Result<SpendableOutput, WalletError> {
        let tx_hash: TxHash = self.tx_hash.parse()?;
        let address = WalletAddress::new(self.address)?;
        let mut assets = AssetBundle::new();
        for amount in self.amount {
            let unit: AssetId = amount.unit.parse()?;
            let quantity: u128 = amount
                .quantity
                .parse()
                .map_err(|_| WalletError::Decode(format!("quantity {:?}", amount.quantity)))?;
            assets.add(unit, quantity)?;
        }
        let mut output = SpendableOutput::new(OutRef::new(tx_hash, self.output_index), address, assets);
        if let Some(datum) = self.inline_datum {
            let bytes = hex::decode(&datum)
                .map_err(|_| WalletError::Decode(format!("inline datum {datum:?}")))?;
            output = output.with_datum(bytes);
        }
        Ok(output)
    }
}

// ── BlockfrostClient ────────────────────────────────────────────────────

/// HTTP client for the Blockfrost REST API.
#[derive(Clone)]
pub struct BlockfrostClient {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
}

impl BlockfrostClient {
    pub fn new(base_url: impl Into<String>, project_id: impl Into<String>) -> Result<Self, WalletError> {
        let project_id = project_id.into();
        if project_id.trim().is_empty() {
            return Err(WalletError::NotConfigured("blockfrost project id is empty".into()));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| WalletError::Request(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id,
        })
    }

    pub fn for_network(network: NetworkId, project_id: impl Into<String>) -> Result<Self, WalletError> {
        Self::new(default_base_url(network), project_id)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Unspent outputs at `address`.
    pub async fn utxos(&self, address: &WalletAddress) -> Result<Vec<SpendableOutput>, WalletError> {
        self.get_all(&format!("/addresses/{address}/utxos")).await
    }

    /// Unspent outputs at `address` holding `unit`.
    pub async fn utxos_with_unit(
        &self,
        address: &WalletAddress,
        unit: &AssetId,
    ) -> Result<Vec<SpendableOutput>, WalletError> {
        self.get_all(&format!("/addresses/{address}/utxos/{unit}")).await
    }

    async fn get_all(&self, path: &str) -> Result<Vec<SpendableOutput>, WalletError> {
        let mut outputs = Vec::new();
        for page in 1.. {
            let batch = self.get_page(path, page).await?;
            let last = batch.len() < PAGE_SIZE;
            for utxo in batch {
                outputs.push(utxo.into_output()?);
            }
            if last {
                break;
            }
        }
        tracing::debug!(path, outputs = outputs.len(), "fetched utxos from blockfrost");
        Ok(outputs)
    }

    /// One page of results. An unknown address is an empty page.
    async fn get_page(&self, path: &str, page: usize) -> Result<Vec<BlockfrostUtxo>, WalletError> {
        let url = format!("{}{path}?page={page}&count={PAGE_SIZE}", self.base_url);
        let response = self
            .http
            .get(&url)
            .header("project_id", &self.project_id)
            .send()
            .await
            .map_err(|e| WalletError::Request(format!("request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(WalletError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| WalletError::Decode(format!("{path}: {e}")))
    }
}

impl LedgerQuery for BlockfrostClient {
    async fn outputs_at_with_unit(
        &self,
        address: &WalletAddress,
        unit: &AssetId,
    ) -> Result<Vec<SpendableOutput>, CollaboratorError> {
        Ok(self.utxos_with_unit(address, unit).await?)
    }

    async fn holdings(&self, address: &WalletAddress) -> Result<Vec<Holding>, CollaboratorError> {
        let outputs = self.utxos(address).await?;
        Ok(aggregate_holdings(&outputs)?)
    }
}

// ── BlockfrostWallet ────────────────────────────────────────────────────

/// A read-only wallet: an address whose outputs are read through Blockfrost.
#[derive(Clone)]
pub struct BlockfrostWallet {
    client: BlockfrostClient,
    address: WalletAddress,
}

impl BlockfrostWallet {
    pub fn new(client: BlockfrostClient, address: WalletAddress) -> Self {
        Self { client, address }
    }
}

impl WalletSource for BlockfrostWallet {
    async fn address(&self) -> Result<WalletAddress, CollaboratorError> {
        Ok(self.address.clone())
    }

    async fn spendable_outputs(&self) -> Result<Vec<SpendableOutput>, CollaboratorError> {
        Ok(self.client.utxos(&self.address).await?)
    }
}

// ── CachingLedger ───────────────────────────────────────────────────────

/// A ledger whose holdings answers are served from an [`AssetCache`].
pub struct CachingLedger<L> {
    inner: L,
    cache: Mutex<AssetCache>,
}

impl<L> CachingLedger<L> {
    pub fn new(inner: L, cache: AssetCache) -> Self {
        Self {
            inner,
            cache: Mutex::new(cache),
        }
    }

    pub async fn invalidate(&self) {
        self.cache.lock().await.invalidate();
    }
}

impl<L: LedgerQuery + Sync> LedgerQuery for CachingLedger<L> {
    async fn outputs_at_with_unit(
        &self,
        address: &WalletAddress,
        unit: &AssetId,
    ) -> Result<Vec<SpendableOutput>, CollaboratorError> {
        self.inner.outputs_at_with_unit(address, unit).await
    }

    /// The cache lock is not held while the inner ledger is queried; two
    /// concurrent misses for one address both fetch and the later write wins.
    async fn holdings(&self, address: &WalletAddress) -> Result<Vec<Holding>, CollaboratorError> {
        let now = Timestamp::now();
        if let Some(holdings) = self.cache.lock().await.get(address, now) {
            tracing::debug!(%address, "holdings served from cache");
            return Ok(holdings.to_vec());
        }
        let holdings = self.inner.holdings(address).await?;
        self.cache.lock().await.set(address, holdings.clone(), now);
        Ok(holdings)
    }
}
