//! Time-bounded cache of one address's holdings.
//!
//! The cache is an ordinary value owned by the caller. It remembers the
//! holdings of the last address it was filled for and answers only for that
//! address until `expires_at` has passed.

use agora_types::{AssetId, Holding, Timestamp, WalletAddress};
use std::collections::HashMap;

/// Default time-to-live: five minutes.
pub const DEFAULT_TTL_SECS: u64 = 5 * 60;

#[derive(Clone, Debug)]
pub struct AssetCache {
    ttl_secs: u64,
    address: Option<WalletAddress>,
    holdings: Vec<Holding>,
    by_unit: HashMap<AssetId, usize>,
    expires_at: Option<Timestamp>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL_SECS)
    }

    pub fn with_ttl(ttl_secs: u64) -> Self {
        Self {
            ttl_secs,
            address: None,
            holdings: Vec::new(),
            by_unit: HashMap::new(),
            expires_at: None,
        }
    }

    /// Replace the cached holdings with those of `address`, fetched at `now`.
    pub fn set(&mut self, address: &WalletAddress, holdings: Vec<Holding>, now: Timestamp) {
        self.by_unit = holdings
            .iter()
            .enumerate()
            .map(|(i, h)| (h.unit.clone(), i))
            .collect();
        self.holdings = holdings;
        self.address = Some(address.clone());
        self.expires_at = Some(now.plus_secs(self.ttl_secs));
        tracing::debug!(%address, holdings = self.holdings.len(), expires_at = %now.plus_secs(self.ttl_secs), "asset cache filled");
    }

    /// Cached holdings of `address`, unless the cache belongs to another
    /// address or has expired.
    pub fn get(&self, address: &WalletAddress, now: Timestamp) -> Option<&[Holding]> {
        if self.address.as_ref() != Some(address) || self.is_expired(now) {
            return None;
        }
        Some(&self.holdings)
    }

    /// A single cached holding, regardless of expiry.
    pub fn get_asset(&self, unit: &AssetId) -> Option<&Holding> {
        self.by_unit.get(unit).map(|&i| &self.holdings[i])
    }

    /// Whether `get(address, now)` would return a non-empty answer.
    pub fn is_valid_for(&self, address: &WalletAddress, now: Timestamp) -> bool {
        self.get(address, now).is_some_and(|h| !h.is_empty())
    }

    pub fn invalidate(&mut self) {
        self.address = None;
        self.holdings.clear();
        self.by_unit.clear();
        self.expires_at = None;
    }

    pub fn expires_at(&self) -> Option<Timestamp> {
        self.expires_at
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.map_or(true, |at| at.is_before(now))
    }
}

impl Default for AssetCache {
    fn default() -> Self {
        Self::new()
    }
}
