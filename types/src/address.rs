//! Bech32 address string as handed over by wallets and indexers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

/// A ledger address in its bech32 text form (`addr1…` or `addr_test1…`).
///
/// The string is kept verbatim; structural decoding lives in `agora-crypto`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Mainnet human-readable prefix.
    pub const MAINNET_PREFIX: &'static str = "addr";
    /// Prefix shared by every test network.
    pub const TESTNET_PREFIX: &'static str = "addr_test";

    /// Wrap a raw address string, rejecting blank input.
    pub fn new(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        if s.trim().is_empty() || s.chars().any(char::is_whitespace) {
            return Err(TypesError::InvalidAddress(s));
        }
        Ok(Self(s))
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the address carries a test-network prefix.
    pub fn is_testnet(&self) -> bool {
        self.0.starts_with("addr_test1")
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WalletAddress {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<WalletAddress> for String {
    fn from(a: WalletAddress) -> Self {
        a.0
    }
}
