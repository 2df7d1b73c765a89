//! Spendable outputs and wallet holdings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::address::WalletAddress;
use crate::asset::AssetId;
use crate::bundle::AssetBundle;
use crate::error::TypesError;
use crate::hash::TxHash;

/// Reference to a transaction output: origin transaction id plus output index.
///
/// Ordered by transaction id bytes, then index. This is the canonical order
/// the settlement layer uses for transaction inputs.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OutRef {
    pub tx_hash: TxHash,
    pub index: u32,
}

impl OutRef {
    pub fn new(tx_hash: TxHash, index: u32) -> Self {
        Self { tx_hash, index }
    }
}

impl fmt::Debug for OutRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutRef({:?}#{})", self.tx_hash, self.index)
    }
}

impl fmt::Display for OutRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.tx_hash, self.index)
    }
}

/// Parses `<tx hash hex>#<index>`.
impl FromStr for OutRef {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hash, index) = s
            .split_once('#')
            .ok_or_else(|| TypesError::InvalidOutRef(s.into()))?;
        let index = index
            .parse()
            .map_err(|_| TypesError::InvalidOutRef(s.into()))?;
        Ok(Self::new(hash.parse()?, index))
    }
}

/// An unspent output as observed in a wallet or ledger snapshot.
///
/// Immutable once observed. Once a settlement transaction consumes it, the
/// snapshot it came from is stale and must not be reused.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendableOutput {
    pub out_ref: OutRef,
    pub address: WalletAddress,
    pub assets: AssetBundle,
    /// Inline datum as raw CBOR, when the output carries one.
    #[serde(default, with = "opt_hex", skip_serializing_if = "Option::is_none")]
    pub datum: Option<Vec<u8>>,
}

impl SpendableOutput {
    pub fn new(out_ref: OutRef, address: WalletAddress, assets: AssetBundle) -> Self {
        Self {
            out_ref,
            address,
            assets,
            datum: None,
        }
    }

    pub fn with_datum(mut self, datum: Vec<u8>) -> Self {
        self.datum = Some(datum);
        self
    }

    pub fn base_quantity(&self) -> u128 {
        self.assets.base_quantity()
    }
}

/// One asset held by an address, aggregated across its outputs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub unit: AssetId,
    #[serde(with = "quantity_string")]
    pub quantity: u128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Holding {
    pub fn new(unit: AssetId, quantity: u128) -> Self {
        Self {
            unit,
            quantity,
            display_name: None,
        }
    }
}

mod opt_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => s.serialize_some(&hex::encode(bytes)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|s| hex::decode(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

mod quantity_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u128, D::Error> {
        String::deserialize(d)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}
