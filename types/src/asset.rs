//! Asset identifiers: the base currency and policy-scoped native assets.
//!
//! The unit string of the base currency is `lovelace`. A native asset's unit
//! string is `hex(policy_id) ++ hex(asset_name)`: the first 56 characters name
//! the minting policy, the rest (0..=64 characters) the asset.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

/// Unit string of the ledger's native currency.
pub const BASE_UNIT: &str = "lovelace";

/// A 28-byte minting policy id.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PolicyId([u8; 28]);

impl PolicyId {
    pub const LEN: usize = 28;
    pub const HEX_LEN: usize = 56;

    pub fn new(bytes: [u8; 28]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 28] {
        &self.0
    }
}

impl fmt::Debug for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PolicyId({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for PolicyId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != Self::HEX_LEN {
            return Err(TypesError::InvalidPolicyId(s.into()));
        }
        let mut bytes = [0u8; 28];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| TypesError::InvalidPolicyId(s.into()))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for PolicyId {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PolicyId> for String {
    fn from(id: PolicyId) -> Self {
        id.to_string()
    }
}

/// An asset name under a policy, at most 32 bytes.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetName(Vec<u8>);

impl AssetName {
    pub const MAX_LEN: usize = 32;

    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, TypesError> {
        let bytes = bytes.into();
        if bytes.len() > Self::MAX_LEN {
            return Err(TypesError::AssetNameTooLong {
                len: bytes.len(),
                max: Self::MAX_LEN,
            });
        }
        Ok(Self(bytes))
    }

    pub fn from_hex(s: &str) -> Result<Self, TypesError> {
        let bytes = hex::decode(s).map_err(|_| TypesError::InvalidHex(s.into()))?;
        Self::new(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The name as text, when it is printable UTF-8 once NUL bytes are dropped.
    pub fn as_text(&self) -> Option<String> {
        let text = std::str::from_utf8(&self.0).ok()?.replace('\0', "");
        if text.trim().is_empty() || text.chars().any(char::is_control) {
            return None;
        }
        Some(text)
    }
}

impl From<[u8; 32]> for AssetName {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Debug for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetName({})", hex::encode(&self.0))
    }
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

/// Identifies one fungible asset on the ledger.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AssetId {
    /// The ledger's native currency.
    Base,
    /// A native asset: minting policy plus asset name.
    Native { policy: PolicyId, name: AssetName },
}

impl AssetId {
    pub fn native(policy: PolicyId, name: AssetName) -> Self {
        Self::Native { policy, name }
    }

    pub fn is_base(&self) -> bool {
        matches!(self, Self::Base)
    }

    pub fn policy(&self) -> Option<&PolicyId> {
        match self {
            Self::Base => None,
            Self::Native { policy, .. } => Some(policy),
        }
    }

    pub fn name(&self) -> Option<&AssetName> {
        match self {
            Self::Base => None,
            Self::Native { name, .. } => Some(name),
        }
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({self})")
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => f.write_str(BASE_UNIT),
            Self::Native { policy, name } => write!(f, "{policy}{name}"),
        }
    }
}

impl FromStr for AssetId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == BASE_UNIT {
            return Ok(Self::Base);
        }
        if s.len() < PolicyId::HEX_LEN || !s.is_char_boundary(PolicyId::HEX_LEN) {
            return Err(TypesError::InvalidUnit(s.into()));
        }
        let (policy, name) = s.split_at(PolicyId::HEX_LEN);
        let policy = policy
            .parse()
            .map_err(|_| TypesError::InvalidUnit(s.into()))?;
        let name = AssetName::from_hex(name)?;
        Ok(Self::Native { policy, name })
    }
}

impl TryFrom<String> for AssetId {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AssetId> for String {
    fn from(id: AssetId) -> Self {
        id.to_string()
    }
}
