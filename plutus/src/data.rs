//! The `PlutusData` value type and conversions into and out of it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::codec;
use crate::error::PlutusError;

/// A structured on-chain value.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum PlutusData {
    /// Tagged constructor application: sum-type alternative plus its fields.
    Constr { alternative: u64, fields: Vec<PlutusData> },
    /// Association list; key order is preserved.
    Map(Vec<(PlutusData, PlutusData)>),
    List(Vec<PlutusData>),
    Int(i128),
    Bytes(Vec<u8>),
}

impl PlutusData {
    pub fn constr(alternative: u64, fields: Vec<PlutusData>) -> Self {
        Self::Constr {
            alternative,
            fields,
        }
    }

    /// A constructor with no fields, the encoding of a plain enum variant.
    pub fn unit(alternative: u64) -> Self {
        Self::constr(alternative, Vec::new())
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    pub fn int(value: impl Into<i128>) -> Self {
        Self::Int(value.into())
    }

    /// Canonical CBOR bytes.
    pub fn to_cbor(&self) -> Vec<u8> {
        codec::encode(self)
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self, PlutusError> {
        codec::decode(bytes)
    }

    pub fn to_cbor_hex(&self) -> String {
        hex::encode(self.to_cbor())
    }

    pub fn from_cbor_hex(s: &str) -> Result<Self, PlutusError> {
        let bytes = hex::decode(s).map_err(|_| PlutusError::InvalidHex(s.into()))?;
        Self::from_cbor(&bytes)
    }

    /// Fields of constructor `alternative` holding exactly `arity` fields.
    pub fn expect_constr(&self, alternative: u64, arity: usize) -> Result<&[PlutusData], PlutusError> {
        match self {
            Self::Constr {
                alternative: alt,
                fields,
            } if *alt == alternative && fields.len() == arity => Ok(fields),
            other => Err(PlutusError::shape(
                format!("constructor {alternative} with {arity} fields"),
                other.kind(),
            )),
        }
    }

    pub fn expect_bytes(&self) -> Result<&[u8], PlutusError> {
        match self {
            Self::Bytes(b) => Ok(b),
            other => Err(PlutusError::shape("bytes", other.kind())),
        }
    }

    pub fn expect_int(&self) -> Result<i128, PlutusError> {
        match self {
            Self::Int(i) => Ok(*i),
            other => Err(PlutusError::shape("integer", other.kind())),
        }
    }

    fn kind(&self) -> String {
        match self {
            Self::Constr {
                alternative,
                fields,
            } => format!("constructor {alternative} with {} fields", fields.len()),
            Self::Map(_) => "map".into(),
            Self::List(_) => "list".into(),
            Self::Int(_) => "integer".into(),
            Self::Bytes(_) => "bytes".into(),
        }
    }
}

impl fmt::Debug for PlutusData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constr {
                alternative,
                fields,
            } => {
                write!(f, "Constr {alternative} ")?;
                f.debug_list().entries(fields).finish()
            }
            Self::Map(entries) => f
                .debug_map()
                .entries(entries.iter().map(|(k, v)| (k, v)))
                .finish(),
            Self::List(items) => f.debug_list().entries(items).finish(),
            Self::Int(i) => write!(f, "{i}"),
            Self::Bytes(b) => write!(f, "#{}", hex::encode(b)),
        }
    }
}

// Datums and redeemers travel as CBOR hex, the form indexers return.
impl Serialize for PlutusData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_cbor_hex())
    }
}

impl<'de> Deserialize<'de> for PlutusData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_cbor_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Types with a fixed on-chain representation.
pub trait ToPlutusData {
    fn to_plutus_data(&self) -> PlutusData;
}

/// Types that can be read back from their on-chain representation.
pub trait FromPlutusData: Sized {
    fn from_plutus_data(data: &PlutusData) -> Result<Self, PlutusError>;
}

impl ToPlutusData for PlutusData {
    fn to_plutus_data(&self) -> PlutusData {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expect_constr_checks_alternative_and_arity() {
        let d = PlutusData::constr(0, vec![PlutusData::int(1)]);
        assert!(d.expect_constr(0, 1).is_ok());
        assert!(d.expect_constr(1, 1).is_err());
        assert!(d.expect_constr(0, 2).is_err());
    }

    #[test]
    fn json_form_is_cbor_hex() {
        let d = PlutusData::unit(1);
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, "\"d87a80\"");
        let back: PlutusData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn debug_is_readable() {
        let d = PlutusData::constr(0, vec![PlutusData::bytes(vec![0xab]), PlutusData::int(-3)]);
        assert_eq!(format!("{d:?}"), "Constr 0 [#ab, -3]");
    }
}
