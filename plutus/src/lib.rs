//! Structured on-chain data for the settlement layer.
//!
//! Every datum, redeemer and script parameter the locker produces is a
//! [`PlutusData`] value. Its byte form is the settlement layer's canonical
//! CBOR encoding, which must be reproduced bit for bit: receipt identities are
//! hashes of these bytes.

pub mod codec;
pub mod data;
pub mod error;
pub mod ledger;

pub use codec::{decode, encode};
pub use data::{FromPlutusData, PlutusData, ToPlutusData};
pub use error::PlutusError;
