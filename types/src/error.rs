//! Errors raised while constructing or combining ledger types.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid policy id {0:?}: expected 56 hex characters")]
    InvalidPolicyId(String),

    #[error("asset name is {len} bytes, maximum is {max}")]
    AssetNameTooLong { len: usize, max: usize },

    #[error("invalid asset unit {0:?}")]
    InvalidUnit(String),

    #[error("invalid transaction hash {0:?}: expected 64 hex characters")]
    InvalidTxHash(String),

    #[error("invalid output reference {0:?}: expected <tx hash>#<index>")]
    InvalidOutRef(String),

    #[error("invalid quantity {0:?}")]
    InvalidQuantity(String),

    #[error("negative quantity for {asset}: short by {deficit}")]
    NegativeQuantity { asset: String, deficit: u128 },

    #[error("quantity overflow for {0}")]
    Overflow(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),
}
