use agora_power::PowerError;
use agora_selection::SelectionError;
use agora_types::{AssetBundle, OutRef, TypesError};
use thiserror::Error;

/// Failure reported by a wallet, ledger or submission collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("wallet: {0}")]
    Wallet(String),

    #[error("ledger query: {0}")]
    Ledger(String),

    #[error("network: {0}")]
    Network(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LockerError {
    #[error("insufficient funds: short by {shortfall:?}")]
    InsufficientFunds { shortfall: AssetBundle },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid wallet snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("no locked output holds receipt {0}")]
    ReceiptNotFound(String),

    #[error("receipt {presented} does not match the lock record, which names {expected}")]
    ReceiptMismatch { presented: String, expected: String },

    #[error("invalid lock record at {out_ref}: {reason}")]
    InvalidLockRecord { out_ref: OutRef, reason: String },

    #[error("arithmetic overflow: {0}")]
    Overflow(String),

    #[error("external collaborator failed: {0}")]
    ExternalCollaborator(#[from] CollaboratorError),
}

impl LockerError {
    /// Whether the same request may succeed later without changing it.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InsufficientFunds { .. } | Self::ExternalCollaborator(_)
        )
    }
}

impl From<PowerError> for LockerError {
    fn from(e: PowerError) -> Self {
        match e {
            PowerError::Overflow => Self::Overflow(e.to_string()),
            other => Self::InvalidConfiguration(other.to_string()),
        }
    }
}

impl From<SelectionError> for LockerError {
    fn from(e: SelectionError) -> Self {
        match e {
            SelectionError::InsufficientFunds { shortfall } => Self::InsufficientFunds { shortfall },
            SelectionError::DuplicateInput(_) => Self::InvalidSnapshot(e.to_string()),
            SelectionError::Quantity(inner) => inner.into(),
        }
    }
}

impl From<TypesError> for LockerError {
    fn from(e: TypesError) -> Self {
        Self::Overflow(e.to_string())
    }
}
