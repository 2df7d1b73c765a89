use agora_locker::CollaboratorError;
use agora_types::TypesError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("provider request failed: {0}")]
    Request(String),

    #[error("provider returned HTTP {status} for {path}")]
    Status { status: u16, path: String },

    #[error("invalid provider response: {0}")]
    Decode(String),

    #[error("invalid ledger value: {0}")]
    Types(#[from] TypesError),

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

impl From<WalletError> for CollaboratorError {
    fn from(e: WalletError) -> Self {
        match e {
            WalletError::Request(_) | WalletError::Status { .. } => Self::Network(e.to_string()),
            WalletError::InvalidAddress(_) | WalletError::NotConfigured(_) => {
                Self::Wallet(e.to_string())
            }
            WalletError::Decode(_) | WalletError::Types(_) => Self::Ledger(e.to_string()),
        }
    }
}
