use agora_types::{AssetBundle, OutRef, TypesError};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("insufficient funds: short by {shortfall:?}")]
    InsufficientFunds { shortfall: AssetBundle },

    #[error("output {0} appears twice in the snapshot")]
    DuplicateInput(OutRef),

    #[error("quantity error: {0}")]
    Quantity(#[from] TypesError),
}
