use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PowerError {
    #[error("weight configuration is empty")]
    EmptyConfig,

    #[error("malformed power configuration: {0}")]
    MalformedConfig(String),

    #[error("unknown aggregation mode {0:?}")]
    UnknownMode(String),

    #[error("negative weight {0:?}")]
    NegativeWeight(String),

    #[error("malformed weight {0:?}")]
    MalformedWeight(String),

    #[error("malformed asset selector {0:?}")]
    MalformedSelector(String),

    #[error("asset selector under policy {0} needs a non-empty asset name")]
    EmptyAssetName(String),

    #[error("entry {index} has a weight or a selector but not both")]
    IncompleteEntry { index: usize },

    #[error("voting power overflows 128 bits")]
    Overflow,
}

impl PowerError {
    /// Whether the error lies in the caller's configuration input.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::Overflow)
    }
}
