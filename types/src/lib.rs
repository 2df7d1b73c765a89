//! Fundamental types for the Agora deposit locker.
//!
//! This crate defines the ledger vocabulary shared by every other crate in the
//! workspace: asset identifiers, asset bundles, output references, spendable
//! outputs, addresses, timestamps and the ledger parameters used for coin
//! selection.

pub mod address;
pub mod asset;
pub mod bundle;
pub mod error;
pub mod hash;
pub mod network;
pub mod output;
pub mod params;
pub mod time;

pub use address::WalletAddress;
pub use asset::{AssetId, AssetName, PolicyId, BASE_UNIT};
pub use bundle::AssetBundle;
pub use error::TypesError;
pub use hash::TxHash;
pub use network::NetworkId;
pub use output::{Holding, OutRef, SpendableOutput};
pub use params::LedgerParams;
pub use time::Timestamp;
