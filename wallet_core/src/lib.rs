//! Wallet-side services for the Agora deposit locker.
//!
//! Provides what a front end needs around the locker core:
//! - An explicit, time-bounded cache of an address's holdings
//! - Holdings aggregation with display names
//! - A Blockfrost client implementing the wallet and ledger collaborators

pub mod blockfrost;
pub mod cache;
pub mod error;
pub mod holdings;

pub use blockfrost::{BlockfrostClient, BlockfrostWallet, CachingLedger};
pub use cache::{AssetCache, DEFAULT_TTL_SECS};
pub use error::WalletError;
pub use holdings::{aggregate_holdings, display_name};
