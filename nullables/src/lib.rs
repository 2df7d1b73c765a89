//! Nullable infrastructure for deterministic testing.
//!
//! Every collaborator the locker talks to (wallet, ledger, clock) has an
//! in-memory stand-in here that:
//! - Returns exactly what the test configured
//! - Records what was sent to it
//! - Never touches the network
//!
//! Usage: hand these to `Locker::lock` / `Locker::unlock` / `Locker::settle`
//! in place of a real wallet or indexer.

pub mod clock;
pub mod ledger;
pub mod wallet;

pub use clock::NullClock;
pub use ledger::NullLedger;
pub use wallet::NullWallet;
