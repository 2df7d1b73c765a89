//! Coin selection for deposits.
//!
//! Picks the smallest prefix of a wallet snapshot, scanned in ascending
//! base-currency order, that covers a required bundle plus the fee buffer and
//! the minimum balance of the change output. The result is deterministic: the
//! same snapshot always yields the same inputs in the same order, which the
//! receipt identity depends on.

pub mod error;
pub mod selector;

pub use error::SelectionError;
pub use selector::{select, Selection};
