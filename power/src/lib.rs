//! Voting power: how much say a deposit buys.
//!
//! A [`PowerConfig`] pairs an aggregation mode with an ordered list of
//! `(weight, selector)` entries. Each entry turns the deposit into one partial
//! value; the mode folds the partials into a single integer.
//!
//! The configuration is also a script parameter: its on-chain encoding fixes
//! the minting policy id and the locker address, so two deposits share
//! receipts and power tokens only if their configurations are identical.

pub mod config;
pub mod error;
pub mod evaluator;
pub mod wire;

pub use config::{AggregationMode, AssetClass, AssetSelector, PowerConfig, WeightConfig, WeightEntry};
pub use error::PowerError;
pub use evaluator::{evaluate, partial_power};
pub use wire::{WireConfig, WireEntry};
