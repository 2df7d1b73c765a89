//! Shared utilities for the Agora locker.

pub mod logging;

pub use logging::{init_tracing, LogFormat};
