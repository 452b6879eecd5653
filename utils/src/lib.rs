//! Shared utilities for the claim authorization protocol.

pub mod logging;

pub use logging::{init_logging, LogFormat};
