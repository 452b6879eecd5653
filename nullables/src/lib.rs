//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies (clock, randomness, the user's wallet, the ledger
//! node) sit behind traits. This crate provides test-friendly implementations
//! that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod random;
pub mod reader;
pub mod wallet;

pub use clock::NullClock;
pub use random::NullRandom;
pub use reader::NullReader;
pub use wallet::NullWallet;
