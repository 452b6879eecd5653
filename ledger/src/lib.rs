//! Claim ledger.
//!
//! The ledger tracks which identity tokens have claimed and which nonces have
//! been consumed, checks every presented signature against the configured
//! authority, and pays a fixed unit out of the reward pool exactly once per
//! identity token. All state lives behind a single lock, so each operation is
//! one serialized transaction.

pub mod abi;
pub mod error;
pub mod event;
pub mod ledger;
pub mod reader;

pub use abi::LedgerCall;
pub use error::LedgerError;
pub use event::{EventBus, LedgerEvent};
pub use ledger::{ClaimLedger, ClaimReceipt, LedgerConfig, LedgerSummary, DEFAULT_PAYOUT_UNIT};
pub use reader::LedgerReader;
