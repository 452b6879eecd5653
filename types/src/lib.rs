//! Fundamental types for the claim authorization protocol.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! addresses, digests, nonces, signatures, amounts, networks, and the claim code
//! that carries an authorization from booth staff to a winner.

pub mod address;
pub mod amount;
pub mod claim_code;
pub mod error;
pub mod hash;
pub mod keys;
pub mod network;
pub mod nonce;
pub mod signature;
pub mod time;

pub use address::Address;
pub use amount::TokenAmount;
pub use claim_code::ClaimCode;
pub use error::ClaimError;
pub use hash::{IdentityToken, MessageDigest, TxHash};
pub use keys::{KeyPair, PrivateKey};
pub use network::NetworkId;
pub use nonce::Nonce;
pub use signature::Signature;
pub use time::{Clock, SystemClock, Timestamp};
