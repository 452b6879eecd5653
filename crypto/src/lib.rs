//! Cryptographic primitives for the claim authorization protocol.
//!
//! - **Keccak-256** for identity tokens and claim message digests
//! - **ECDSA secp256k1** recoverable signatures with the Ethereum
//!   personal-message prefix, so any Ethereum verifier recovers the same signer
//! - Address derivation from secp256k1 public keys

pub mod hash;
pub mod keys;
pub mod message;
pub mod sign;

pub use hash::{hash_email, keccak256, keccak256_multi, normalize_email};
pub use keys::{address_from_private, generate_keypair, keypair_from_private, parse_private_key};
pub use message::{encode_claim_message, eth_signed_message_hash, pack_claim_message};
pub use sign::{recover_signer, sign_digest, verify_signer};
