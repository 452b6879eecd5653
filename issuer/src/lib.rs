//! Claim issuance for trusted booth-staff tooling.
//!
//! - [`signer`]: sign an (email, recipient, nonce) authorization with the authority key
//! - [`keystore`]: keep the authority key encrypted at rest
//! - [`workflow`]: the full booth flow, checking the registry and the ledger before signing

pub mod error;
pub mod keystore;
pub mod signer;
pub mod workflow;

pub use error::IssuerError;
pub use keystore::{
    decrypt_keystore, encrypt_keystore, load_keystore, save_keystore, KdfParams, KeystoreFile,
};
pub use signer::{generate_nonce, issue, verify_authorization, Authorization, NONCE_SPACE};
pub use workflow::{validate_email, IssuanceDesk, IssueOutcome};
