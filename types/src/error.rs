//! Top-level error type shared across crates.

use thiserror::Error;

/// Errors raised while parsing, hashing, or signing protocol values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("malformed claim code: {0}")]
    MalformedCode(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("signing error: {0}")]
    Signing(String),
}
