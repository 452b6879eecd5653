//! Claim code: the bearer credential handed to a winner.
//!
//! Text forms:
//! - legacy: `<signature>:<nonce>`
//! - versioned: `v1:<signature>:<nonce>`
//!
//! The signature is `0x` + 130 hex digits, the nonce a plain decimal integer.
//! [`ClaimCode::parse`] accepts both forms so codes printed before the version
//! tag existed stay redeemable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ClaimError;
use crate::nonce::Nonce;
use crate::signature::Signature;

const DELIMITER: char = ':';

/// Current version tag written by [`ClaimCode::format_versioned`].
pub const CODE_VERSION: &str = "v1";

/// A (signature, nonce) pair in transportable form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimCode {
    pub signature: Signature,
    pub nonce: Nonce,
}

impl ClaimCode {
    pub fn new(signature: Signature, nonce: Nonce) -> Self {
        Self { signature, nonce }
    }

    /// `<signature>:<nonce>`
    pub fn format(&self) -> String {
        format!("{}{DELIMITER}{}", self.signature, self.nonce)
    }

    /// `v1:<signature>:<nonce>`
    pub fn format_versioned(&self) -> String {
        format!("{CODE_VERSION}{DELIMITER}{}", self.format())
    }

    /// Parse either text form. Surrounding whitespace is ignored.
    pub fn parse(code: &str) -> Result<Self, ClaimError> {
        let fields: Vec<&str> = code.trim().split(DELIMITER).collect();
        let (signature, nonce) = match fields.as_slice() {
            [signature, nonce] => (*signature, *nonce),
            [version, signature, nonce] if *version == CODE_VERSION => (*signature, *nonce),
            [version, _, _] => {
                return Err(ClaimError::MalformedCode(format!(
                    "unsupported code version: {version:?}"
                )))
            }
            [_] => return Err(ClaimError::MalformedCode("missing ':' delimiter".into())),
            _ => {
                return Err(ClaimError::MalformedCode(format!(
                    "expected 2 fields, got {}",
                    fields.len()
                )))
            }
        };

        if signature.is_empty() {
            return Err(ClaimError::MalformedCode("empty signature".into()));
        }
        let signature: Signature = signature
            .parse()
            .map_err(|e: ClaimError| ClaimError::MalformedCode(e.to_string()))?;
        let nonce: Nonce = nonce
            .parse()
            .map_err(|e: ClaimError| ClaimError::MalformedCode(e.to_string()))?;

        Ok(Self { signature, nonce })
    }
}

impl fmt::Display for ClaimCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl FromStr for ClaimCode {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
