//! Single-use claim nonce.
//!
//! The issuer draws nonces from a small range, but the ledger accepts the full
//! 256-bit width of the on-chain integer field.

use primitive_types::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ClaimError;

/// A 256-bit unsigned nonce.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Nonce(U256);

impl Nonce {
    pub const ZERO: Self = Self(U256([0; 4]));

    pub fn new(value: U256) -> Self {
        Self(value)
    }

    pub fn value(&self) -> U256 {
        self.0
    }

    /// Interpret 32 big-endian bytes as a nonce.
    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(U256::from_big_endian(&bytes))
    }

    /// The 32-byte big-endian encoding used in the packed claim message.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for (i, byte) in out.iter_mut().enumerate() {
            // `U256::byte` indexes from the least significant end.
            *byte = self.0.byte(31 - i);
        }
        out
    }
}

impl From<u64> for Nonce {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<u32> for Nonce {
    fn from(value: u32) -> Self {
        Self(U256::from(value))
    }
}

impl FromStr for Nonce {
    type Err = ClaimError;

    /// Parse a plain decimal integer. Signs, whitespace, and empty input are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ClaimError::InvalidInput(format!(
                "nonce must be a non-negative decimal integer: {s:?}"
            )));
        }
        U256::from_dec_str(s)
            .map(Self)
            .map_err(|e| ClaimError::InvalidInput(format!("nonce out of range: {e:?}")))
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Nonce {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Nonce {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
