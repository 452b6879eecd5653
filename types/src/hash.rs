//! 32-byte digest types: identity tokens, claim message digests, transaction hashes.
//!
//! All three share the same representation and text form (`0x` + 64 hex digits)
//! but are kept as distinct types so a message digest can never be passed where
//! an identity token is expected.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ClaimError;

macro_rules! digest_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name([u8; 32]);

        impl $name {
            pub const ZERO: Self = Self([0u8; 32]);

            pub const fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; 32]
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), hex::encode(&self.0[..4]))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = ClaimError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_bytes32(s).map(Self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

digest_type! {
    /// Keccak-256 of a normalized email address. The key the ledger claims against.
    IdentityToken
}

digest_type! {
    /// Keccak-256 of the packed (identity, recipient, nonce) claim message.
    MessageDigest
}

digest_type! {
    /// A 32-byte transaction hash.
    TxHash
}

/// Parse `0x`-prefixed (or bare) hex into exactly 32 bytes.
fn parse_bytes32(s: &str) -> Result<[u8; 32], ClaimError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(digits)
        .map_err(|e| ClaimError::InvalidInput(format!("invalid hex digest: {e}")))?;
    bytes.try_into().map_err(|v: Vec<u8>| {
        ClaimError::InvalidInput(format!("digest must be 32 bytes, got {}", v.len()))
    })
}
