//! 20-byte account address with EIP-55 mixed-case checksum.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

use crate::error::ClaimError;

/// An account address on the target chain.
///
/// Parsed from `0x` + 40 hex digits. All-lowercase and all-uppercase input is
/// accepted as-is; mixed-case input must carry a valid EIP-55 checksum.
/// Always displayed in checksummed form.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; 20]);

impl Address {
    pub const ZERO: Self = Self([0u8; 20]);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Take the low 20 bytes of a 32-byte word (how addresses sit in ABI words).
    pub fn from_word(word: &[u8; 32]) -> Self {
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&word[12..]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// EIP-55 checksummed representation, `0x`-prefixed.
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = Keccak256::digest(lower.as_bytes());
        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = (hash[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl FromStr for Address {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| ClaimError::InvalidInput(format!("address must start with 0x: {s}")))?;
        if digits.len() != 40 {
            return Err(ClaimError::InvalidInput(format!(
                "address must have 40 hex digits, got {}",
                digits.len()
            )));
        }
        let raw = hex::decode(digits)
            .map_err(|e| ClaimError::InvalidInput(format!("invalid address hex: {e}")))?;
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&raw);
        let address = Self(bytes);

        let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper && address.to_checksum()[2..] != *digits {
            return Err(ClaimError::InvalidInput(format!(
                "address checksum mismatch: {s}"
            )));
        }
        Ok(address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Checksum vectors from EIP-55.
    const VECTORS: [&str; 4] = [
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
    ];

    #[test]
    fn checksum_matches_reference_vectors() {
        for v in VECTORS {
            let addr: Address = v.parse().unwrap();
            assert_eq!(addr.to_checksum(), v);
        }
    }

    #[test]
    fn lowercase_and_uppercase_accepted() {
        let lower = VECTORS[0].to_lowercase();
        let upper = format!("0x{}", VECTORS[0][2..].to_uppercase());
        let a: Address = lower.parse().unwrap();
        let b: Address = upper.parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), VECTORS[0]);
    }

    #[test]
    fn bad_checksum_rejected() {
        // Flip the case of one letter in a valid checksummed address.
        let bad = VECTORS[0].replacen("aA", "Aa", 1);
        assert!(matches!(
            bad.parse::<Address>(),
            Err(ClaimError::InvalidInput(_))
        ));
    }

    #[test]
    fn malformed_rejected() {
        assert!("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".parse::<Address>().is_err());
        assert!("0x1234".parse::<Address>().is_err());
        assert!("0xzzAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".parse::<Address>().is_err());
    }

    #[test]
    fn from_word_takes_low_bytes() {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(&[0x11; 20]);
        assert_eq!(Address::from_word(&word), Address::new([0x11; 20]));
    }
}
