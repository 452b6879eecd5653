//! secp256k1 key generation and address derivation.

use claim_types::{Address, ClaimError, KeyPair, PrivateKey};
use k256::ecdsa::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::hash::keccak256;

/// Generate a new key pair from a secure random source.
pub fn generate_keypair() -> KeyPair {
    let signing_key = SigningKey::random(&mut OsRng);
    let address = address_of(signing_key.verifying_key());
    KeyPair {
        address,
        private: PrivateKey(signing_key.to_bytes().into()),
    }
}

/// Reconstruct a full key pair from a private key.
pub fn keypair_from_private(private: PrivateKey) -> Result<KeyPair, ClaimError> {
    let address = address_from_private(&private)?;
    Ok(KeyPair { address, private })
}

/// Derive the account address controlled by a private key.
pub fn address_from_private(private: &PrivateKey) -> Result<Address, ClaimError> {
    let signing_key = signing_key(private)?;
    Ok(address_of(signing_key.verifying_key()))
}

/// Parse a hex private key, with or without `0x`.
///
/// Fails with `Signing` if the text is not 32 bytes of hex or the scalar is
/// zero or not below the curve order.
pub fn parse_private_key(hex_key: &str) -> Result<PrivateKey, ClaimError> {
    let digits = hex_key.trim();
    let digits = digits.strip_prefix("0x").unwrap_or(digits);
    let bytes = Zeroizing::new(
        hex::decode(digits)
            .map_err(|_| ClaimError::Signing("private key is not valid hex".into()))?,
    );
    if bytes.len() != 32 {
        return Err(ClaimError::Signing(format!(
            "private key must be 32 bytes, got {}",
            bytes.len()
        )));
    }
    let mut key = PrivateKey([0u8; 32]);
    key.0.copy_from_slice(&bytes);
    signing_key(&key)?;
    Ok(key)
}

pub(crate) fn signing_key(private: &PrivateKey) -> Result<SigningKey, ClaimError> {
    SigningKey::from_slice(private.as_bytes())
        .map_err(|_| ClaimError::Signing("private key is not a valid secp256k1 scalar".into()))
}

/// Account address: last 20 bytes of Keccak-256 over the uncompressed point (sans 0x04 tag).
pub(crate) fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash[12..]);
    Address::new(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_one_has_known_address() {
        let key = parse_private_key(&format!("{:064x}", 1)).unwrap();
        assert_eq!(
            address_from_private(&key).unwrap().to_string(),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
    }

    #[test]
    fn well_known_dev_key_address() {
        let key = parse_private_key(
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        )
        .unwrap();
        assert_eq!(
            address_from_private(&key).unwrap().to_string(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
    }

    #[test]
    fn generated_keypair_is_consistent() {
        let kp = generate_keypair();
        assert_eq!(address_from_private(&kp.private).unwrap(), kp.address);
        assert!(!kp.address.is_zero());
    }

    #[test]
    fn keypair_from_private_roundtrip() {
        let kp1 = generate_keypair();
        let kp2 = keypair_from_private(PrivateKey(kp1.private.0)).unwrap();
        assert_eq!(kp1.address, kp2.address);
    }

    #[test]
    fn malformed_keys_rejected() {
        assert!(matches!(parse_private_key("xyz"), Err(ClaimError::Signing(_))));
        assert!(matches!(parse_private_key("0x1234"), Err(ClaimError::Signing(_))));
        // Zero is not a valid scalar.
        assert!(matches!(
            parse_private_key(&"00".repeat(32)),
            Err(ClaimError::Signing(_))
        ));
        // Curve order n is out of range.
        assert!(matches!(
            parse_private_key("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141"),
            Err(ClaimError::Signing(_))
        ));
    }
}
