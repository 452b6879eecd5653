//! Keccak-256 hashing and the email → identity token mapping.

use claim_types::{ClaimError, IdentityToken};
use sha3::{Digest, Keccak256};

/// Compute the Keccak-256 hash of arbitrary data.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn keccak256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Canonical form of an email address: surrounding whitespace trimmed, lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Derive the identity token for an email address.
///
/// The token is Keccak-256 over the UTF-8 bytes of the normalized address.
/// Fails with `InvalidInput` if nothing is left after normalization.
pub fn hash_email(email: &str) -> Result<IdentityToken, ClaimError> {
    let normalized = normalize_email(email);
    if normalized.is_empty() {
        return Err(ClaimError::InvalidInput("email is empty".into()));
    }
    Ok(IdentityToken::new(keccak256(normalized.as_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak_empty_vector() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn keccak_hello_vector() {
        assert_eq!(
            hex::encode(keccak256(b"hello")),
            "1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
        );
    }

    #[test]
    fn keccak_multi_equivalent() {
        assert_eq!(keccak256(b"helloworld"), keccak256_multi(&[b"hello", b"world"]));
    }

    #[test]
    fn email_normalization_is_applied() {
        let a = hash_email("  Winner@Example.COM \n").unwrap();
        let b = hash_email("winner@example.com").unwrap();
        assert_eq!(a, b);
        assert_eq!(*a.as_bytes(), keccak256(b"winner@example.com"));
    }

    #[test]
    fn distinct_emails_distinct_tokens() {
        assert_ne!(hash_email("a@x.com").unwrap(), hash_email("b@x.com").unwrap());
    }

    #[test]
    fn blank_email_is_invalid() {
        assert!(matches!(hash_email("   "), Err(ClaimError::InvalidInput(_))));
        assert!(matches!(hash_email(""), Err(ClaimError::InvalidInput(_))));
    }
}
