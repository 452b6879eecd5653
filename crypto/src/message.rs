//! Claim message encoding.
//!
//! Packed layout (84 bytes, no padding between fields):
//!
//! | offset | len | field                      |
//! |--------|-----|----------------------------|
//! | 0      | 32  | identity token             |
//! | 32     | 20  | recipient address          |
//! | 52     | 32  | nonce, big-endian uint256  |
//!
//! This is Solidity's `abi.encodePacked(bytes32, address, uint256)`. Issuer and
//! ledger must agree on it byte for byte; any change invalidates every code
//! already in circulation.

use claim_types::{Address, IdentityToken, MessageDigest, Nonce};

use crate::hash::{keccak256, keccak256_multi};

/// Length of the packed claim message.
pub const PACKED_MESSAGE_LEN: usize = 32 + 20 + 32;

/// Prefix applied by `personal_sign` / `signMessage` to a 32-byte payload.
const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Tightly pack the three claim fields.
pub fn pack_claim_message(
    identity: &IdentityToken,
    recipient: &Address,
    nonce: &Nonce,
) -> [u8; PACKED_MESSAGE_LEN] {
    let mut out = [0u8; PACKED_MESSAGE_LEN];
    out[..32].copy_from_slice(identity.as_bytes());
    out[32..52].copy_from_slice(recipient.as_bytes());
    out[52..].copy_from_slice(&nonce.to_be_bytes());
    out
}

/// Digest that the authority signs and the ledger recomputes.
pub fn encode_claim_message(
    identity: &IdentityToken,
    recipient: &Address,
    nonce: &Nonce,
) -> MessageDigest {
    MessageDigest::new(keccak256(&pack_claim_message(identity, recipient, nonce)))
}

/// Hash actually fed to ECDSA: the digest wrapped in the personal-message prefix.
pub fn eth_signed_message_hash(digest: &MessageDigest) -> [u8; 32] {
    keccak256_multi(&[PERSONAL_MESSAGE_PREFIX, digest.as_bytes()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_layout_offsets() {
        let identity = IdentityToken::new([0x11; 32]);
        let recipient = Address::new([0x22; 20]);
        let nonce = Nonce::from(0x0102u64);
        let packed = pack_claim_message(&identity, &recipient, &nonce);

        assert_eq!(packed.len(), 84);
        assert!(packed[..32].iter().all(|b| *b == 0x11));
        assert!(packed[32..52].iter().all(|b| *b == 0x22));
        assert!(packed[52..82].iter().all(|b| *b == 0));
        assert_eq!(&packed[82..], &[0x01, 0x02]);
    }

    #[test]
    fn each_field_changes_digest() {
        let id = IdentityToken::new([1; 32]);
        let to = Address::new([2; 20]);
        let n = Nonce::from(3u64);
        let base = encode_claim_message(&id, &to, &n);

        assert_ne!(base, encode_claim_message(&IdentityToken::new([9; 32]), &to, &n));
        assert_ne!(base, encode_claim_message(&id, &Address::new([9; 20]), &n));
        assert_ne!(base, encode_claim_message(&id, &to, &Nonce::from(4u64)));
    }

    #[test]
    fn personal_hash_differs_from_digest() {
        let digest = MessageDigest::new([7; 32]);
        assert_ne!(eth_signed_message_hash(&digest), *digest.as_bytes());
    }
}
