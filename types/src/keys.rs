//! Authority key types.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::address::Address;

/// A 32-byte secp256k1 secret scalar.
///
/// This type intentionally does not implement `Debug`, `Serialize`, or `Clone`
/// to prevent accidental exposure. Key bytes are zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey(pub [u8; 32]);

impl PrivateKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// A secp256k1 key pair, identified by its derived account address.
///
/// Use `claim_crypto::generate_keypair()` or `claim_crypto::keypair_from_private()`
/// to construct key pairs. This struct is intentionally just data.
pub struct KeyPair {
    pub address: Address,
    pub private: PrivateKey,
}
