//! Personal-message ECDSA signing and signer recovery.

use claim_types::{Address, ClaimError, MessageDigest, PrivateKey, Signature};
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, VerifyingKey};

use crate::keys::{address_of, signing_key};
use crate::message::eth_signed_message_hash;

/// Offset added to the recovery id in the `v` byte of personal-message signatures.
const V_OFFSET: u8 = 27;

/// Sign a claim digest with the personal-message prefix.
///
/// Output is `r ‖ s ‖ v` with low-s and `v` ∈ {27, 28}. Signing is
/// deterministic (RFC 6979).
pub fn sign_digest(digest: &MessageDigest, private: &PrivateKey) -> Result<Signature, ClaimError> {
    let key = signing_key(private)?;
    let prehash = eth_signed_message_hash(digest);
    let (sig, recovery_id) = key
        .sign_prehash_recoverable(&prehash)
        .map_err(|e| ClaimError::Signing(e.to_string()))?;

    let mut out = [0u8; 65];
    out[..64].copy_from_slice(&sig.to_bytes());
    out[64] = V_OFFSET + recovery_id.to_byte();
    Ok(Signature(out))
}

/// Recover the address that signed `digest`.
///
/// Accepts `v` as 27/28 or as the raw recovery id 0/1. High-s signatures are
/// rejected so a signature cannot be re-presented in its malleated twin form.
pub fn recover_signer(
    digest: &MessageDigest,
    signature: &Signature,
) -> Result<Address, ClaimError> {
    let recovery_byte = match signature.v() {
        v @ (27 | 28) => v - V_OFFSET,
        v @ (0 | 1) => v,
        other => {
            return Err(ClaimError::InvalidSignature(format!(
                "unsupported recovery byte {other}"
            )))
        }
    };
    let recovery_id = RecoveryId::from_byte(recovery_byte)
        .ok_or_else(|| ClaimError::InvalidSignature("bad recovery id".into()))?;

    let sig = EcdsaSignature::from_slice(&signature.as_bytes()[..64])
        .map_err(|_| ClaimError::InvalidSignature("r or s out of range".into()))?;
    if sig.normalize_s().is_some() {
        return Err(ClaimError::InvalidSignature("non-canonical high-s value".into()));
    }

    let prehash = eth_signed_message_hash(digest);
    let key = VerifyingKey::recover_from_prehash(&prehash, &sig, recovery_id)
        .map_err(|_| ClaimError::InvalidSignature("public key recovery failed".into()))?;
    Ok(address_of(&key))
}

/// Whether `signature` over `digest` was produced by `expected`.
pub fn verify_signer(digest: &MessageDigest, signature: &Signature, expected: &Address) -> bool {
    matches!(recover_signer(digest, signature), Ok(signer) if signer == *expected)
}
