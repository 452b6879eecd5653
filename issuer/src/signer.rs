//! Authorization signing.

use claim_crypto::{encode_claim_message, hash_email, sign_digest, verify_signer};
use claim_types::{
    Address, ClaimCode, ClaimError, IdentityToken, MessageDigest, Nonce, PrivateKey, Signature,
};
use rand::Rng;
use serde::Serialize;

use crate::error::IssuerError;

/// Issued nonces are drawn uniformly from `[0, NONCE_SPACE)`.
pub const NONCE_SPACE: u64 = 1_000_000_000;

/// A signed permission for one recipient to claim for one identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Authorization {
    pub identity: IdentityToken,
    pub recipient: Address,
    pub nonce: Nonce,
    pub digest: MessageDigest,
    pub signature: Signature,
}

impl Authorization {
    pub fn claim_code(&self) -> ClaimCode {
        ClaimCode::new(self.signature, self.nonce)
    }
}

/// Sign the claim message for `(email, recipient, nonce)`.
///
/// The caller is responsible for checking that the identity has not claimed
/// yet and holds no other live authorization.
pub fn issue(
    email: &str,
    recipient: &Address,
    nonce: Nonce,
    key: &PrivateKey,
) -> Result<Authorization, IssuerError> {
    if recipient.is_zero() {
        return Err(ClaimError::InvalidInput("recipient is the zero address".into()).into());
    }
    let identity = hash_email(email)?;
    let digest = encode_claim_message(&identity, recipient, &nonce);
    let signature = sign_digest(&digest, key)?;
    Ok(Authorization {
        identity,
        recipient: *recipient,
        nonce,
        digest,
        signature,
    })
}

/// Check offline that `code` was signed by `authority` for this email and recipient.
pub fn verify_authorization(
    email: &str,
    recipient: &Address,
    code: &ClaimCode,
    authority: &Address,
) -> bool {
    let Ok(identity) = hash_email(email) else {
        return false;
    };
    let digest = encode_claim_message(&identity, recipient, &code.nonce);
    verify_signer(&digest, &code.signature, authority)
}

pub fn generate_nonce<R: Rng + ?Sized>(rng: &mut R) -> Nonce {
    Nonce::from(rng.gen_range(0..NONCE_SPACE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use claim_crypto::{generate_keypair, recover_signer};
    use rand::rngs::mock::StepRng;

    const RECIPIENT: Address = Address::new([0xaa; 20]);

    #[test]
    fn issued_code_verifies() {
        let authority = generate_keypair();
        let auth = issue("w@x.com", &RECIPIENT, Nonce::from(42u64), &authority.private).unwrap();

        assert!(matches!(auth.signature.v(), 27 | 28));
        assert_eq!(recover_signer(&auth.digest, &auth.signature).unwrap(), authority.address);
        assert!(verify_authorization(
            "W@X.COM",
            &RECIPIENT,
            &auth.claim_code(),
            &authority.address
        ));
    }

    #[test]
    fn code_does_not_transfer_to_other_recipient() {
        let authority = generate_keypair();
        let auth = issue("w@x.com", &RECIPIENT, Nonce::from(42u64), &authority.private).unwrap();
        let other = Address::new([0xbb; 20]);
        let code = auth.claim_code();
        assert!(!verify_authorization("w@x.com", &other, &code, &authority.address));
        assert!(!verify_authorization("v@x.com", &RECIPIENT, &code, &authority.address));
    }

    #[test]
    fn bad_inputs() {
        let authority = generate_keypair();
        assert!(matches!(
            issue("  ", &RECIPIENT, Nonce::ZERO, &authority.private),
            Err(IssuerError::Claim(ClaimError::InvalidInput(_)))
        ));
        assert!(matches!(
            issue("w@x.com", &Address::ZERO, Nonce::ZERO, &authority.private),
            Err(IssuerError::Claim(ClaimError::InvalidInput(_)))
        ));
        // Zero is not a valid secp256k1 scalar.
        assert!(matches!(
            issue("w@x.com", &RECIPIENT, Nonce::ZERO, &PrivateKey([0u8; 32])),
            Err(IssuerError::Claim(ClaimError::Signing(_)))
        ));
    }

    #[test]
    fn nonces_stay_in_range() {
        let mut rng = rand::thread_rng();
        let limit = Nonce::from(NONCE_SPACE);
        for _ in 0..1_000 {
            assert!(generate_nonce(&mut rng) < limit);
        }
        assert_eq!(generate_nonce(&mut StepRng::new(0, 0)), Nonce::ZERO);
    }
}
