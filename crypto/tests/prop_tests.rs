use proptest::prelude::*;

use claim_crypto::{
    encode_claim_message, generate_keypair, hash_email, recover_signer, sign_digest,
};
use claim_types::{Address, IdentityToken, Nonce};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// A signature over the claim digest recovers to the signing authority.
    #[test]
    fn issued_signature_recovers_authority(
        email in "[a-z]{1,12}@[a-z]{1,8}\\.com",
        recipient in prop::array::uniform20(0u8..),
        nonce in 0u64..1_000_000_000,
    ) {
        let kp = generate_keypair();
        let digest = encode_claim_message(
            &hash_email(&email).unwrap(),
            &Address::new(recipient),
            &Nonce::from(nonce),
        );
        let sig = sign_digest(&digest, &kp.private).unwrap();
        prop_assert_eq!(recover_signer(&digest, &sig).unwrap(), kp.address);
    }

    /// Changing the recipient changes the recovered signer.
    #[test]
    fn recipient_binding_is_exact(
        a in prop::array::uniform20(0u8..),
        b in prop::array::uniform20(0u8..),
    ) {
        prop_assume!(a != b);
        let kp = generate_keypair();
        let identity = IdentityToken::new([7u8; 32]);
        let nonce = Nonce::from(42u64);
        let sig = sign_digest(
            &encode_claim_message(&identity, &Address::new(a), &nonce),
            &kp.private,
        )
        .unwrap();
        let other = encode_claim_message(&identity, &Address::new(b), &nonce);
        let recovered = recover_signer(&other, &sig);
        prop_assert!(recovered.map(|addr| addr != kp.address).unwrap_or(true));
    }

    /// Case and surrounding whitespace never change the identity token.
    #[test]
    fn email_hash_case_insensitive(local in "[a-zA-Z]{1,10}", pad in " {0,3}") {
        let email = format!("{pad}{local}@Example.com{pad}");
        prop_assert_eq!(
            hash_email(&email).unwrap(),
            hash_email(&email.to_lowercase()).unwrap()
        );
    }
}
