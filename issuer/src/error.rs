use claim_ledger::LedgerError;
use claim_registry::{GiftKind, RegistryError};
use claim_types::ClaimError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IssuerError {
    #[error(transparent)]
    Claim(#[from] ClaimError),

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("email not found in waitlist, the user must join first")]
    NotRegistered,

    #[error("user won {}, only token winners can claim", gift_label(.gift))]
    NotEligible { gift: Option<GiftKind> },

    #[error("this email has already claimed its reward")]
    AlreadyClaimed,

    #[error("no unused nonce found after {attempts} draws")]
    NonceExhausted { attempts: u32 },

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("keystore error: {0}")]
    Keystore(String),
}

fn gift_label(gift: &Option<GiftKind>) -> &'static str {
    gift.map(|g| g.label()).unwrap_or("no gift")
}
