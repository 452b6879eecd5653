use thiserror::Error;

/// Failures reported by the claim ledger.
///
/// These are authoritative: a client that reaches the ledger through a
/// transaction gets the same variant back via [`LedgerError::from_revert_reason`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("identity token has already claimed")]
    AlreadyClaimed,

    #[error("nonce has already been used")]
    NonceReused,

    #[error("signature was not produced by the claim authority")]
    InvalidSignature,

    #[error("reward pool is below the payout unit")]
    InsufficientPool,

    #[error("caller is not the ledger owner")]
    NotOwner,

    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("arithmetic overflow")]
    Overflow,

    #[error("zero address is not a valid recipient")]
    ZeroAddress,

    #[error("invalid call data: {0}")]
    InvalidCall(String),

    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    #[error("transaction reverted: {0}")]
    Reverted(String),
}

const ALREADY_CLAIMED: &str = "Email already claimed";
const NONCE_REUSED: &str = "Nonce already used";
const INVALID_SIGNATURE: &str = "Invalid signature";
const INSUFFICIENT_POOL: &str = "Insufficient contract balance";
const NOT_OWNER: &str = "Ownable: caller is not the owner";
const INVALID_AMOUNT: &str = "Amount must be greater than 0";
const OVERFLOW: &str = "Arithmetic overflow";
const ZERO_ADDRESS: &str = "Invalid address";
const INVALID_CALL: &str = "Invalid call data";

impl LedgerError {
    /// Stable reason string carried by a reverted transaction.
    pub fn revert_reason(&self) -> String {
        match self {
            Self::AlreadyClaimed => ALREADY_CLAIMED.to_string(),
            Self::NonceReused => NONCE_REUSED.to_string(),
            Self::InvalidSignature => INVALID_SIGNATURE.to_string(),
            Self::InsufficientPool => INSUFFICIENT_POOL.to_string(),
            Self::NotOwner => NOT_OWNER.to_string(),
            Self::InvalidAmount => INVALID_AMOUNT.to_string(),
            Self::Overflow => OVERFLOW.to_string(),
            Self::ZeroAddress => ZERO_ADDRESS.to_string(),
            Self::InvalidCall(_) => INVALID_CALL.to_string(),
            Self::Unavailable(reason) | Self::Reverted(reason) => reason.clone(),
        }
    }

    /// Map a revert reason back to the typed error. Unknown reasons are kept
    /// verbatim in [`LedgerError::Reverted`].
    pub fn from_revert_reason(reason: &str) -> Self {
        match reason.trim() {
            ALREADY_CLAIMED => Self::AlreadyClaimed,
            NONCE_REUSED => Self::NonceReused,
            INVALID_SIGNATURE => Self::InvalidSignature,
            INSUFFICIENT_POOL => Self::InsufficientPool,
            NOT_OWNER => Self::NotOwner,
            INVALID_AMOUNT => Self::InvalidAmount,
            OVERFLOW => Self::Overflow,
            ZERO_ADDRESS => Self::ZeroAddress,
            INVALID_CALL => Self::InvalidCall(INVALID_CALL.to_string()),
            other => Self::Reverted(other.to_string()),
        }
    }
}
