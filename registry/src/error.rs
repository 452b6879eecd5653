use claim_types::ClaimError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("email is not on the waitlist: {0}")]
    NotRegistered(String),

    #[error("a gift has already been assigned to {0}")]
    GiftAlreadyAssigned(String),

    #[error("gift counters kept changing, gave up after {attempts} attempts")]
    Conflict { attempts: u32 },

    #[error("invalid email: {0}")]
    InvalidEmail(#[from] ClaimError),

    #[error("registry backend error: {0}")]
    Backend(String),
}
