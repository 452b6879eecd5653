//! Nullable ledger reader that can never reach the ledger.

use async_trait::async_trait;
use claim_ledger::{LedgerError, LedgerReader};
use claim_types::{IdentityToken, Nonce, TokenAmount};

/// Every read fails with [`LedgerError::Unavailable`].
pub struct NullReader {
    reason: String,
}

impl NullReader {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail<T>(&self) -> Result<T, LedgerError> {
        Err(LedgerError::Unavailable(self.reason.clone()))
    }
}

impl Default for NullReader {
    fn default() -> Self {
        Self::new("null reader")
    }
}

#[async_trait]
impl LedgerReader for NullReader {
    async fn has_email_claimed(&self, _identity: &IdentityToken) -> Result<bool, LedgerError> {
        self.fail()
    }

    async fn is_nonce_used(&self, _nonce: &Nonce) -> Result<bool, LedgerError> {
        self.fail()
    }

    async fn get_balance(&self) -> Result<TokenAmount, LedgerError> {
        self.fail()
    }
}
