//! Read-only view of a claim ledger.
//!
//! Issuers and clients consult the ledger through this trait so the same
//! workflow runs against the in-process ledger in tests and a JSON-RPC node in
//! production.

use async_trait::async_trait;
use claim_types::{IdentityToken, Nonce, TokenAmount};

use crate::error::LedgerError;
use crate::ledger::ClaimLedger;

#[async_trait]
pub trait LedgerReader: Send + Sync {
    async fn has_email_claimed(&self, identity: &IdentityToken) -> Result<bool, LedgerError>;

    async fn is_nonce_used(&self, nonce: &Nonce) -> Result<bool, LedgerError>;

    async fn get_balance(&self) -> Result<TokenAmount, LedgerError>;
}

#[async_trait]
impl LedgerReader for ClaimLedger {
    async fn has_email_claimed(&self, identity: &IdentityToken) -> Result<bool, LedgerError> {
        Ok(ClaimLedger::has_email_claimed(self, identity))
    }

    async fn is_nonce_used(&self, nonce: &Nonce) -> Result<bool, LedgerError> {
        Ok(ClaimLedger::is_nonce_used(self, nonce))
    }

    async fn get_balance(&self) -> Result<TokenAmount, LedgerError> {
        Ok(ClaimLedger::get_balance(self))
    }
}

#[async_trait]
impl<T: LedgerReader + ?Sized> LedgerReader for std::sync::Arc<T> {
    async fn has_email_claimed(&self, identity: &IdentityToken) -> Result<bool, LedgerError> {
        (**self).has_email_claimed(identity).await
    }

    async fn is_nonce_used(&self, nonce: &Nonce) -> Result<bool, LedgerError> {
        (**self).is_nonce_used(nonce).await
    }

    async fn get_balance(&self) -> Result<TokenAmount, LedgerError> {
        (**self).get_balance().await
    }
}
