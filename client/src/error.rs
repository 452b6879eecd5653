use claim_ledger::LedgerError;
use claim_types::{Address, ClaimError, NetworkId, TxHash};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no wallet connected")]
    WalletNotConnected,

    #[error("wallet is on chain {actual}, switch to {expected}")]
    WrongNetwork { expected: NetworkId, actual: u64 },

    #[error("connected wallet {wallet} is not the recipient {recipient} this code was issued for")]
    AddressMismatch { wallet: Address, recipient: Address },

    /// The transaction was broadcast but not confirmed in time. It may still
    /// land; retry only with a fresh code.
    #[error("transaction {tx_hash} not confirmed in time")]
    Unconfirmed { tx_hash: TxHash },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Claim(#[from] ClaimError),

    #[error("wallet error: {0}")]
    Wallet(String),

    #[error("RPC error: {0}")]
    Rpc(String),
}

impl ClientError {
    /// Only an unconfirmed submission is worth retrying, and then with a new code.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unconfirmed { .. })
    }
}
