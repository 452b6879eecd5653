//! Claim submission client.
//!
//! Turns a claim code into a `claimReward` transaction sent from the winner's
//! own wallet. Advisory pre-checks against the ledger give fast feedback but
//! fail open; the ledger re-validates everything when the transaction lands.

pub mod error;
pub mod rpc;
pub mod submit;
pub mod wallet;

pub use error::ClientError;
pub use rpc::RpcLedgerReader;
pub use submit::{
    prepare_claim, ClaimClient, ClaimOutcome, ClientConfig, PreparedClaim,
    DEFAULT_CONFIRMATION_TIMEOUT,
};
pub use wallet::{TransactionReceipt, TransactionRequest, TxStatus, WalletProvider};
