//! The capability a user's wallet must provide.

use async_trait::async_trait;
use claim_types::{Address, NetworkId, TxHash};
use serde::Serialize;

use crate::error::ClientError;

/// A contract call for the wallet to sign and broadcast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    #[serde(serialize_with = "hex_data")]
    pub data: Vec<u8>,
    pub chain_id: u64,
}

fn hex_data<S: serde::Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("0x{}", hex::encode(data)))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxStatus {
    Success,
    Reverted { reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub status: TxStatus,
}

#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// The account the user has connected, if any.
    async fn connected_address(&self) -> Option<Address>;

    async fn chain_id(&self) -> Result<u64, ClientError>;

    /// Ask the wallet to move to `network`. The user may refuse.
    async fn switch_network(&self, network: NetworkId) -> Result<(), ClientError>;

    /// Sign and broadcast. Once this returns the transaction cannot be recalled.
    async fn send_transaction(&self, request: TransactionRequest) -> Result<TxHash, ClientError>;

    /// Block until the transaction is included.
    async fn wait_for_receipt(&self, tx_hash: &TxHash) -> Result<TransactionReceipt, ClientError>;
}
