//! Nullable wallet: records transactions and routes them to an in-process ledger.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use claim_client::{ClientError, TransactionReceipt, TransactionRequest, TxStatus, WalletProvider};
use claim_crypto::keccak256_multi;
use claim_ledger::ClaimLedger;
use claim_types::{Address, NetworkId, TxHash};

#[derive(Default)]
struct WalletState {
    account: Option<Address>,
    chain_id: u64,
    allow_switch: bool,
    sent: Vec<TransactionRequest>,
    receipts: HashMap<TxHash, TransactionReceipt>,
    switch_requests: Vec<NetworkId>,
}

/// A test wallet.
///
/// With a backing ledger, each transaction is executed immediately and its
/// receipt is ready; a reverted call carries the ledger's revert reason.
/// Without one, transactions are recorded but never confirm.
pub struct NullWallet {
    state: Mutex<WalletState>,
    ledger: Option<Arc<ClaimLedger>>,
}

impl NullWallet {
    /// A wallet connected as `account` on `network`, executing against `ledger`.
    pub fn connected(account: Address, network: NetworkId, ledger: Arc<ClaimLedger>) -> Self {
        Self {
            state: Mutex::new(WalletState {
                account: Some(account),
                chain_id: network.chain_id(),
                allow_switch: true,
                ..WalletState::default()
            }),
            ledger: Some(ledger),
        }
    }

    /// No account connected.
    pub fn disconnected() -> Self {
        Self {
            state: Mutex::new(WalletState::default()),
            ledger: None,
        }
    }

    /// Connected, but transactions never get a receipt.
    pub fn never_confirms(account: Address, network: NetworkId) -> Self {
        Self {
            state: Mutex::new(WalletState {
                account: Some(account),
                chain_id: network.chain_id(),
                allow_switch: true,
                ..WalletState::default()
            }),
            ledger: None,
        }
    }

    /// Put the wallet on another chain.
    pub fn with_chain(self, chain_id: u64) -> Self {
        self.lock().chain_id = chain_id;
        self
    }

    /// Make the wallet refuse network switch requests.
    pub fn refusing_switch(self) -> Self {
        self.lock().allow_switch = false;
        self
    }

    /// All transactions broadcast so far (for assertions).
    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.lock().sent.clone()
    }

    pub fn switch_requests(&self) -> Vec<NetworkId> {
        self.lock().switch_requests.clone()
    }

    fn lock(&self) -> MutexGuard<'_, WalletState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl WalletProvider for NullWallet {
    async fn connected_address(&self) -> Option<Address> {
        self.lock().account
    }

    async fn chain_id(&self) -> Result<u64, ClientError> {
        Ok(self.lock().chain_id)
    }

    async fn switch_network(&self, network: NetworkId) -> Result<(), ClientError> {
        let mut state = self.lock();
        state.switch_requests.push(network);
        if !state.allow_switch {
            return Err(ClientError::Wallet("user rejected the network switch".into()));
        }
        state.chain_id = network.chain_id();
        Ok(())
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<TxHash, ClientError> {
        let mut state = self.lock();
        let index = state.sent.len() as u64;
        let tx_hash = TxHash::new(keccak256_multi(&[
            request.from.as_bytes(),
            &request.data,
            &index.to_be_bytes(),
        ]));

        if let Some(ledger) = &self.ledger {
            let status = match ledger.execute(&request.from, &request.data) {
                Ok(_) => TxStatus::Success,
                Err(err) => TxStatus::Reverted {
                    reason: err.revert_reason(),
                },
            };
            state.receipts.insert(
                tx_hash,
                TransactionReceipt {
                    tx_hash,
                    block_number: index + 1,
                    status,
                },
            );
        }
        state.sent.push(request);
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: &TxHash) -> Result<TransactionReceipt, ClientError> {
        let receipt = self.lock().receipts.get(tx_hash).cloned();
        match receipt {
            Some(receipt) => Ok(receipt),
            None => std::future::pending().await,
        }
    }
}
