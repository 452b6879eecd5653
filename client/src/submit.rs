//! Claim preparation and submission.

use std::time::Duration;

use claim_crypto::hash_email;
use claim_ledger::{LedgerCall, LedgerError, LedgerReader};
use claim_types::{Address, ClaimCode, ClaimError, IdentityToken, NetworkId, TxHash};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ClientError;
use crate::wallet::{TransactionRequest, TxStatus, WalletProvider};

pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub network: NetworkId,
    /// Address of the deployed claim ledger.
    pub contract: Address,
    pub confirmation_timeout: Duration,
}

impl ClientConfig {
    pub fn new(network: NetworkId, contract: Address) -> Self {
        Self {
            network,
            contract,
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
        }
    }
}

/// Everything needed to send the claim, from any wallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedClaim {
    pub identity: IdentityToken,
    pub recipient: Address,
    pub code: ClaimCode,
    pub contract: Address,
    pub network: NetworkId,
    pub call_data: Vec<u8>,
}

impl PreparedClaim {
    pub fn call_data_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.call_data))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimOutcome {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub identity: IdentityToken,
    pub recipient: Address,
    pub explorer_link: Option<String>,
}

/// Parse a claim code and build the `claimReward` call for `recipient`.
///
/// A pre-check that cannot reach the ledger is skipped; one that gets an
/// answer and finds the claim already spent fails fast.
pub async fn prepare_claim<L: LedgerReader + ?Sized>(
    config: &ClientConfig,
    reader: &L,
    email: &str,
    recipient: &Address,
    code: &str,
) -> Result<PreparedClaim, ClientError> {
    let code = ClaimCode::parse(code)?;
    if recipient.is_zero() {
        return Err(ClaimError::InvalidInput("recipient is the zero address".into()).into());
    }
    let identity = hash_email(email)?;

    match reader.has_email_claimed(&identity).await {
        Ok(true) => return Err(LedgerError::AlreadyClaimed.into()),
        Ok(false) => {}
        Err(err) => warn!(identity = %identity, error = %err, "claimed pre-check skipped"),
    }
    match reader.is_nonce_used(&code.nonce).await {
        Ok(true) => return Err(LedgerError::NonceReused.into()),
        Ok(false) => {}
        Err(err) => warn!(nonce = %code.nonce, error = %err, "nonce pre-check skipped"),
    }

    let call_data = LedgerCall::ClaimReward {
        identity,
        recipient: *recipient,
        nonce: code.nonce,
        signature: code.signature,
    }
    .encode();

    Ok(PreparedClaim {
        identity,
        recipient: *recipient,
        code,
        contract: config.contract,
        network: config.network,
        call_data,
    })
}

pub struct ClaimClient<W, L> {
    config: ClientConfig,
    wallet: W,
    reader: L,
}

impl<W, L> ClaimClient<W, L>
where
    W: WalletProvider,
    L: LedgerReader,
{
    pub fn new(config: ClientConfig, wallet: W, reader: L) -> Self {
        Self {
            config,
            wallet,
            reader,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Parse and pre-check a claim without touching the wallet.
    pub async fn prepare(
        &self,
        email: &str,
        recipient: &Address,
        code: &str,
    ) -> Result<PreparedClaim, ClientError> {
        prepare_claim(&self.config, &self.reader, email, recipient, code).await
    }

    /// Make sure the wallet is on the configured network, asking it to switch
    /// if needed.
    pub async fn ensure_network(&self) -> Result<(), ClientError> {
        let expected = self.config.network;
        let current = self.wallet.chain_id().await?;
        if current == expected.chain_id() {
            return Ok(());
        }

        info!(from = current, to = expected.chain_id(), "requesting network switch");
        if let Err(err) = self.wallet.switch_network(expected).await {
            warn!(error = %err, "network switch refused");
            return Err(ClientError::WrongNetwork {
                expected,
                actual: current,
            });
        }
        let actual = self.wallet.chain_id().await?;
        if actual != expected.chain_id() {
            return Err(ClientError::WrongNetwork { expected, actual });
        }
        Ok(())
    }

    /// Claim the reward through the connected wallet.
    pub async fn submit(
        &self,
        email: &str,
        recipient: &Address,
        code: &str,
    ) -> Result<ClaimOutcome, ClientError> {
        let wallet = self
            .wallet
            .connected_address()
            .await
            .ok_or(ClientError::WalletNotConnected)?;
        self.ensure_network().await?;
        if wallet != *recipient {
            return Err(ClientError::AddressMismatch {
                wallet,
                recipient: *recipient,
            });
        }

        let prepared = self.prepare(email, recipient, code).await?;
        let tx_hash = self
            .wallet
            .send_transaction(TransactionRequest {
                from: wallet,
                to: prepared.contract,
                data: prepared.call_data,
                chain_id: self.config.network.chain_id(),
            })
            .await?;
        info!(tx = %tx_hash, identity = %prepared.identity, "claim broadcast");

        let receipt = match tokio::time::timeout(
            self.config.confirmation_timeout,
            self.wallet.wait_for_receipt(&tx_hash),
        )
        .await
        {
            Ok(receipt) => receipt?,
            Err(_) => {
                warn!(tx = %tx_hash, "claim not confirmed before timeout");
                return Err(ClientError::Unconfirmed { tx_hash });
            }
        };

        match receipt.status {
            TxStatus::Success => {
                info!(tx = %tx_hash, block = receipt.block_number, "claim confirmed");
                Ok(ClaimOutcome {
                    tx_hash,
                    block_number: receipt.block_number,
                    identity: prepared.identity,
                    recipient: *recipient,
                    explorer_link: self.config.network.explorer_tx_link(&tx_hash),
                })
            }
            TxStatus::Reverted { reason } => {
                let err = LedgerError::from_revert_reason(&reason);
                warn!(tx = %tx_hash, error = %err, "claim reverted");
                Err(err.into())
            }
        }
    }
}
