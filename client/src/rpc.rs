//! JSON-RPC view of a deployed claim ledger.

use std::time::Duration;

use async_trait::async_trait;
use claim_ledger::abi::{decode_amount, decode_bool};
use claim_ledger::{LedgerCall, LedgerError, LedgerReader};
use claim_types::{Address, IdentityToken, Nonce, TokenAmount};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::ClientError;

/// Reads ledger state with `eth_call` against an Ethereum JSON-RPC endpoint.
#[derive(Clone)]
pub struct RpcLedgerReader {
    http: reqwest::Client,
    rpc_url: String,
    contract: Address,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

impl RpcLedgerReader {
    pub fn new(rpc_url: impl Into<String>, contract: Address) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ClientError::Rpc(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            rpc_url: rpc_url.into(),
            contract,
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    /// Chain id reported by the endpoint.
    pub async fn chain_id(&self) -> Result<u64, LedgerError> {
        let hex_id = self.request("eth_chainId", json!([])).await?;
        let digits = hex_id.trim_start_matches("0x");
        u64::from_str_radix(digits, 16)
            .map_err(|e| LedgerError::Unavailable(format!("invalid chain id {hex_id}: {e}")))
    }

    async fn call(&self, call: LedgerCall) -> Result<Vec<u8>, LedgerError> {
        let params = json!([
            {
                "to": self.contract.to_string(),
                "data": format!("0x{}", hex::encode(call.encode())),
            },
            "latest"
        ]);
        let result = self.request("eth_call", params).await?;
        decode_hex_result(&result)
    }

    async fn request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<String, LedgerError> {
        debug!(method, url = %self.rpc_url, "rpc request");
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerError::Unavailable(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(LedgerError::Unavailable(format!(
                "node returned HTTP {}",
                response.status()
            )));
        }

        let parsed: RpcResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::Unavailable(format!("invalid JSON response: {e}")))?;
        into_result(parsed)
    }
}

fn into_result(response: RpcResponse) -> Result<String, LedgerError> {
    if let Some(err) = response.error {
        return Err(error_from_rpc(err.code, &err.message));
    }
    response
        .result
        .ok_or_else(|| LedgerError::Unavailable("response has neither result nor error".into()))
}

/// Reverts come back as `execution reverted: <reason>`; anything else means
/// the node could not answer.
fn error_from_rpc(code: i64, message: &str) -> LedgerError {
    match message.strip_prefix("execution reverted") {
        Some(rest) => LedgerError::from_revert_reason(rest.trim_start_matches(':').trim()),
        None => LedgerError::Unavailable(format!("node error {code}: {message}")),
    }
}

fn decode_hex_result(result: &str) -> Result<Vec<u8>, LedgerError> {
    let digits = result.strip_prefix("0x").unwrap_or(result);
    hex::decode(digits).map_err(|e| LedgerError::Unavailable(format!("invalid hex result: {e}")))
}

#[async_trait]
impl LedgerReader for RpcLedgerReader {
    async fn has_email_claimed(&self, identity: &IdentityToken) -> Result<bool, LedgerError> {
        decode_bool(&self.call(LedgerCall::HasEmailClaimed(*identity)).await?)
    }

    async fn is_nonce_used(&self, nonce: &Nonce) -> Result<bool, LedgerError> {
        decode_bool(&self.call(LedgerCall::IsNonceUsed(*nonce)).await?)
    }

    async fn get_balance(&self) -> Result<TokenAmount, LedgerError> {
        decode_amount(&self.call(LedgerCall::GetBalance).await?)
    }
}
