//! `claimctl` configuration with TOML file support.
//!
//! The authority private key never lives here; it comes from an encrypted
//! keystore or the `CLAIM_AUTHORITY_KEY` environment variable.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use claim_types::{Address, NetworkId, TokenAmount};
use claim_utils::LogFormat;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimConfig {
    /// Which chain the ledger is deployed on.
    #[serde(default = "default_network")]
    pub network: NetworkId,

    /// JSON-RPC endpoint. Defaults to the network's public endpoint.
    #[serde(default)]
    pub rpc_url: Option<String>,

    /// Deployed claim ledger.
    #[serde(default)]
    pub contract_address: Option<Address>,

    /// Expected authority; a loaded key that does not match is refused.
    #[serde(default)]
    pub authority_address: Option<Address>,

    /// Authority keystore file.
    #[serde(default)]
    pub keystore: Option<PathBuf>,

    /// Payout per claim in raw token units.
    #[serde(default = "default_payout_unit")]
    pub payout_unit: u64,

    #[serde(default = "default_token_decimals")]
    pub token_decimals: u32,

    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_network() -> NetworkId {
    NetworkId::BaseSepolia
}

fn default_payout_unit() -> u64 {
    1_000_000
}

fn default_token_decimals() -> u32 {
    6
}

fn default_confirmation_timeout_secs() -> u64 {
    120
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ClaimConfig {
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn rpc_url(&self) -> String {
        self.rpc_url
            .clone()
            .unwrap_or_else(|| self.network.default_rpc_url().to_string())
    }

    pub fn contract(&self) -> anyhow::Result<Address> {
        self.contract_address
            .context("no contract address configured (set contract_address or --contract)")
    }

    pub fn payout_unit(&self) -> TokenAmount {
        TokenAmount::new(u128::from(self.payout_unit))
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }
}

impl Default for ClaimConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            rpc_url: None,
            contract_address: None,
            authority_address: None,
            keystore: None,
            payout_unit: default_payout_unit(),
            token_decimals: default_token_decimals(),
            confirmation_timeout_secs: default_confirmation_timeout_secs(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_defaults() {
        let config = ClaimConfig::from_toml_str("").unwrap();
        assert_eq!(config, ClaimConfig::default());
        assert_eq!(config.network, NetworkId::BaseSepolia);
        assert_eq!(config.payout_unit(), TokenAmount::from_tokens(1));
        assert_eq!(config.confirmation_timeout(), Duration::from_secs(120));
        assert_eq!(config.rpc_url(), NetworkId::BaseSepolia.default_rpc_url());
        assert!(config.contract().is_err());
    }

    #[test]
    fn partial_toml_overrides() {
        let config = ClaimConfig::from_toml_str(
            r#"
                network = "base"
                contract_address = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"
                log_format = "json"
                payout_unit = 2000000
            "#,
        )
        .unwrap();
        assert_eq!(config.network, NetworkId::Base);
        assert_eq!(
            config.contract().unwrap().to_string(),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.payout_unit(), TokenAmount::from_tokens(2));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn round_trips_through_file() {
        let mut config = ClaimConfig::default();
        config.rpc_url = Some("http://127.0.0.1:8545".into());
        config.network = NetworkId::Local;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("claimctl.toml");
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        let loaded = ClaimConfig::from_toml_file(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.rpc_url(), "http://127.0.0.1:8545");
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(ClaimConfig::from_toml_file(Path::new("/nonexistent/claimctl.toml")).is_err());
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(ClaimConfig::from_toml_str("network = \"moon\"").is_err());
        assert!(ClaimConfig::from_toml_str("contract_address = \"0x1234\"").is_err());
    }
}
