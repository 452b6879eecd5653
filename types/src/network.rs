//! Target chain identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ClaimError;
use crate::hash::TxHash;

/// Which chain the claim ledger lives on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkId {
    /// Base mainnet.
    Base,
    /// Base Sepolia testnet.
    BaseSepolia,
    /// Local development chain.
    Local,
}

impl NetworkId {
    /// EIP-155 chain id.
    pub fn chain_id(&self) -> u64 {
        match self {
            Self::Base => 8453,
            Self::BaseSepolia => 84532,
            Self::Local => 31337,
        }
    }

    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        match chain_id {
            8453 => Some(Self::Base),
            84532 => Some(Self::BaseSepolia),
            31337 => Some(Self::Local),
            _ => None,
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Base => "Base",
            Self::BaseSepolia => "Base Sepolia",
            Self::Local => "Local",
        }
    }

    /// Config/CLI spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::BaseSepolia => "base-sepolia",
            Self::Local => "local",
        }
    }

    /// Default public JSON-RPC endpoint.
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Self::Base => "https://mainnet.base.org",
            Self::BaseSepolia => "https://sepolia.base.org",
            Self::Local => "http://127.0.0.1:8545",
        }
    }

    /// Block explorer base URL, if the network has one.
    pub fn explorer_url(&self) -> Option<&'static str> {
        match self {
            Self::Base => Some("https://basescan.org"),
            Self::BaseSepolia => Some("https://sepolia.basescan.org"),
            Self::Local => None,
        }
    }

    /// Explorer link for a transaction.
    pub fn explorer_tx_link(&self, tx: &TxHash) -> Option<String> {
        self.explorer_url().map(|base| format!("{base}/tx/{tx}"))
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (chain {})", self.name(), self.chain_id())
    }
}

impl FromStr for NetworkId {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "base" | "mainnet" => Ok(Self::Base),
            "base-sepolia" | "sepolia" => Ok(Self::BaseSepolia),
            "local" | "dev" => Ok(Self::Local),
            other => Err(ClaimError::InvalidInput(format!("unknown network: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_ids_roundtrip() {
        for net in [NetworkId::Base, NetworkId::BaseSepolia, NetworkId::Local] {
            assert_eq!(NetworkId::from_chain_id(net.chain_id()), Some(net));
            assert_eq!(net.as_str().parse::<NetworkId>().unwrap(), net);
        }
        assert_eq!(NetworkId::from_chain_id(1), None);
    }

    #[test]
    fn explorer_link() {
        let tx = TxHash::new([0xaa; 32]);
        let link = NetworkId::Base.explorer_tx_link(&tx).unwrap();
        assert_eq!(link, format!("https://basescan.org/tx/{tx}"));
        assert!(NetworkId::Local.explorer_tx_link(&tx).is_none());
    }
}
