//! claimctl: booth-staff and operator tooling for the claim protocol.

mod config;

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use claim_client::{prepare_claim, ClientConfig, RpcLedgerReader};
use claim_crypto::{generate_keypair, hash_email, keypair_from_private, parse_private_key};
use claim_issuer::{
    decrypt_keystore, encrypt_keystore, generate_nonce, issue, load_keystore, save_keystore,
    verify_authorization,
};
use claim_ledger::LedgerReader;
use claim_types::{Address, ClaimCode, KeyPair, NetworkId, Nonce};
use claim_utils::{init_logging, LogFormat};
use tracing::{info, warn};

use crate::config::ClaimConfig;

#[derive(Parser)]
#[command(name = "claimctl", about = "Issue, inspect and submit one-time reward claim codes")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base; flags
    /// and env vars override them.
    #[arg(long, env = "CLAIM_CONFIG")]
    config: Option<PathBuf>,

    /// Network: "base", "base-sepolia" or "local".
    #[arg(long, env = "CLAIM_NETWORK")]
    network: Option<NetworkId>,

    /// JSON-RPC endpoint override.
    #[arg(long, env = "CLAIM_RPC_URL")]
    rpc_url: Option<String>,

    /// Claim ledger contract address.
    #[arg(long, env = "CLAIM_CONTRACT")]
    contract: Option<Address>,

    /// Authority keystore file.
    #[arg(long, env = "CLAIM_KEYSTORE")]
    keystore: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "CLAIM_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "CLAIM_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Create a new authority key and store it encrypted.
    Keygen {
        /// Where to write the keystore.
        #[arg(long)]
        out: PathBuf,
        #[arg(long, env = "CLAIM_KEYSTORE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Print the authority address.
    Address {
        #[command(flatten)]
        key: KeyArgs,
    },
    /// Print the identity token for an email.
    HashEmail { email: String },
    /// Sign a claim code for a winner.
    Issue {
        #[arg(long)]
        email: String,
        #[arg(long)]
        recipient: Address,
        /// Use this nonce instead of drawing one.
        #[arg(long)]
        nonce: Option<Nonce>,
        /// Emit the `v1:`-prefixed form.
        #[arg(long)]
        versioned: bool,
        /// Skip the ledger checks (no contract configured or offline booth).
        #[arg(long)]
        offline: bool,
        #[command(flatten)]
        key: KeyArgs,
    },
    /// Check a claim code against an email, recipient and authority.
    Verify {
        #[arg(long)]
        email: String,
        #[arg(long)]
        recipient: Address,
        #[arg(long)]
        code: String,
        /// Expected authority. Defaults to `authority_address` from the config.
        #[arg(long)]
        authority: Option<Address>,
    },
    /// Split a claim code into signature and nonce.
    ParseCode { code: String },
    /// Build `claimReward` call data for an external wallet.
    Prepare {
        #[arg(long)]
        email: String,
        #[arg(long)]
        recipient: Address,
        #[arg(long)]
        code: String,
    },
    /// Print the effective configuration as TOML.
    ShowConfig,
    /// Show the ledger's pool and, optionally, one email's or nonce's state.
    Status {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        nonce: Option<Nonce>,
    },
}

#[derive(clap::Args)]
struct KeyArgs {
    /// Raw authority key (development only).
    #[arg(long = "authority-key", env = "CLAIM_AUTHORITY_KEY", hide_env_values = true)]
    authority_key: Option<String>,
    #[arg(long = "keystore-password", env = "CLAIM_KEYSTORE_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = merge_config(&cli)?;
    init_logging(config.log_format, &config.log_level);

    match cli.command {
        Command::Keygen { out, password } => {
            let keys = generate_keypair();
            let keystore = encrypt_keystore(&keys.private, &password)?;
            save_keystore(&keystore, &out)?;
            info!(address = %keys.address, path = %out.display(), "authority key created");
            println!("{}", keys.address);
        }
        Command::Address { key } => {
            println!("{}", authority_address(&config, &key)?);
        }
        Command::HashEmail { email } => {
            println!("{}", hash_email(&email)?);
        }
        Command::Issue {
            email,
            recipient,
            nonce,
            versioned,
            offline,
            key,
        } => {
            let authority = load_authority(&config, &key)?;
            let nonce = nonce.unwrap_or_else(|| generate_nonce(&mut rand::thread_rng()));
            if offline {
                warn!("ledger checks skipped");
            } else {
                check_issuable(&config, &email, &nonce).await?;
            }

            let authorization = issue(&email, &recipient, nonce, &authority.private)?;
            let code = authorization.claim_code();
            info!(identity = %authorization.identity, nonce = %nonce, "claim code issued");
            println!("identity:  {}", authorization.identity);
            println!("recipient: {}", authorization.recipient);
            println!("nonce:     {}", authorization.nonce);
            println!(
                "code:      {}",
                if versioned { code.format_versioned() } else { code.format() }
            );
        }
        Command::Verify {
            email,
            recipient,
            code,
            authority,
        } => {
            let authority = authority
                .or(config.authority_address)
                .context("no authority given (use --authority or set authority_address)")?;
            let code = ClaimCode::parse(&code)?;
            if !verify_authorization(&email, &recipient, &code, &authority) {
                bail!("code was not signed by {authority} for this email and recipient");
            }
            println!("valid");
        }
        Command::ShowConfig => {
            print!("{}", config.to_toml_string()?);
        }
        Command::ParseCode { code } => {
            let code = ClaimCode::parse(&code)?;
            println!("signature: {}", code.signature);
            println!("nonce:     {}", code.nonce);
        }
        Command::Prepare {
            email,
            recipient,
            code,
        } => {
            let client_config = ClientConfig {
                network: config.network,
                contract: config.contract()?,
                confirmation_timeout: config.confirmation_timeout(),
            };
            let reader = RpcLedgerReader::new(config.rpc_url(), client_config.contract)?;
            let prepared = prepare_claim(&client_config, &reader, &email, &recipient, &code).await?;
            let request = serde_json::json!({
                "chainId": prepared.network.chain_id(),
                "from": prepared.recipient.to_string(),
                "to": prepared.contract.to_string(),
                "data": prepared.call_data_hex(),
            });
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
        Command::Status { email, nonce } => {
            let reader = RpcLedgerReader::new(config.rpc_url(), config.contract()?)?;
            let chain_id = reader.chain_id().await?;
            if chain_id != config.network.chain_id() {
                warn!(
                    expected = config.network.chain_id(),
                    actual = chain_id,
                    "endpoint is on another chain"
                );
            }
            let pool = reader.get_balance().await?;
            let unit = config.payout_unit();
            println!("network:   {} via {}", config.network, reader.rpc_url());
            println!("contract:  {}", reader.contract());
            println!("pool:      {} USDC", pool.format_units(config.token_decimals));
            println!(
                "claims:    {} remaining at {} each",
                pool.raw() / unit.raw().max(1),
                unit.format_units(config.token_decimals)
            );
            if let Some(email) = email {
                let claimed = reader.has_email_claimed(&hash_email(&email)?).await?;
                println!("claimed:   {claimed}");
            }
            if let Some(nonce) = nonce {
                let used = reader.is_nonce_used(&nonce).await?;
                println!("nonce {nonce}: {}", if used { "used" } else { "unused" });
            }
        }
    }
    Ok(())
}

/// File config with flag and env overrides applied.
fn merge_config(cli: &Cli) -> anyhow::Result<ClaimConfig> {
    let mut config = match &cli.config {
        Some(path) => ClaimConfig::from_toml_file(path)?,
        None => ClaimConfig::default(),
    };
    if let Some(network) = cli.network {
        config.network = network;
    }
    if let Some(url) = &cli.rpc_url {
        config.rpc_url = Some(url.clone());
    }
    if let Some(contract) = cli.contract {
        config.contract_address = Some(contract);
    }
    if let Some(path) = &cli.keystore {
        config.keystore = Some(path.clone());
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    Ok(config)
}

fn load_authority(config: &ClaimConfig, key: &KeyArgs) -> anyhow::Result<KeyPair> {
    let keys = if let Some(raw) = &key.authority_key {
        warn!("using authority key from the environment");
        keypair_from_private(parse_private_key(raw)?)?
    } else {
        let path = config
            .keystore
            .as_ref()
            .context("no authority key: set CLAIM_AUTHORITY_KEY or configure a keystore")?;
        let password = key
            .password
            .as_deref()
            .context("keystore password missing (CLAIM_KEYSTORE_PASSWORD)")?;
        decrypt_keystore(&load_keystore(path)?, password)
            .with_context(|| format!("unlocking {}", path.display()))?
    };

    if let Some(expected) = config.authority_address {
        if keys.address != expected {
            bail!("loaded key controls {} but the ledger authority is {expected}", keys.address);
        }
    }
    Ok(keys)
}

/// The address is readable from the keystore without unlocking it.
fn authority_address(config: &ClaimConfig, key: &KeyArgs) -> anyhow::Result<Address> {
    if key.authority_key.is_none() {
        if let Some(path) = &config.keystore {
            return Ok(load_keystore(path)?.address);
        }
    }
    Ok(load_authority(config, key)?.address)
}

/// Refuse to sign for an email the ledger has already paid or a nonce it has seen.
async fn check_issuable(config: &ClaimConfig, email: &str, nonce: &Nonce) -> anyhow::Result<()> {
    let reader = RpcLedgerReader::new(config.rpc_url(), config.contract()?)?;
    if reader
        .has_email_claimed(&hash_email(email)?)
        .await
        .context("checking whether the email has claimed")?
    {
        bail!("this email has already claimed its reward");
    }
    if reader
        .is_nonce_used(nonce)
        .await
        .context("checking the nonce")?
    {
        bail!("nonce {nonce} has already been used, draw another");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("claimctl.toml");
        std::fs::write(&path, "network = \"base\"\nlog_level = \"debug\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "claimctl",
            "--config",
            path.to_str().unwrap(),
            "--network",
            "local",
            "parse-code",
            "0xab:1",
        ])
        .unwrap();
        let config = merge_config(&cli).unwrap();
        assert_eq!(config.network, NetworkId::Local);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn raw_key_loads_and_is_checked() {
        let key = KeyArgs {
            authority_key: Some(format!("{:064x}", 1)),
            password: None,
        };
        let mut config = ClaimConfig::default();
        let keys = load_authority(&config, &key).unwrap();
        assert_eq!(keys.address.to_string(), "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf");

        config.authority_address = Some(Address::new([1; 20]));
        assert!(load_authority(&config, &key).is_err());
    }

    #[test]
    fn keystore_address_needs_no_password() {
        let keys = generate_keypair();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("authority.json");
        save_keystore(&encrypt_keystore(&keys.private, "pw").unwrap(), &path).unwrap();

        let config = ClaimConfig {
            keystore: Some(path),
            ..ClaimConfig::default()
        };
        let key = KeyArgs {
            authority_key: None,
            password: None,
        };
        assert_eq!(authority_address(&config, &key).unwrap(), keys.address);
        assert!(load_authority(&config, &key).is_err());
    }
}
