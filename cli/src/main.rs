//! `agora`: plan deposit locks and unlocks from the command line.
//!
//! Read-only: lock and unlock print the settlement specification as JSON for
//! a signing wallet and never submit anything themselves.

mod config;

use std::path::PathBuf;

use agora_crypto::{is_hex_address, network_from_address};
use agora_locker::{Locker, ReceiptIdentity};
use agora_power::PowerConfig;
use agora_types::{AssetBundle, AssetId, NetworkId, OutRef, WalletAddress};
use agora_utils::{init_tracing, LogFormat};
use agora_wallet_core::{display_name, AssetCache, BlockfrostClient, BlockfrostWallet, CachingLedger};
use anyhow::{bail, Context};
use clap::Parser;
use serde_json::json;

use crate::config::AgoraConfig;

#[derive(Parser)]
#[command(name = "agora", about = "Deposit locking with receipt tokens")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, env = "AGORA_CONFIG")]
    config: Option<PathBuf>,

    /// Network: "mainnet", "preprod" or "preview".
    #[arg(long, env = "AGORA_NETWORK")]
    network: Option<NetworkId>,

    /// Power configuration as a JSON file, replacing the `[power]` section.
    #[arg(long, env = "AGORA_POWER_CONFIG")]
    power_config: Option<PathBuf>,

    /// Blockfrost project id.
    #[arg(long, env = "AGORA_BLOCKFROST_PROJECT_ID", hide_env_values = true)]
    blockfrost_project_id: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "AGORA_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "AGORA_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Evaluate the voting power of a deposit.
    Power {
        /// Deposit entries as `<unit>=<quantity>`; unit "lovelace" is the base currency.
        #[arg(long = "asset", required = true)]
        assets: Vec<String>,
    },
    /// Print the policy id, locker address and power token of the configuration.
    Policy,
    /// Print the receipt a lock consuming `out_ref` would mint.
    ReceiptId {
        /// `<tx hash>#<index>`
        out_ref: OutRef,
    },
    /// Plan a deposit lock from a wallet address.
    Lock {
        #[arg(long)]
        address: WalletAddress,
        #[arg(long = "asset", required = true)]
        assets: Vec<String>,
    },
    /// Plan the redemption of a receipt.
    Unlock {
        #[arg(long)]
        address: WalletAddress,
        /// Receipt unit: policy id hex followed by asset name hex.
        #[arg(long)]
        receipt: AssetId,
        /// Fail instead of warning when the receipt disagrees with its lock record.
        #[arg(long)]
        strict: bool,
    },
    /// List the receipts of this configuration held by an address.
    Receipts {
        #[arg(long)]
        address: WalletAddress,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AgoraConfig::from_toml_file(path)?,
        None => AgoraConfig::default(),
    };
    if let Some(network) = cli.network {
        config.network = network;
    }
    if let Some(project_id) = cli.blockfrost_project_id.clone() {
        config.blockfrost.project_id = project_id;
    }
    let log_format = match cli.log_format {
        Some(format) => format,
        None => config.log_format.parse()?,
    };
    init_tracing(log_format, cli.log_level.as_deref().unwrap_or(&config.log_level));

    if let Some(path) = &cli.config {
        tracing::info!(path = %path.display(), network = %config.network, "loaded config");
    }

    let power = match &cli.power_config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading power config {}", path.display()))?;
            PowerConfig::from_json(&json)?
        }
        None => config.power_config()?,
    };

    match cli.command {
        Command::Power { assets } => {
            let deposit = parse_assets(&assets)?;
            let value = power.evaluate(&deposit)?;
            print_json(&json!({
                "mode": power.mode.as_str(),
                "voting_power": value.to_string(),
            }))
        }
        Command::Policy => {
            let locker = build_locker(&config, power)?;
            let scripts = locker.scripts();
            print_json(&json!({
                "network": config.network,
                "policy_id": scripts.policy_id,
                "locker_address": scripts.locker_address,
                "power_token": scripts.power_token(),
            }))
        }
        Command::ReceiptId { out_ref } => {
            let locker = build_locker(&config, power)?;
            let identity = ReceiptIdentity::derive(&out_ref);
            print_json(&json!({
                "out_ref": out_ref.to_string(),
                "identity": identity.to_string(),
                "receipt": locker.scripts().receipt_asset(&identity),
            }))
        }
        Command::Lock { address, assets } => {
            let deposit = parse_assets(&assets)?;
            check_address(&address, config.network);
            let locker = build_locker(&config, power)?;
            let wallet = BlockfrostWallet::new(blockfrost(&config)?, address);
            let plan = locker.lock(&wallet, &deposit).await?;
            print_json(&json!({
                "receipt": plan.receipt,
                "voting_power": plan.voting_power().to_string(),
                "tx": plan.spec,
            }))
        }
        Command::Unlock {
            address,
            receipt,
            strict,
        } => {
            check_address(&address, config.network);
            let locker = build_locker(&config, power)?
                .with_strict_receipt_check(strict || config.unlock.strict_receipt_check);
            let client = blockfrost(&config)?;
            let wallet = BlockfrostWallet::new(client.clone(), address);
            let plan = locker.unlock(&wallet, &client, &receipt).await?;
            for warning in &plan.warnings {
                tracing::warn!(%warning, "unlock planned with warning");
            }
            print_json(&json!({
                "locked": plan.locked.to_string(),
                "voting_power": plan.record.voting_power.to_string(),
                "warnings": plan.warnings.iter().map(|w| w.to_string()).collect::<Vec<_>>(),
                "tx": plan.spec,
            }))
        }
        Command::Receipts { address } => {
            check_address(&address, config.network);
            let locker = build_locker(&config, power)?;
            let ledger = CachingLedger::new(
                blockfrost(&config)?,
                AssetCache::with_ttl(config.cache.ttl_secs),
            );
            let receipts = locker.redeemable_receipts(&ledger, &address).await?;
            let listed: Vec<_> = receipts
                .iter()
                .map(|unit| json!({ "unit": unit, "name": display_name(unit) }))
                .collect();
            print_json(&json!({ "address": address, "receipts": listed }))
        }
    }
}

fn build_locker(config: &AgoraConfig, power: PowerConfig) -> anyhow::Result<Locker> {
    let templates = config.script_templates()?;
    Ok(Locker::new(&templates, power, config.network).with_params(config.ledger_params()))
}

fn blockfrost(config: &AgoraConfig) -> anyhow::Result<BlockfrostClient> {
    let project_id = config.blockfrost.project_id.clone();
    let client = match &config.blockfrost.base_url {
        Some(url) => BlockfrostClient::new(url.clone(), project_id)?,
        None => BlockfrostClient::for_network(config.network, project_id)?,
    };
    Ok(client)
}

fn check_address(address: &WalletAddress, network: NetworkId) {
    if is_hex_address(address.as_str()) {
        tracing::warn!(%address, "hex address given; the provider expects bech32");
        return;
    }
    let detected = network_from_address(address.as_str());
    if detected.address_tag() != network.address_tag() {
        tracing::warn!(%address, %network, %detected, "address belongs to another network");
    }
}

/// Parse `<unit>=<quantity>` pairs into a bundle; repeated units add up.
fn parse_assets(raw: &[String]) -> anyhow::Result<AssetBundle> {
    let mut bundle = AssetBundle::new();
    for entry in raw {
        let Some((unit, quantity)) = entry.split_once('=') else {
            bail!("expected <unit>=<quantity>, got {entry:?}");
        };
        let unit: AssetId = unit.trim().parse()?;
        let quantity: u128 = quantity
            .trim()
            .parse()
            .with_context(|| format!("quantity of {unit}"))?;
        bundle.add(unit, quantity)?;
    }
    Ok(bundle)
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
