//! CLI configuration with TOML file support.

use std::path::Path;

use agora_locker::{PlutusVersion, ScriptTemplate, ScriptTemplates};
use agora_power::{PowerConfig, WireConfig};
use agora_types::{LedgerParams, NetworkId};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

/// Configuration for the `agora` command.
///
/// Loaded from a TOML file via [`AgoraConfig::from_toml_file`]; command-line
/// flags and `AGORA_*` environment variables override individual fields.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgoraConfig {
    #[serde(default)]
    pub network: NetworkId,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter, e.g. "info" or "debug,agora_locker=trace".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub blockfrost: BlockfrostSection,

    #[serde(default)]
    pub scripts: ScriptsSection,

    /// Inline power configuration; base-currency sum when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<WireConfig>,

    #[serde(default)]
    pub ledger: LedgerSection,

    #[serde(default)]
    pub unlock: UnlockSection,

    #[serde(default)]
    pub cache: CacheSection,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BlockfrostSection {
    #[serde(default)]
    pub project_id: String,
    /// Overrides the public endpoint of `network`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Compiled minter and locker templates, hex encoded.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ScriptsSection {
    #[serde(default)]
    pub version: PlutusVersion,
    #[serde(default)]
    pub minter: String,
    #[serde(default)]
    pub locker: String,
}

/// Ledger parameters in TOML-friendly widths.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSection {
    pub fee_buffer: u64,
    pub base_min_balance: u64,
    pub coins_per_byte: u64,
    pub policy_id_bytes: u64,
    pub asset_name_bytes: u64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UnlockSection {
    /// Reject a receipt that disagrees with its lock record.
    #[serde(default)]
    pub strict_receipt_check: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheSection {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ttl_secs() -> u64 {
    agora_wallet_core::DEFAULT_TTL_SECS
}

impl Default for AgoraConfig {
    fn default() -> Self {
        Self {
            network: NetworkId::default(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            blockfrost: BlockfrostSection::default(),
            scripts: ScriptsSection::default(),
            power: None,
            ledger: LedgerSection::default(),
            unlock: UnlockSection::default(),
            cache: CacheSection::default(),
        }
    }
}

impl Default for LedgerSection {
    fn default() -> Self {
        let params = LedgerParams::default();
        let narrow = |v: u128| u64::try_from(v).unwrap_or(u64::MAX);
        Self {
            fee_buffer: narrow(params.fee_buffer),
            base_min_balance: narrow(params.base_min_balance),
            coins_per_byte: narrow(params.coins_per_byte),
            policy_id_bytes: narrow(params.policy_id_bytes),
            asset_name_bytes: narrow(params.asset_name_bytes),
        }
    }
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

// ── Impl ───────────────────────────────────────────────────────────────

impl AgoraConfig {
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn power_config(&self) -> anyhow::Result<PowerConfig> {
        match &self.power {
            Some(wire) => Ok(PowerConfig::try_from(wire.clone())?),
            None => Ok(PowerConfig::base_sum()),
        }
    }

    pub fn script_templates(&self) -> anyhow::Result<ScriptTemplates> {
        if self.scripts.minter.trim().is_empty() || self.scripts.locker.trim().is_empty() {
            bail!("[scripts] minter and locker must both be set");
        }
        Ok(ScriptTemplates {
            minter: ScriptTemplate::from_hex(self.scripts.version, &self.scripts.minter)
                .context("[scripts] minter")?,
            locker: ScriptTemplate::from_hex(self.scripts.version, &self.scripts.locker)
                .context("[scripts] locker")?,
        })
    }

    pub fn ledger_params(&self) -> LedgerParams {
        LedgerParams {
            fee_buffer: self.ledger.fee_buffer.into(),
            base_min_balance: self.ledger.base_min_balance.into(),
            coins_per_byte: self.ledger.coins_per_byte.into(),
            policy_id_bytes: self.ledger.policy_id_bytes.into(),
            asset_name_bytes: self.ledger.asset_name_bytes.into(),
        }
    }
}
