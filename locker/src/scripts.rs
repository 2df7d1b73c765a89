//! Locker scripts and the identities they fix.
//!
//! Both the minting policy and the locking validator are templates
//! parameterised by the power configuration. Applying a configuration to a
//! template and hashing the result yields the policy id and validator hash,
//! so the same configuration always lands on the same policy and address.

use agora_crypto::{blake2b_224_multi, encode_script_address};
use agora_plutus::{PlutusData, ToPlutusData};
use agora_power::PowerConfig;
use agora_types::{AssetId, AssetName, NetworkId, PolicyId, WalletAddress};
use serde::{Deserialize, Serialize};

use crate::error::LockerError;
use crate::receipt::ReceiptIdentity;

/// Asset name of the fungible power token.
pub const POWER_TOKEN_NAME: &[u8] = b"voting_power";

/// Script language version; its tag prefixes the bytes a script hash covers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlutusVersion {
    V1,
    #[default]
    V2,
    V3,
}

impl PlutusVersion {
    pub fn tag(&self) -> u8 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
            Self::V3 => 3,
        }
    }
}

/// Compiled script code awaiting its parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptTemplate {
    #[serde(default)]
    pub version: PlutusVersion,
    #[serde(with = "hex_bytes")]
    pub code: Vec<u8>,
}

impl ScriptTemplate {
    pub fn new(version: PlutusVersion, code: Vec<u8>) -> Self {
        Self { version, code }
    }

    pub fn from_hex(version: PlutusVersion, code: &str) -> Result<Self, LockerError> {
        let code = hex::decode(code.trim())
            .map_err(|e| LockerError::InvalidConfiguration(format!("script code: {e}")))?;
        if code.is_empty() {
            return Err(LockerError::InvalidConfiguration("script code is empty".into()));
        }
        Ok(Self::new(version, code))
    }

    pub fn apply(&self, parameter: PlutusData) -> ParameterizedScript {
        ParameterizedScript {
            version: self.version,
            code: self.code.clone(),
            parameter,
        }
    }
}

/// A template with its parameter applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterizedScript {
    pub version: PlutusVersion,
    #[serde(with = "hex_bytes")]
    pub code: Vec<u8>,
    pub parameter: PlutusData,
}

impl ParameterizedScript {
    /// `blake2b-224(tag ‖ code ‖ cbor(parameter))`
    pub fn hash(&self) -> [u8; 28] {
        let parameter = self.parameter.to_cbor();
        blake2b_224_multi(&[&[self.version.tag()], &self.code, &parameter])
    }
}

/// Minting policy and locking validator templates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptTemplates {
    pub minter: ScriptTemplate,
    pub locker: ScriptTemplate,
}

/// Everything one power configuration fixes on chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockerScripts {
    pub config: PowerConfig,
    pub minter: ParameterizedScript,
    pub locker: ParameterizedScript,
    pub policy_id: PolicyId,
    pub locker_address: WalletAddress,
}

impl LockerScripts {
    pub fn derive(templates: &ScriptTemplates, config: PowerConfig, network: NetworkId) -> Self {
        let parameter = config.to_plutus_data();
        let minter = templates.minter.apply(parameter.clone());
        let locker = templates.locker.apply(parameter);
        let policy_id = PolicyId::new(minter.hash());
        let locker_address = encode_script_address(network, &locker.hash());
        tracing::debug!(
            %policy_id,
            locker_address = %locker_address,
            mode = %config.mode,
            entries = config.weights.len(),
            "derived locker scripts"
        );
        Self {
            config,
            minter,
            locker,
            policy_id,
            locker_address,
        }
    }

    /// The fungible power token under this policy.
    pub fn power_token(&self) -> AssetId {
        AssetId::native(self.policy_id, power_token_name())
    }

    /// The receipt token named by `identity` under this policy.
    pub fn receipt_asset(&self, identity: &ReceiptIdentity) -> AssetId {
        AssetId::native(self.policy_id, identity.asset_name())
    }
}

pub(crate) fn power_token_name() -> AssetName {
    AssetName::new(POWER_TOKEN_NAME).unwrap_or_default()
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        hex::decode(s.trim()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_power::{AggregationMode, AssetSelector, WeightConfig, WeightEntry};

    fn templates() -> ScriptTemplates {
        ScriptTemplates {
            minter: ScriptTemplate::new(PlutusVersion::V2, vec![0x01, 0x02, 0x03]),
            locker: ScriptTemplate::new(PlutusVersion::V2, vec![0x04, 0x05, 0x06]),
        }
    }

    #[test]
    fn power_token_name_is_hex_voting_power() {
        assert_eq!(
            power_token_name().to_string(),
            "766f74696e675f706f776572"
        );
    }

    #[test]
    fn same_config_same_policy() {
        let a = LockerScripts::derive(&templates(), PowerConfig::base_sum(), NetworkId::Preprod);
        let b = LockerScripts::derive(&templates(), PowerConfig::base_sum(), NetworkId::Preprod);
        assert_eq!(a.policy_id, b.policy_id);
        assert_eq!(a.locker_address, b.locker_address);
    }

    #[test]
    fn different_config_different_policy() {
        let other = PowerConfig::new(
            AggregationMode::Sum,
            WeightConfig::new(vec![WeightEntry::new(2, AssetSelector::base())]).unwrap(),
        );
        let a = LockerScripts::derive(&templates(), PowerConfig::base_sum(), NetworkId::Preprod);
        let b = LockerScripts::derive(&templates(), other, NetworkId::Preprod);
        assert_ne!(a.policy_id, b.policy_id);
        assert_ne!(a.locker_address, b.locker_address);
    }

    #[test]
    fn version_tag_changes_hash() {
        let param = PowerConfig::base_sum().to_plutus_data();
        let v2 = ScriptTemplate::new(PlutusVersion::V2, vec![1]).apply(param.clone());
        let v3 = ScriptTemplate::new(PlutusVersion::V3, vec![1]).apply(param);
        assert_ne!(v2.hash(), v3.hash());
    }

    #[test]
    fn locker_address_matches_network() {
        let main = LockerScripts::derive(&templates(), PowerConfig::base_sum(), NetworkId::Mainnet);
        let test = LockerScripts::derive(&templates(), PowerConfig::base_sum(), NetworkId::Preview);
        assert!(main.locker_address.as_str().starts_with("addr1w"));
        assert!(test.locker_address.as_str().starts_with("addr_test1w"));
        // The network only changes the address, never the policy.
        assert_eq!(main.policy_id, test.policy_id);
    }

    #[test]
    fn template_hex_parsing() {
        assert!(ScriptTemplate::from_hex(PlutusVersion::V2, "4e4d").is_ok());
        assert!(ScriptTemplate::from_hex(PlutusVersion::V2, "").is_err());
        assert!(ScriptTemplate::from_hex(PlutusVersion::V2, "zz").is_err());
    }
}
