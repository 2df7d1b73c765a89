//! Settlement specifications: what a transaction must contain, before any
//! wallet balances, signs or submits it.

use agora_plutus::PlutusData;
use agora_types::{AssetBundle, AssetId, OutRef, WalletAddress};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::scripts::ParameterizedScript;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TxInput {
    /// A wallet output, spent with the wallet's key.
    Wallet { out_ref: OutRef },
    /// A script output, spent with a redeemer.
    Script { out_ref: OutRef, redeemer: PlutusData },
}

impl TxInput {
    pub fn out_ref(&self) -> &OutRef {
        match self {
            Self::Wallet { out_ref } | Self::Script { out_ref, .. } => out_ref,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub address: WalletAddress,
    pub assets: AssetBundle,
    /// Inline datum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datum: Option<PlutusData>,
}

/// Signed mint quantities under one policy: positive mints, negative burns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mint {
    #[serde(with = "signed_quantities")]
    pub assets: BTreeMap<AssetId, i128>,
    pub redeemer: PlutusData,
}

impl Mint {
    pub fn quantity(&self, asset: &AssetId) -> i128 {
        self.assets.get(asset).copied().unwrap_or(0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptRole {
    MintingPolicy,
    SpendingValidator,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedScript {
    pub role: ScriptRole,
    /// Hex script hash: the policy id or validator hash.
    pub hash: String,
    pub script: ParameterizedScript,
}

impl AttachedScript {
    pub fn new(role: ScriptRole, script: &ParameterizedScript) -> Self {
        Self {
            role,
            hash: hex::encode(script.hash()),
            script: script.clone(),
        }
    }
}

/// How the wallet may complete the transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Balancing {
    /// Inputs are final; only fees and change are added.
    FixedInputs,
    /// The wallet adds inputs of its own covering at least `must_cover`.
    WalletSelects { must_cover: AssetBundle },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxSpec {
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mint: Option<Mint>,
    pub scripts: Vec<AttachedScript>,
    pub change_address: WalletAddress,
    pub balancing: Balancing,
}

impl TxSpec {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn input_refs(&self) -> Vec<OutRef> {
        self.inputs.iter().map(|i| *i.out_ref()).collect()
    }

    pub fn script(&self, role: ScriptRole) -> Option<&AttachedScript> {
        self.scripts.iter().find(|s| s.role == role)
    }
}

mod signed_quantities {
    use agora_types::AssetId;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(map: &BTreeMap<AssetId, i128>, s: S) -> Result<S::Ok, S::Error> {
        s.collect_map(map.iter().map(|(asset, q)| (asset.to_string(), q.to_string())))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<AssetId, i128>, D::Error> {
        BTreeMap::<String, String>::deserialize(d)?
            .into_iter()
            .map(|(unit, q)| {
                let asset: AssetId = unit.parse().map_err(serde::de::Error::custom)?;
                let q: i128 = q.parse().map_err(serde::de::Error::custom)?;
                Ok((asset, q))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_types::TxHash;

    fn sample() -> TxSpec {
        let receipt: AssetId = format!("{}{}", "11".repeat(28), "22".repeat(32))
            .parse()
            .unwrap();
        TxSpec {
            inputs: vec![TxInput::Script {
                out_ref: OutRef::new(TxHash::new([3; 32]), 1),
                redeemer: PlutusData::unit(0),
            }],
            outputs: vec![TxOutput {
                address: WalletAddress::new("addr_test1wlocker").unwrap(),
                assets: AssetBundle::base(2_000_000),
                datum: Some(PlutusData::int(1)),
            }],
            mint: Some(Mint {
                assets: [(receipt, -2)].into_iter().collect(),
                redeemer: PlutusData::unit(1),
            }),
            scripts: vec![],
            change_address: WalletAddress::new("addr_test1qwallet").unwrap(),
            balancing: Balancing::FixedInputs,
        }
    }

    #[test]
    fn json_roundtrip() {
        let spec = sample();
        let json = spec.to_json_pretty().unwrap();
        let back: TxSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn json_shape() {
        let value: serde_json::Value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["inputs"][0]["kind"], "script");
        assert_eq!(value["inputs"][0]["redeemer"], "d87980");
        assert_eq!(value["outputs"][0]["datum"], "01");
        assert_eq!(value["balancing"]["mode"], "fixed_inputs");
        let mint = value["mint"]["assets"].as_object().unwrap();
        assert_eq!(mint.values().next().unwrap(), "-2");
    }
}
