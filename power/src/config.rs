//! Weight configuration types and their script-parameter encoding.

use agora_plutus::{PlutusData, ToPlutusData};
use agora_types::{AssetId, AssetName, PolicyId, BASE_UNIT};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PowerError;
use crate::wire::WireConfig;

/// How partial values are folded into the final power.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AggregationMode {
    /// Add the partials, starting from zero.
    Sum,
    /// Multiply the partials into an accumulator that also starts at zero.
    ///
    /// The result is therefore always zero. Deployed policies were compiled
    /// against this fold, so it is reproduced as is.
    Multiply,
}

impl AggregationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sum => "Sum",
            Self::Multiply => "Multiply",
        }
    }
}

impl fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationMode {
    type Err = PowerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sum" => Ok(Self::Sum),
            "multiply" => Ok(Self::Multiply),
            _ => Err(PowerError::UnknownMode(s.into())),
        }
    }
}

impl ToPlutusData for AggregationMode {
    fn to_plutus_data(&self) -> PlutusData {
        match self {
            Self::Sum => PlutusData::unit(0),
            Self::Multiply => PlutusData::unit(1),
        }
    }
}

/// One native asset named by policy and a non-empty asset name.
///
/// The base currency and nameless assets are selected through
/// [`AssetSelector::ByPolicy`] instead; their wire strings would otherwise
/// read back as policy selectors.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AssetClass {
    policy: PolicyId,
    name: AssetName,
}

impl AssetClass {
    pub fn new(policy: PolicyId, name: AssetName) -> Result<Self, PowerError> {
        if name.is_empty() {
            return Err(PowerError::EmptyAssetName(policy.to_string()));
        }
        Ok(Self { policy, name })
    }

    pub fn policy(&self) -> &PolicyId {
        &self.policy
    }

    pub fn name(&self) -> &AssetName {
        &self.name
    }

    pub fn asset_id(&self) -> AssetId {
        AssetId::native(self.policy, self.name.clone())
    }
}

impl TryFrom<AssetId> for AssetClass {
    type Error = PowerError;

    fn try_from(asset: AssetId) -> Result<Self, Self::Error> {
        match asset {
            AssetId::Base => Err(PowerError::MalformedSelector(BASE_UNIT.into())),
            AssetId::Native { policy, name } => Self::new(policy, name),
        }
    }
}

/// Which assets of a deposit an entry counts.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AssetSelector {
    /// Every asset under a policy; `None` selects the base currency.
    ByPolicy(Option<PolicyId>),
    /// Exactly one native asset.
    ByAsset(AssetClass),
}

impl AssetSelector {
    pub fn base() -> Self {
        Self::ByPolicy(None)
    }

    pub fn policy(policy: PolicyId) -> Self {
        Self::ByPolicy(Some(policy))
    }

    /// Select exactly `asset`. The base currency and nameless assets are
    /// rejected; use [`AssetSelector::base`] or [`AssetSelector::policy`].
    pub fn asset(asset: AssetId) -> Result<Self, PowerError> {
        Ok(Self::ByAsset(AssetClass::try_from(asset)?))
    }

    /// Whether `asset` is counted by this selector.
    pub fn matches(&self, asset: &AssetId) -> bool {
        match self {
            Self::ByPolicy(None) => asset.is_base(),
            Self::ByPolicy(Some(policy)) => asset.policy() == Some(policy),
            Self::ByAsset(class) => {
                asset.policy() == Some(&class.policy) && asset.name() == Some(&class.name)
            }
        }
    }
}

/// Wire form: `lovelace`, a bare 56-hex policy id, or policy id followed by
/// the hex asset name.
impl fmt::Display for AssetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByPolicy(None) => f.write_str(BASE_UNIT),
            Self::ByPolicy(Some(policy)) => write!(f, "{policy}"),
            Self::ByAsset(class) => write!(f, "{}{}", class.policy, class.name),
        }
    }
}

impl FromStr for AssetSelector {
    type Err = PowerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || PowerError::MalformedSelector(s.into());
        if s == BASE_UNIT {
            return Ok(Self::ByPolicy(None));
        }
        if !s.is_ascii() || s.len() < PolicyId::HEX_LEN {
            return Err(malformed());
        }
        let (policy, name) = s.split_at(PolicyId::HEX_LEN);
        // Upper-case hex would not survive the round trip through Display.
        if s.bytes().any(|b| b.is_ascii_uppercase()) {
            return Err(malformed());
        }
        let policy: PolicyId = policy.parse().map_err(|_| malformed())?;
        if name.is_empty() {
            return Ok(Self::ByPolicy(Some(policy)));
        }
        let name = AssetName::from_hex(name).map_err(|_| malformed())?;
        Ok(Self::ByAsset(AssetClass::new(policy, name)?))
    }
}

/// `PolicySelection { policy }` or `AssetClass { policy, asset }`, wrapped in
/// the `AssetSelection` constructor. The base currency is empty bytes.
impl ToPlutusData for AssetSelector {
    fn to_plutus_data(&self) -> PlutusData {
        let inner = match self {
            Self::ByPolicy(policy) => PlutusData::constr(
                0,
                vec![PlutusData::bytes(
                    policy.as_ref().map(|p| p.as_bytes().to_vec()).unwrap_or_default(),
                )],
            ),
            Self::ByAsset(class) => PlutusData::constr(
                1,
                vec![
                    PlutusData::bytes(class.policy.as_bytes().to_vec()),
                    PlutusData::bytes(class.name.as_bytes().to_vec()),
                ],
            ),
        };
        PlutusData::constr(0, vec![inner])
    }
}

/// One weighted entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WeightEntry {
    pub weight: u128,
    pub selector: AssetSelector,
}

impl WeightEntry {
    pub fn new(weight: u128, selector: AssetSelector) -> Self {
        Self { weight, selector }
    }
}

impl ToPlutusData for WeightEntry {
    fn to_plutus_data(&self) -> PlutusData {
        // Weights above i128::MAX cannot be script parameters; the wire parser
        // caps them, so saturating here never changes a parsed value.
        let weight = i128::try_from(self.weight).unwrap_or(i128::MAX);
        PlutusData::constr(0, vec![PlutusData::Int(weight), self.selector.to_plutus_data()])
    }
}

/// Ordered, non-empty list of weighted entries.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WeightConfig(Vec<WeightEntry>);

impl WeightConfig {
    pub fn new(entries: Vec<WeightEntry>) -> Result<Self, PowerError> {
        if entries.is_empty() {
            return Err(PowerError::EmptyConfig);
        }
        Ok(Self(entries))
    }

    pub fn entries(&self) -> &[WeightEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Mode plus weights: everything that parameterises the locker scripts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "WireConfig", into = "WireConfig")]
pub struct PowerConfig {
    pub mode: AggregationMode,
    pub weights: WeightConfig,
}

impl PowerConfig {
    pub fn new(mode: AggregationMode, weights: WeightConfig) -> Self {
        Self { mode, weights }
    }

    /// One base-currency unit, one vote.
    pub fn base_sum() -> Self {
        Self {
            mode: AggregationMode::Sum,
            weights: WeightConfig(vec![WeightEntry::new(1, AssetSelector::base())]),
        }
    }
}

/// `{ action, powerList }`
impl ToPlutusData for PowerConfig {
    fn to_plutus_data(&self) -> PlutusData {
        PlutusData::constr(
            0,
            vec![
                self.mode.to_plutus_data(),
                PlutusData::List(
                    self.weights
                        .entries()
                        .iter()
                        .map(ToPlutusData::to_plutus_data)
                        .collect(),
                ),
            ],
        )
    }
}
