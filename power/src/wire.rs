//! JSON form of a [`PowerConfig`], as produced by configuration editors.
//!
//! ```json
//! { "mode": "Sum", "entries": [{ "weight": "1", "assetSelector": "lovelace" }] }
//! ```
//!
//! Weights are decimal strings. Rows where both fields are blank are editor
//! placeholders and are dropped; a row with only one field filled is an error.

use serde::{Deserialize, Serialize};

use crate::config::{AggregationMode, AssetSelector, PowerConfig, WeightConfig, WeightEntry};
use crate::error::PowerError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireConfig {
    pub mode: String,
    #[serde(default)]
    pub entries: Vec<WireEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEntry {
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub asset_selector: String,
}

impl WireEntry {
    pub fn new(weight: impl Into<String>, asset_selector: impl Into<String>) -> Self {
        Self {
            weight: weight.into(),
            asset_selector: asset_selector.into(),
        }
    }
}

/// Parse a decimal weight. Values that do not fit a script integer are
/// rejected rather than truncated.
pub fn parse_weight(raw: &str) -> Result<u128, PowerError> {
    let s = raw.trim();
    if s.starts_with('-') {
        return Err(PowerError::NegativeWeight(raw.into()));
    }
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PowerError::MalformedWeight(raw.into()));
    }
    let weight: u128 = s
        .parse()
        .map_err(|_| PowerError::MalformedWeight(raw.into()))?;
    if weight > i128::MAX as u128 {
        return Err(PowerError::MalformedWeight(raw.into()));
    }
    Ok(weight)
}

impl WeightConfig {
    /// Validate editor rows into a weight list.
    pub fn from_wire(rows: &[WireEntry]) -> Result<Self, PowerError> {
        let mut entries = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let weight = row.weight.trim();
            let selector = row.asset_selector.trim();
            match (weight.is_empty(), selector.is_empty()) {
                (true, true) => continue,
                (false, false) => {}
                _ => return Err(PowerError::IncompleteEntry { index }),
            }
            let weight = parse_weight(weight)?;
            let selector: AssetSelector = selector.parse()?;
            entries.push(WeightEntry::new(weight, selector));
        }
        WeightConfig::new(entries)
    }
}

impl TryFrom<WireConfig> for PowerConfig {
    type Error = PowerError;

    fn try_from(wire: WireConfig) -> Result<Self, Self::Error> {
        let mode: AggregationMode = wire.mode.trim().parse()?;
        Ok(PowerConfig::new(mode, WeightConfig::from_wire(&wire.entries)?))
    }
}

impl From<PowerConfig> for WireConfig {
    fn from(config: PowerConfig) -> Self {
        Self {
            mode: config.mode.to_string(),
            entries: config
                .weights
                .entries()
                .iter()
                .map(|e| WireEntry::new(e.weight.to_string(), e.selector.to_string()))
                .collect(),
        }
    }
}

impl PowerConfig {
    /// Parse the JSON form.
    pub fn from_json(json: &str) -> Result<Self, PowerError> {
        let wire: WireConfig =
            serde_json::from_str(json).map_err(|e| PowerError::MalformedConfig(e.to_string()))?;
        wire.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: &str = "0123456789abcdef0123456789abcdef0123456789abcdef01234567";

    fn wire(mode: &str, entries: Vec<WireEntry>) -> WireConfig {
        WireConfig {
            mode: mode.into(),
            entries,
        }
    }

    #[test]
    fn parses_editor_json() {
        let json = format!(
            r#"{{"mode":"Sum","entries":[
                {{"weight":"1","assetSelector":"lovelace"}},
                {{"weight":"","assetSelector":""}},
                {{"weight":"250","assetSelector":"{POLICY}"}}
            ]}}"#
        );
        let config = PowerConfig::from_json(&json).unwrap();
        assert_eq!(config.mode, AggregationMode::Sum);
        assert_eq!(config.weights.len(), 2);
        assert_eq!(config.weights.entries()[1].weight, 250);
    }

    #[test]
    fn blank_rows_only_is_empty() {
        let w = wire("Sum", vec![WireEntry::new("", ""), WireEntry::new(" ", "")]);
        assert_eq!(PowerConfig::try_from(w), Err(PowerError::EmptyConfig));
    }

    #[test]
    fn half_filled_row_rejected() {
        let w = wire(
            "Sum",
            vec![WireEntry::new("1", "lovelace"), WireEntry::new("3", "")],
        );
        assert_eq!(
            PowerConfig::try_from(w),
            Err(PowerError::IncompleteEntry { index: 1 })
        );
    }

    #[test]
    fn weight_validation() {
        assert_eq!(parse_weight("42"), Ok(42));
        assert!(matches!(parse_weight("-1"), Err(PowerError::NegativeWeight(_))));
        assert!(matches!(parse_weight("1.5"), Err(PowerError::MalformedWeight(_))));
        assert!(matches!(parse_weight("+1"), Err(PowerError::MalformedWeight(_))));
        assert!(matches!(
            parse_weight(&u128::MAX.to_string()),
            Err(PowerError::MalformedWeight(_))
        ));
    }

    #[test]
    fn unknown_mode_rejected() {
        let w = wire("Average", vec![WireEntry::new("1", "lovelace")]);
        assert!(matches!(PowerConfig::try_from(w), Err(PowerError::UnknownMode(_))));
    }

    #[test]
    fn serde_roundtrip_through_wire_form() {
        let config = PowerConfig::base_sum();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(
            json,
            r#"{"mode":"Sum","entries":[{"weight":"1","assetSelector":"lovelace"}]}"#
        );
        let back: PowerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
