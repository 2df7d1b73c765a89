//! Folding a deposit into a single voting-power integer.

use agora_types::{AssetBundle, AssetId};

use crate::config::{AggregationMode, AssetSelector, PowerConfig, WeightConfig, WeightEntry};
use crate::error::PowerError;

/// Weight times the quantity the entry's selector picks out of `bundle`.
pub fn partial_power(bundle: &AssetBundle, entry: &WeightEntry) -> Result<u128, PowerError> {
    let selected = match &entry.selector {
        AssetSelector::ByPolicy(None) => bundle.base_quantity(),
        AssetSelector::ByAsset(class) => bundle.get(&class.asset_id()),
        AssetSelector::ByPolicy(Some(policy)) => bundle
            .iter()
            .filter(|(asset, _)| matches!(asset, AssetId::Native { policy: p, .. } if p == policy))
            .try_fold(0u128, |acc, (_, q)| acc.checked_add(q))
            .ok_or(PowerError::Overflow)?,
    };
    selected.checked_mul(entry.weight).ok_or(PowerError::Overflow)
}

/// Voting power of `bundle` under `mode` and `weights`.
///
/// Both folds start from zero, so [`AggregationMode::Multiply`] yields zero
/// for every input.
pub fn evaluate(
    bundle: &AssetBundle,
    mode: AggregationMode,
    weights: &WeightConfig,
) -> Result<u128, PowerError> {
    let mut acc: u128 = 0;
    for entry in weights.entries() {
        let partial = partial_power(bundle, entry)?;
        acc = match mode {
            AggregationMode::Sum => acc.checked_add(partial),
            AggregationMode::Multiply => acc.checked_mul(partial),
        }
        .ok_or(PowerError::Overflow)?;
    }
    tracing::debug!(%mode, entries = weights.len(), power = %acc, "evaluated voting power");
    Ok(acc)
}

impl PowerConfig {
    pub fn evaluate(&self, bundle: &AssetBundle) -> Result<u128, PowerError> {
        evaluate(bundle, self.mode, &self.weights)
    }
}
