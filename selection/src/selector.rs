//! Prefix scan over a sorted snapshot.

use std::collections::BTreeSet;

use agora_types::{AssetBundle, AssetId, LedgerParams, OutRef, SpendableOutput};

use crate::error::SelectionError;

/// Outcome of a successful selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    /// Chosen inputs in canonical output-reference order. Never empty.
    pub inputs: Vec<SpendableOutput>,
    /// Sum of the chosen inputs.
    pub total: AssetBundle,
    /// What is left after the required bundle: returned to the wallet.
    pub change: AssetBundle,
    /// Minimum balance enforced on the change output.
    pub min_change_balance: u128,
}

impl Selection {
    /// The input with the smallest output reference.
    pub fn first_input(&self) -> &SpendableOutput {
        &self.inputs[0]
    }

    pub fn out_refs(&self) -> Vec<OutRef> {
        self.inputs.iter().map(|o| o.out_ref).collect()
    }
}

/// Select inputs from `available` covering `required`.
///
/// Candidates are scanned in ascending base-currency order, ties broken by
/// output reference. The first prefix is accepted whose sum covers every
/// native asset of `required` and leaves a base remainder of at least the fee
/// buffer plus the minimum balance of the change output.
pub fn select(
    available: &[SpendableOutput],
    required: &AssetBundle,
    params: &LedgerParams,
) -> Result<Selection, SelectionError> {
    let mut seen = BTreeSet::new();
    for output in available {
        if !seen.insert(output.out_ref) {
            return Err(SelectionError::DuplicateInput(output.out_ref));
        }
    }

    let mut candidates: Vec<&SpendableOutput> = available.iter().collect();
    candidates.sort_by(|a, b| {
        a.base_quantity()
            .cmp(&b.base_quantity())
            .then_with(|| a.out_ref.cmp(&b.out_ref))
    });

    let mut total = AssetBundle::new();
    for (taken, candidate) in candidates.iter().enumerate() {
        total.merge(&candidate.assets)?;
        if let Some((change, min_change_balance)) = settle(&total, required, params) {
            let mut inputs: Vec<SpendableOutput> = candidates[..=taken]
                .iter()
                .map(|o| (*o).clone())
                .collect();
            inputs.sort_by(|a, b| a.out_ref.cmp(&b.out_ref));
            tracing::debug!(
                inputs = inputs.len(),
                available = available.len(),
                change = change.base_quantity(),
                min_change_balance,
                "coin selection succeeded"
            );
            return Ok(Selection {
                inputs,
                total,
                change,
                min_change_balance,
            });
        }
    }

    let shortfall = shortfall(&total, required, params);
    tracing::debug!(available = available.len(), ?shortfall, "coin selection failed");
    Err(SelectionError::InsufficientFunds { shortfall })
}

/// Change and its minimum balance, if `total` is enough.
fn settle(
    total: &AssetBundle,
    required: &AssetBundle,
    params: &LedgerParams,
) -> Option<(AssetBundle, u128)> {
    let change = total.checked_sub(required).ok()?;
    let min = params.min_balance(change.native_asset_count(), change.policies().len());
    let needed = params.fee_buffer.saturating_add(min);
    (change.base_quantity() >= needed).then_some((change, min))
}

/// What `total` lacks, counting the fee buffer and change minimum as base
/// currency demand.
fn shortfall(total: &AssetBundle, required: &AssetBundle, params: &LedgerParams) -> AssetBundle {
    let mut missing = AssetBundle::new();
    for (asset, quantity) in required.iter() {
        if !asset.is_base() {
            missing.set(asset.clone(), quantity.saturating_sub(total.get(asset)));
        }
    }

    let mut leftover = AssetBundle::new();
    for (asset, quantity) in total.iter() {
        if !asset.is_base() {
            leftover.set(asset.clone(), quantity.saturating_sub(required.get(asset)));
        }
    }
    let min = params.min_balance(leftover.native_asset_count(), leftover.policies().len());
    let base_demand = required
        .base_quantity()
        .saturating_add(params.fee_buffer)
        .saturating_add(min);
    missing.set(
        AssetId::Base,
        base_demand.saturating_sub(total.base_quantity()),
    );
    missing
}
