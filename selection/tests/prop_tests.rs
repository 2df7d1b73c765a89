use proptest::prelude::*;

use agora_selection::{select, SelectionError};
use agora_types::{
    AssetBundle, AssetId, AssetName, LedgerParams, OutRef, PolicyId, SpendableOutput, TxHash,
    WalletAddress,
};

fn token(p: u8) -> AssetId {
    AssetId::native(PolicyId::new([p; 28]), AssetName::new(vec![p]).unwrap())
}

fn arb_output() -> impl Strategy<Value = SpendableOutput> {
    (
        prop::array::uniform32(0u8..4),
        0u32..4,
        1_000_000u128..20_000_000,
        prop::option::of((0u8..3, 1u128..100)),
    )
        .prop_map(|(tx, index, base, native)| {
            let mut assets = AssetBundle::base(base);
            if let Some((p, q)) = native {
                assets.set(token(p), q);
            }
            SpendableOutput::new(
                OutRef::new(TxHash::new(tx), index),
                WalletAddress::new("addr_test1qprop").unwrap(),
                assets,
            )
        })
}

fn arb_snapshot() -> impl Strategy<Value = Vec<SpendableOutput>> {
    prop::collection::vec(arb_output(), 0..10).prop_map(|mut outputs| {
        let mut seen = std::collections::BTreeSet::new();
        outputs.retain(|o| seen.insert(o.out_ref));
        outputs
    })
}

/// Requests with and without base currency, some naming only tokens.
fn arb_required() -> impl Strategy<Value = AssetBundle> {
    (
        prop::option::of(1u128..60_000_000),
        prop::option::of((0u8..3, 1u128..50)),
    )
        .prop_map(|(base, native)| {
            let mut required = AssetBundle::new();
            if let Some(base) = base {
                required.set(AssetId::Base, base);
            }
            if let Some((p, q)) = native {
                required.set(token(p), q);
            }
            required
        })
}

proptest! {
    /// An accepted selection covers the request, the fee buffer and the
    /// change minimum.
    #[test]
    fn selection_covers_request(snapshot in arb_snapshot(), required in arb_required()) {
        let params = LedgerParams::default();
        if let Ok(selection) = select(&snapshot, &required, &params) {
            prop_assert!(!selection.inputs.is_empty());
            let total = AssetBundle::sum(selection.inputs.iter().map(|o| &o.assets)).unwrap();
            prop_assert_eq!(&total, &selection.total);
            prop_assert_eq!(total.checked_sub(&required).unwrap(), selection.change.clone());
            prop_assert!(
                selection.change.base_quantity()
                    >= params.fee_buffer + selection.min_change_balance
            );
        }
    }

    /// Failing requests report a base shortfall whenever the base currency,
    /// fee buffer and change minimum are not covered, even when the request
    /// names no base currency.
    #[test]
    fn shortfall_counts_reserved_base(snapshot in arb_snapshot(), required in arb_required()) {
        let params = LedgerParams::default();
        if let Err(SelectionError::InsufficientFunds { shortfall }) = select(&snapshot, &required, &params) {
            let held = AssetBundle::sum(snapshot.iter().map(|o| &o.assets)).unwrap();
            let tokens_covered = required
                .iter()
                .all(|(asset, q)| asset.is_base() || held.get(asset) >= q);
            if tokens_covered {
                prop_assert!(shortfall.base_quantity() > 0);
                prop_assert_eq!(shortfall.native_asset_count(), 0);
            }
        }
    }

    /// Snapshot order does not influence the outcome.
    #[test]
    fn selection_ignores_snapshot_order(snapshot in arb_snapshot(), required in arb_required()) {
        let params = LedgerParams::default();
        let mut reversed = snapshot.clone();
        reversed.reverse();
        prop_assert_eq!(
            select(&snapshot, &required, &params),
            select(&reversed, &required, &params)
        );
    }

    /// Inputs are returned sorted by output reference.
    #[test]
    fn inputs_in_canonical_order(snapshot in arb_snapshot(), required in arb_required()) {
        if let Ok(selection) = select(&snapshot, &required, &LedgerParams::default()) {
            let refs = selection.out_refs();
            prop_assert!(refs.windows(2).all(|w| w[0] < w[1]));
        }
    }

    /// Dropping the last scanned input makes the request unsatisfiable.
    #[test]
    fn selection_is_a_minimal_prefix(snapshot in arb_snapshot(), required in arb_required()) {
        let params = LedgerParams::default();
        if let Ok(selection) = select(&snapshot, &required, &params) {
            let last = selection
                .inputs
                .iter()
                .max_by(|a, b| {
                    a.base_quantity()
                        .cmp(&b.base_quantity())
                        .then_with(|| a.out_ref.cmp(&b.out_ref))
                })
                .unwrap()
                .out_ref;
            let fewer: Vec<SpendableOutput> = selection
                .inputs
                .iter()
                .filter(|o| o.out_ref != last)
                .cloned()
                .collect();
            let insufficient = matches!(
                select(&fewer, &required, &params),
                Err(SelectionError::InsufficientFunds { .. })
            );
            prop_assert!(insufficient);
        }
    }
}
