//! Aggregating outputs into per-asset holdings.

use agora_types::{AssetBundle, AssetId, Holding, SpendableOutput};

use crate::error::WalletError;

/// Sum `outputs` per asset. The base currency comes first, the rest are
/// ordered by display name.
pub fn aggregate_holdings(outputs: &[SpendableOutput]) -> Result<Vec<Holding>, WalletError> {
    let total = AssetBundle::sum(outputs.iter().map(|o| &o.assets))?;
    let mut holdings: Vec<Holding> = total
        .into_iter()
        .map(|(unit, quantity)| {
            let name = display_name(&unit);
            Holding {
                unit,
                quantity,
                display_name: Some(name),
            }
        })
        .collect();
    holdings.sort_by(|a, b| {
        b.unit
            .is_base()
            .cmp(&a.unit.is_base())
            .then_with(|| a.display_name.cmp(&b.display_name))
            .then_with(|| a.unit.cmp(&b.unit))
    });
    Ok(holdings)
}

/// Human-readable label for an asset: `ADA` for the base currency, the asset
/// name when it is printable text, otherwise shortened hex.
pub fn display_name(asset: &AssetId) -> String {
    match asset {
        AssetId::Base => "ADA".into(),
        AssetId::Native { policy, name } => {
            let policy = policy.to_string();
            if name.is_empty() {
                return format!("{}...", &policy[..8]);
            }
            match name.as_text() {
                Some(text) => text,
                None => {
                    let name = name.to_string();
                    format!("{}...{}", &policy[..8], &name[..name.len().min(8)])
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_types::{AssetName, OutRef, PolicyId, TxHash, WalletAddress};

    fn token(p: u8, name: &[u8]) -> AssetId {
        AssetId::native(PolicyId::new([p; 28]), AssetName::new(name.to_vec()).unwrap())
    }

    fn output(tx: u8, assets: AssetBundle) -> SpendableOutput {
        SpendableOutput::new(
            OutRef::new(TxHash::new([tx; 32]), 0),
            WalletAddress::new("addr_test1qholder").unwrap(),
            assets,
        )
    }

    #[test]
    fn sums_across_outputs_base_first() {
        let mut a = AssetBundle::base(1_000_000);
        a.set(token(1, b"zeta"), 5);
        let mut b = AssetBundle::base(2_000_000);
        b.set(token(1, b"zeta"), 2);
        b.set(token(2, b"alpha"), 9);

        let holdings = aggregate_holdings(&[output(1, a), output(2, b)]).unwrap();
        let names: Vec<_> = holdings.iter().map(|h| h.display_name.clone().unwrap()).collect();
        assert_eq!(names, vec!["ADA", "alpha", "zeta"]);
        assert_eq!(holdings[0].quantity, 3_000_000);
        assert_eq!(holdings[2].quantity, 7);
    }

    #[test]
    fn display_names() {
        assert_eq!(display_name(&AssetId::Base), "ADA");
        assert_eq!(display_name(&token(0xab, b"HOSKY")), "HOSKY");
        assert_eq!(display_name(&token(0xab, b"")), "abababab...");
        assert_eq!(
            display_name(&token(0xab, &[0xff, 0xfe, 0x01, 0x02, 0x03])),
            "abababab...fffe0102"
        );
    }

    #[test]
    fn empty_wallet_has_no_holdings() {
        assert!(aggregate_holdings(&[]).unwrap().is_empty());
    }
}
