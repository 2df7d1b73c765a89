//! Ledger parameters consulted by coin selection.
//!
//! The minimum balance of an output grows with the bytes its asset map
//! occupies: each distinct policy id and each asset name costs storage.

use serde::{Deserialize, Serialize};

/// Parameters of the minimum-balance and fee model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerParams {
    /// Base-currency headroom reserved for the transaction fee.
    pub fee_buffer: u128,

    /// Minimum balance of an output carrying only the base currency.
    pub base_min_balance: u128,

    /// Storage price per byte of the output's asset map.
    pub coins_per_byte: u128,

    /// Bytes a policy id occupies in an output.
    pub policy_id_bytes: u128,

    /// Average bytes an asset name occupies in an output.
    pub asset_name_bytes: u128,
}

impl LedgerParams {
    /// Minimum base-currency balance for an output holding `num_assets`
    /// native assets spread over `num_policies` policies.
    pub fn min_balance(&self, num_assets: usize, num_policies: usize) -> u128 {
        let per_policy = self.policy_id_bytes.saturating_mul(self.coins_per_byte);
        let per_asset = self.asset_name_bytes.saturating_mul(self.coins_per_byte);
        self.base_min_balance
            .saturating_add(per_policy.saturating_mul(num_policies as u128))
            .saturating_add(per_asset.saturating_mul(num_assets as u128))
    }
}

impl Default for LedgerParams {
    fn default() -> Self {
        Self {
            fee_buffer: 500_000,
            base_min_balance: 1_000_000,
            coins_per_byte: 4_310,
            policy_id_bytes: 28,
            asset_name_bytes: 32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_only_output_needs_base_minimum() {
        assert_eq!(LedgerParams::default().min_balance(0, 0), 1_000_000);
    }

    #[test]
    fn each_policy_and_asset_adds_storage_cost() {
        let params = LedgerParams::default();
        // 1_000_000 + 2 * 28 * 4310 + 3 * 32 * 4310
        assert_eq!(params.min_balance(3, 2), 1_000_000 + 241_360 + 413_760);
    }
}
