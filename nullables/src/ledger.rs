//! Nullable ledger: an in-memory set of unspent outputs.

use agora_locker::{CollaboratorError, LedgerQuery};
use agora_types::{AssetId, Holding, SpendableOutput, WalletAddress};
use std::collections::HashMap;
use std::sync::Mutex;

/// A ledger view backed by outputs and holdings the test puts in.
pub struct NullLedger {
    outputs: Mutex<Vec<SpendableOutput>>,
    holdings: Mutex<HashMap<String, Vec<Holding>>>,
    failure: Mutex<Option<CollaboratorError>>,
}

impl NullLedger {
    pub fn new() -> Self {
        Self {
            outputs: Mutex::new(Vec::new()),
            holdings: Mutex::new(HashMap::new()),
            failure: Mutex::new(None),
        }
    }

    /// Add an unspent output.
    pub fn add_output(&self, output: SpendableOutput) {
        lock(&self.outputs).push(output);
    }

    /// Set what `holdings(address)` returns.
    pub fn set_holdings(&self, address: &WalletAddress, holdings: Vec<Holding>) {
        lock(&self.holdings).insert(address.as_str().to_string(), holdings);
    }

    pub fn fail_next(&self, error: CollaboratorError) {
        *lock(&self.failure) = Some(error);
    }

    fn take_failure(&self) -> Result<(), CollaboratorError> {
        match lock(&self.failure).take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerQuery for NullLedger {
    async fn outputs_at_with_unit(
        &self,
        address: &WalletAddress,
        unit: &AssetId,
    ) -> Result<Vec<SpendableOutput>, CollaboratorError> {
        self.take_failure()?;
        Ok(lock(&self.outputs)
            .iter()
            .filter(|o| &o.address == address && o.assets.contains(unit))
            .cloned()
            .collect())
    }

    async fn holdings(&self, address: &WalletAddress) -> Result<Vec<Holding>, CollaboratorError> {
        self.take_failure()?;
        Ok(lock(&self.holdings)
            .get(address.as_str())
            .cloned()
            .unwrap_or_default())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_types::{AssetBundle, OutRef, TxHash};

    #[tokio::test]
    async fn filters_by_address_and_unit() {
        let ledger = NullLedger::new();
        let here = WalletAddress::new("addr_test1wlocker").unwrap();
        let there = WalletAddress::new("addr_test1welsewhere").unwrap();
        ledger.add_output(SpendableOutput::new(
            OutRef::new(TxHash::new([1; 32]), 0),
            here.clone(),
            AssetBundle::base(5),
        ));
        ledger.add_output(SpendableOutput::new(
            OutRef::new(TxHash::new([2; 32]), 0),
            there,
            AssetBundle::base(5),
        ));
        let found = ledger.outputs_at_with_unit(&here, &AssetId::Base).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(ledger.holdings(&here).await.unwrap().is_empty());
    }
}
