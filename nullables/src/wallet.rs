//! Nullable wallet: a fixed snapshot that records what it is asked to sign.

use agora_locker::{CollaboratorError, SettlementSink, TxSpec, WalletSource};
use agora_types::{SpendableOutput, TxHash, WalletAddress};
use std::sync::Mutex;

/// A wallet that serves a configured snapshot and "submits" by recording.
///
/// Submitted specifications get sequential transaction hashes
/// (`[1; 32]`, `[2; 32]`, ...).
pub struct NullWallet {
    address: WalletAddress,
    outputs: Mutex<Vec<SpendableOutput>>,
    submitted: Mutex<Vec<TxSpec>>,
    failure: Mutex<Option<CollaboratorError>>,
}

impl NullWallet {
    pub fn new(address: WalletAddress, outputs: Vec<SpendableOutput>) -> Self {
        Self {
            address,
            outputs: Mutex::new(outputs),
            submitted: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
        }
    }

    /// Replace the wallet snapshot.
    pub fn set_outputs(&self, outputs: Vec<SpendableOutput>) {
        *lock(&self.outputs) = outputs;
    }

    /// Make the next call fail with `error`.
    pub fn fail_next(&self, error: CollaboratorError) {
        *lock(&self.failure) = Some(error);
    }

    /// Every specification "submitted" so far.
    pub fn submitted(&self) -> Vec<TxSpec> {
        lock(&self.submitted).clone()
    }

    fn take_failure(&self) -> Result<(), CollaboratorError> {
        match lock(&self.failure).take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl WalletSource for NullWallet {
    async fn address(&self) -> Result<WalletAddress, CollaboratorError> {
        self.take_failure()?;
        Ok(self.address.clone())
    }

    async fn spendable_outputs(&self) -> Result<Vec<SpendableOutput>, CollaboratorError> {
        self.take_failure()?;
        Ok(lock(&self.outputs).clone())
    }
}

impl SettlementSink for NullWallet {
    async fn sign_and_submit(&self, spec: &TxSpec) -> Result<TxHash, CollaboratorError> {
        self.take_failure()?;
        let mut submitted = lock(&self.submitted);
        submitted.push(spec.clone());
        let tx_hash = TxHash::new([submitted.len() as u8; 32]);
        tracing::debug!(%tx_hash, "null wallet recorded submission");
        Ok(tx_hash)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
