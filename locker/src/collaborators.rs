//! The outside world the orchestrator talks to.
//!
//! Implementations do their own I/O, timeouts and retries. Every failure is
//! reported as a [`CollaboratorError`] and reaches the caller unchanged.

use std::future::Future;

use agora_types::{AssetId, Holding, SpendableOutput, TxHash, WalletAddress};

use crate::error::CollaboratorError;
use crate::tx_spec::TxSpec;

/// The depositor's wallet.
pub trait WalletSource {
    /// Address change and receipts are paid to.
    fn address(&self) -> impl Future<Output = Result<WalletAddress, CollaboratorError>> + Send;

    /// Current snapshot of the wallet's unspent outputs.
    fn spendable_outputs(
        &self,
    ) -> impl Future<Output = Result<Vec<SpendableOutput>, CollaboratorError>> + Send;
}

/// Read access to the ledger.
pub trait LedgerQuery {
    /// Unspent outputs at `address` holding `unit`.
    fn outputs_at_with_unit(
        &self,
        address: &WalletAddress,
        unit: &AssetId,
    ) -> impl Future<Output = Result<Vec<SpendableOutput>, CollaboratorError>> + Send;

    /// Everything `address` holds, aggregated per unit.
    fn holdings(
        &self,
        address: &WalletAddress,
    ) -> impl Future<Output = Result<Vec<Holding>, CollaboratorError>> + Send;
}

/// Signs and submits a finished specification.
pub trait SettlementSink {
    fn sign_and_submit(
        &self,
        spec: &TxSpec,
    ) -> impl Future<Output = Result<TxHash, CollaboratorError>> + Send;
}
