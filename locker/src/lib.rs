//! Deposit locking with receipt tokens.
//!
//! A deposit is paid to a script address together with one unit of a freshly
//! minted receipt token and a datum recording its voting power. A second
//! receipt unit and the power tokens go back to the depositor. Presenting the
//! receipt later releases the deposit and burns both receipt units and the
//! recorded power.
//!
//! This crate plans those transactions. Signing and submission happen behind
//! the [`SettlementSink`] trait.

pub mod collaborators;
pub mod datum;
pub mod error;
pub mod orchestrator;
pub mod receipt;
pub mod scripts;
pub mod tx_spec;

pub use collaborators::{LedgerQuery, SettlementSink, WalletSource};
pub use datum::{spend_redeemer, LockRecord, MintRedeemer};
pub use error::{CollaboratorError, LockerError};
pub use orchestrator::{LockPhase, LockPlan, Locker, Plan, UnlockPhase, UnlockPlan, RECEIPTS_PER_LOCK};
pub use receipt::{discover_receipts, is_receipt, ReceiptIdentity};
pub use scripts::{
    LockerScripts, ParameterizedScript, PlutusVersion, ScriptTemplate, ScriptTemplates,
    POWER_TOKEN_NAME,
};
pub use tx_spec::{AttachedScript, Balancing, Mint, ScriptRole, TxInput, TxOutput, TxSpec};
