//! Lock and unlock orchestration.
//!
//! Planning is a pure pipeline over snapshots:
//!
//! ```text
//! lock:    Idle → Selecting → Evaluating → Assembling  (→ Settled | Failed)
//! unlock:  Idle → Locating  → Verifying  → Assembling  (→ Settled | Failed)
//! ```
//!
//! The async wrappers only fetch snapshots from collaborators and hand the
//! finished specification to a [`SettlementSink`]. Selecting must finish
//! before the receipt identity is derived, since the identity depends on the
//! first selected input.

use std::collections::BTreeMap;

use agora_plutus::{FromPlutusData, PlutusData, ToPlutusData};
use agora_power::{AggregationMode, PowerConfig};
use agora_selection::select;
use agora_types::{
    AssetBundle, AssetId, LedgerParams, NetworkId, OutRef, SpendableOutput, TxHash, WalletAddress,
};

use crate::collaborators::{LedgerQuery, SettlementSink, WalletSource};
use crate::datum::{spend_redeemer, LockRecord, MintRedeemer};
use crate::error::LockerError;
use crate::receipt::{discover_receipts, ReceiptIdentity};
use crate::scripts::{LockerScripts, ScriptTemplates};
use crate::tx_spec::{AttachedScript, Balancing, Mint, ScriptRole, TxInput, TxOutput, TxSpec};

/// Receipt units minted per lock: one stays with the locked output, the
/// other reaches the depositor through change.
pub const RECEIPTS_PER_LOCK: i128 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockPhase {
    Idle,
    Selecting,
    Evaluating,
    Assembling,
    Settled,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnlockPhase {
    Idle,
    Locating,
    Verifying,
    Assembling,
    Settled,
    Failed,
}

/// A planned settlement awaiting signature.
pub trait Plan {
    fn spec(&self) -> &TxSpec;
    fn mark_settled(&mut self, tx_hash: TxHash);
    fn mark_failed(&mut self);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockPlan {
    pub phases: Vec<LockPhase>,
    /// Selected wallet inputs in canonical order.
    pub inputs: Vec<OutRef>,
    pub receipt: AssetId,
    pub record: LockRecord,
    /// Change expected back in the wallet, before fees.
    pub change: AssetBundle,
    pub spec: TxSpec,
    pub settled: Option<TxHash>,
}

impl LockPlan {
    pub fn phase(&self) -> LockPhase {
        self.phases.last().copied().unwrap_or(LockPhase::Idle)
    }

    pub fn voting_power(&self) -> u128 {
        self.record.voting_power
    }
}

impl Plan for LockPlan {
    fn spec(&self) -> &TxSpec {
        &self.spec
    }

    fn mark_settled(&mut self, tx_hash: TxHash) {
        self.phases.push(LockPhase::Settled);
        self.settled = Some(tx_hash);
    }

    fn mark_failed(&mut self) {
        self.phases.push(LockPhase::Failed);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnlockPlan {
    pub phases: Vec<UnlockPhase>,
    /// The locked output being spent.
    pub locked: OutRef,
    /// The receipt the caller presented.
    pub receipt: AssetId,
    pub record: LockRecord,
    /// Non-fatal findings, such as a receipt that disagrees with the record.
    pub warnings: Vec<LockerError>,
    pub spec: TxSpec,
    pub settled: Option<TxHash>,
}

impl UnlockPlan {
    pub fn phase(&self) -> UnlockPhase {
        self.phases.last().copied().unwrap_or(UnlockPhase::Idle)
    }
}

impl Plan for UnlockPlan {
    fn spec(&self) -> &TxSpec {
        &self.spec
    }

    fn mark_settled(&mut self, tx_hash: TxHash) {
        self.phases.push(UnlockPhase::Settled);
        self.settled = Some(tx_hash);
    }

    fn mark_failed(&mut self) {
        self.phases.push(UnlockPhase::Failed);
    }
}

/// Plans deposits and redemptions for one power configuration.
#[derive(Clone, Debug)]
pub struct Locker {
    scripts: LockerScripts,
    params: LedgerParams,
    strict_receipt_check: bool,
}

impl Locker {
    pub fn new(templates: &ScriptTemplates, config: PowerConfig, network: NetworkId) -> Self {
        Self {
            scripts: LockerScripts::derive(templates, config, network),
            params: LedgerParams::default(),
            strict_receipt_check: false,
        }
    }

    pub fn with_params(mut self, params: LedgerParams) -> Self {
        self.params = params;
        self
    }

    /// Fail an unlock whose receipt disagrees with the lock record instead
    /// of only warning.
    pub fn with_strict_receipt_check(mut self, strict: bool) -> Self {
        self.strict_receipt_check = strict;
        self
    }

    pub fn scripts(&self) -> &LockerScripts {
        &self.scripts
    }

    pub fn config(&self) -> &PowerConfig {
        &self.scripts.config
    }

    pub fn params(&self) -> &LedgerParams {
        &self.params
    }

    // ── Lock ────────────────────────────────────────────────────────────

    /// Plan a deposit of `deposit` from `snapshot`, owned by `wallet`.
    pub fn plan_lock(
        &self,
        wallet: &WalletAddress,
        snapshot: &[SpendableOutput],
        deposit: &AssetBundle,
    ) -> Result<LockPlan, LockerError> {
        let mut phases = vec![LockPhase::Idle];
        match self.build_lock(&mut phases, wallet, snapshot, deposit) {
            Ok(plan) => Ok(plan),
            Err(e) => {
                let phase = phases.last().copied().unwrap_or(LockPhase::Idle);
                tracing::warn!(?phase, error = %e, retryable = e.is_retryable(), "lock planning failed");
                Err(e)
            }
        }
    }

    fn build_lock(
        &self,
        phases: &mut Vec<LockPhase>,
        wallet: &WalletAddress,
        snapshot: &[SpendableOutput],
        deposit: &AssetBundle,
    ) -> Result<LockPlan, LockerError> {
        phases.push(LockPhase::Selecting);
        let selection = select(snapshot, deposit, &self.params)?;

        phases.push(LockPhase::Evaluating);
        let config = self.config();
        let voting_power = config.evaluate(deposit)?;
        let minted_power = i128::try_from(voting_power)
            .map_err(|_| LockerError::Overflow(format!("voting power {voting_power}")))?;
        if voting_power == 0 {
            tracing::warn!(
                mode = %config.mode,
                "deposit carries zero voting power; minting zero power tokens"
            );
        }
        if config.mode == AggregationMode::Multiply {
            tracing::debug!("multiplicative aggregation starts from zero");
        }

        phases.push(LockPhase::Assembling);
        let identity = ReceiptIdentity::derive(&selection.first_input().out_ref);
        let receipt = self.scripts.receipt_asset(&identity);
        let record = LockRecord::new(identity, voting_power);

        let mut locked = deposit.clone();
        locked.add(receipt.clone(), 1)?;

        let mint = Mint {
            assets: BTreeMap::from([
                (receipt.clone(), RECEIPTS_PER_LOCK),
                (self.scripts.power_token(), minted_power),
            ]),
            redeemer: MintRedeemer::Lock.to_plutus_data(),
        };

        let spec = TxSpec {
            inputs: selection
                .inputs
                .iter()
                .map(|o| TxInput::Wallet { out_ref: o.out_ref })
                .collect(),
            outputs: vec![TxOutput {
                address: self.scripts.locker_address.clone(),
                assets: locked,
                datum: Some(record.to_plutus_data()),
            }],
            mint: Some(mint),
            scripts: vec![AttachedScript::new(ScriptRole::MintingPolicy, &self.scripts.minter)],
            change_address: wallet.clone(),
            balancing: Balancing::FixedInputs,
        };

        tracing::info!(
            %identity,
            voting_power,
            inputs = selection.inputs.len(),
            locker = %self.scripts.locker_address,
            "lock planned"
        );

        Ok(LockPlan {
            phases: std::mem::take(phases),
            inputs: selection.out_refs(),
            receipt,
            record,
            change: selection.change,
            spec,
            settled: None,
        })
    }

    // ── Unlock ──────────────────────────────────────────────────────────

    /// Plan the redemption of `receipt`, given the locker outputs holding it.
    pub fn plan_unlock(
        &self,
        wallet: &WalletAddress,
        receipt: &AssetId,
        located: &[SpendableOutput],
    ) -> Result<UnlockPlan, LockerError> {
        let mut phases = vec![UnlockPhase::Idle];
        match self.build_unlock(&mut phases, wallet, receipt, located) {
            Ok(plan) => Ok(plan),
            Err(e) => {
                let phase = phases.last().copied().unwrap_or(UnlockPhase::Idle);
                tracing::warn!(?phase, %receipt, error = %e, "unlock planning failed");
                Err(e)
            }
        }
    }

    fn build_unlock(
        &self,
        phases: &mut Vec<UnlockPhase>,
        wallet: &WalletAddress,
        receipt: &AssetId,
        located: &[SpendableOutput],
    ) -> Result<UnlockPlan, LockerError> {
        phases.push(UnlockPhase::Locating);
        let output = located
            .first()
            .ok_or_else(|| LockerError::ReceiptNotFound(receipt.to_string()))?;
        if located.len() > 1 {
            tracing::debug!(%receipt, found = located.len(), "several locked outputs hold the receipt; using the first");
        }

        phases.push(UnlockPhase::Verifying);
        let record = read_lock_record(output)?;
        let expected = self.scripts.receipt_asset(&record.identity);
        let mut warnings = Vec::new();
        if &expected != receipt {
            let mismatch = LockerError::ReceiptMismatch {
                presented: receipt.to_string(),
                expected: expected.to_string(),
            };
            if self.strict_receipt_check {
                return Err(mismatch);
            }
            tracing::warn!(%receipt, %expected, "receipt does not match the lock record");
            warnings.push(mismatch);
        }

        phases.push(UnlockPhase::Assembling);
        let burned_power = i128::try_from(record.voting_power)
            .map_err(|_| LockerError::Overflow(format!("voting power {}", record.voting_power)))?;
        let mint = Mint {
            assets: BTreeMap::from([
                (receipt.clone(), -RECEIPTS_PER_LOCK),
                (self.scripts.power_token(), -burned_power),
            ]),
            redeemer: MintRedeemer::Unlock.to_plutus_data(),
        };

        let mut must_cover = AssetBundle::new();
        must_cover.set(receipt.clone(), 1);

        let spec = TxSpec {
            inputs: vec![TxInput::Script {
                out_ref: output.out_ref,
                redeemer: spend_redeemer(),
            }],
            outputs: Vec::new(),
            mint: Some(mint),
            scripts: vec![
                AttachedScript::new(ScriptRole::SpendingValidator, &self.scripts.locker),
                AttachedScript::new(ScriptRole::MintingPolicy, &self.scripts.minter),
            ],
            change_address: wallet.clone(),
            balancing: Balancing::WalletSelects { must_cover },
        };

        tracing::info!(
            %receipt,
            locked = %output.out_ref,
            voting_power = record.voting_power,
            warnings = warnings.len(),
            "unlock planned"
        );

        Ok(UnlockPlan {
            phases: std::mem::take(phases),
            locked: output.out_ref,
            receipt: receipt.clone(),
            record,
            warnings,
            spec,
            settled: None,
        })
    }

    // ── Collaborator-facing wrappers ────────────────────────────────────

    pub async fn lock<W: WalletSource>(
        &self,
        wallet: &W,
        deposit: &AssetBundle,
    ) -> Result<LockPlan, LockerError> {
        let address = wallet.address().await?;
        let snapshot = wallet.spendable_outputs().await?;
        tracing::debug!(%address, outputs = snapshot.len(), "fetched wallet snapshot");
        self.plan_lock(&address, &snapshot, deposit)
    }

    pub async fn unlock<W: WalletSource, L: LedgerQuery>(
        &self,
        wallet: &W,
        ledger: &L,
        receipt: &AssetId,
    ) -> Result<UnlockPlan, LockerError> {
        let address = wallet.address().await?;
        let located = ledger
            .outputs_at_with_unit(&self.scripts.locker_address, receipt)
            .await?;
        tracing::debug!(%receipt, found = located.len(), "queried locker outputs");
        self.plan_unlock(&address, receipt, &located)
    }

    /// Hand `plan` to `sink` and record the outcome in its phase history.
    pub async fn settle<S: SettlementSink, P: Plan>(
        &self,
        sink: &S,
        plan: &mut P,
    ) -> Result<TxHash, LockerError> {
        match sink.sign_and_submit(plan.spec()).await {
            Ok(tx_hash) => {
                plan.mark_settled(tx_hash);
                tracing::info!(%tx_hash, "settlement submitted");
                Ok(tx_hash)
            }
            Err(e) => {
                plan.mark_failed();
                tracing::warn!(error = %e, "settlement failed");
                Err(e.into())
            }
        }
    }

    /// Receipts of this configuration held by `address`.
    pub async fn redeemable_receipts<L: LedgerQuery>(
        &self,
        ledger: &L,
        address: &WalletAddress,
    ) -> Result<Vec<AssetId>, LockerError> {
        let holdings = ledger.holdings(address).await?;
        Ok(discover_receipts(&holdings, &self.scripts.policy_id))
    }
}

fn read_lock_record(output: &SpendableOutput) -> Result<LockRecord, LockerError> {
    let invalid = |reason: String| LockerError::InvalidLockRecord {
        out_ref: output.out_ref,
        reason,
    };
    let datum = output
        .datum
        .as_deref()
        .ok_or_else(|| invalid("output carries no inline datum".into()))?;
    let data = PlutusData::from_cbor(datum).map_err(|e| invalid(e.to_string()))?;
    LockRecord::from_plutus_data(&data).map_err(|e| invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripts::{PlutusVersion, ScriptTemplate};
    use agora_power::{AssetSelector, WeightConfig, WeightEntry};
    use agora_types::{AssetName, TxHash};

    fn templates() -> ScriptTemplates {
        ScriptTemplates {
            minter: ScriptTemplate::new(PlutusVersion::V2, vec![0xaa; 16]),
            locker: ScriptTemplate::new(PlutusVersion::V2, vec![0xbb; 16]),
        }
    }

    fn wallet() -> WalletAddress {
        WalletAddress::new("addr_test1qdepositor").unwrap()
    }

    fn utxo(tx: u8, index: u32, base: u128) -> SpendableOutput {
        SpendableOutput::new(
            OutRef::new(TxHash::new([tx; 32]), index),
            wallet(),
            AssetBundle::base(base),
        )
    }

    fn locker() -> Locker {
        Locker::new(&templates(), PowerConfig::base_sum(), NetworkId::Preprod)
    }

    #[test]
    fn lock_plan_walks_every_phase() {
        let plan = locker()
            .plan_lock(&wallet(), &[utxo(1, 0, 20_000_000)], &AssetBundle::base(5_000_000))
            .unwrap();
        assert_eq!(
            plan.phases,
            vec![
                LockPhase::Idle,
                LockPhase::Selecting,
                LockPhase::Evaluating,
                LockPhase::Assembling
            ]
        );
        assert_eq!(plan.phase(), LockPhase::Assembling);
    }

    #[test]
    fn lock_mints_two_receipts_and_the_power() {
        let locker = locker();
        let plan = locker
            .plan_lock(&wallet(), &[utxo(1, 0, 20_000_000)], &AssetBundle::base(5_000_000))
            .unwrap();
        let mint = plan.spec.mint.as_ref().unwrap();
        assert_eq!(mint.quantity(&plan.receipt), 2);
        assert_eq!(mint.quantity(&locker.scripts().power_token()), 5_000_000);
        assert_eq!(mint.redeemer, MintRedeemer::Lock.to_plutus_data());
        assert_eq!(plan.voting_power(), 5_000_000);
    }

    #[test]
    fn locked_output_carries_deposit_receipt_and_record() {
        let locker = locker();
        let plan = locker
            .plan_lock(&wallet(), &[utxo(1, 0, 20_000_000)], &AssetBundle::base(5_000_000))
            .unwrap();
        let output = &plan.spec.outputs[0];
        assert_eq!(output.address, locker.scripts().locker_address);
        assert_eq!(output.assets.base_quantity(), 5_000_000);
        assert_eq!(output.assets.get(&plan.receipt), 1);
        let record =
            LockRecord::from_plutus_data(output.datum.as_ref().unwrap()).unwrap();
        assert_eq!(record, plan.record);
        assert_eq!(plan.spec.balancing, Balancing::FixedInputs);
    }

    #[test]
    fn identity_comes_from_first_canonical_input() {
        // The scan takes 9#0 first (smaller), but 1#0 sorts first by reference.
        let snapshot = [utxo(9, 0, 2_000_000), utxo(1, 0, 8_000_000)];
        let plan = locker()
            .plan_lock(&wallet(), &snapshot, &AssetBundle::base(7_000_000))
            .unwrap();
        let expected = ReceiptIdentity::derive(&OutRef::new(TxHash::new([1; 32]), 0));
        assert_eq!(plan.record.identity, expected);
        assert_eq!(plan.spec.input_refs(), plan.inputs);
    }

    #[test]
    fn insufficient_funds_is_retryable() {
        let err = locker()
            .plan_lock(&wallet(), &[utxo(1, 0, 1_000_000)], &AssetBundle::base(10_000_000))
            .unwrap_err();
        assert!(matches!(err, LockerError::InsufficientFunds { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn multiply_mode_mints_zero_power() {
        let config = PowerConfig::new(
            AggregationMode::Multiply,
            WeightConfig::new(vec![WeightEntry::new(1, AssetSelector::base())]).unwrap(),
        );
        let locker = Locker::new(&templates(), config, NetworkId::Preprod);
        let plan = locker
            .plan_lock(&wallet(), &[utxo(1, 0, 20_000_000)], &AssetBundle::base(5_000_000))
            .unwrap();
        let mint = plan.spec.mint.as_ref().unwrap();
        assert_eq!(plan.voting_power(), 0);
        assert!(mint.assets.contains_key(&locker.scripts().power_token()));
        assert_eq!(mint.quantity(&locker.scripts().power_token()), 0);
    }

    fn locked_output(record: &LockRecord, receipt: &AssetId, locker: &Locker) -> SpendableOutput {
        let mut assets = AssetBundle::base(5_000_000);
        assets.set(receipt.clone(), 1);
        SpendableOutput::new(
            OutRef::new(TxHash::new([0x77; 32]), 0),
            locker.scripts().locker_address.clone(),
            assets,
        )
        .with_datum(record.to_plutus_data().to_cbor())
    }

    #[test]
    fn unlock_burns_from_the_record() {
        let locker = locker();
        let identity = ReceiptIdentity::new([5; 32]);
        let receipt = locker.scripts().receipt_asset(&identity);
        let record = LockRecord::new(identity, 5_000_000);
        let located = [locked_output(&record, &receipt, &locker)];

        let plan = locker.plan_unlock(&wallet(), &receipt, &located).unwrap();
        let mint = plan.spec.mint.as_ref().unwrap();
        assert_eq!(mint.quantity(&receipt), -2);
        assert_eq!(mint.quantity(&locker.scripts().power_token()), -5_000_000);
        assert_eq!(mint.redeemer, MintRedeemer::Unlock.to_plutus_data());
        assert!(plan.warnings.is_empty());
        assert_eq!(plan.spec.scripts.len(), 2);
        assert_eq!(
            plan.spec.inputs,
            vec![TxInput::Script {
                out_ref: located[0].out_ref,
                redeemer: spend_redeemer()
            }]
        );
        assert_eq!(
            plan.phases,
            vec![
                UnlockPhase::Idle,
                UnlockPhase::Locating,
                UnlockPhase::Verifying,
                UnlockPhase::Assembling
            ]
        );
    }

    #[test]
    fn unlock_without_located_output_is_not_found() {
        let receipt = locker().scripts().receipt_asset(&ReceiptIdentity::new([1; 32]));
        let err = locker().plan_unlock(&wallet(), &receipt, &[]).unwrap_err();
        assert!(matches!(err, LockerError::ReceiptNotFound(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn mismatch_warns_unless_strict() {
        let locker = locker();
        let record = LockRecord::new(ReceiptIdentity::new([5; 32]), 42);
        let presented = locker.scripts().receipt_asset(&ReceiptIdentity::new([6; 32]));
        let located = [locked_output(&record, &presented, &locker)];

        let plan = locker.plan_unlock(&wallet(), &presented, &located).unwrap();
        assert!(matches!(plan.warnings[..], [LockerError::ReceiptMismatch { .. }]));
        // The presented receipt is what gets burned.
        assert_eq!(plan.spec.mint.as_ref().unwrap().quantity(&presented), -2);

        let strict = locker.with_strict_receipt_check(true);
        let err = strict.plan_unlock(&wallet(), &presented, &located).unwrap_err();
        assert!(matches!(err, LockerError::ReceiptMismatch { .. }));
    }

    #[test]
    fn missing_or_garbled_datum_is_invalid_record() {
        let locker = locker();
        let receipt = AssetId::native(locker.scripts().policy_id, AssetName::from([5; 32]));
        let bare = SpendableOutput::new(
            OutRef::new(TxHash::new([2; 32]), 0),
            locker.scripts().locker_address.clone(),
            AssetBundle::base(2_000_000),
        );
        let garbled = bare.clone().with_datum(vec![0xff, 0x00]);
        for output in [bare, garbled] {
            let err = locker.plan_unlock(&wallet(), &receipt, &[output]).unwrap_err();
            assert!(matches!(err, LockerError::InvalidLockRecord { .. }));
        }
    }
}
