//! Receipt identities and receipt discovery.

use agora_crypto::blake2b_256;
use agora_plutus::ToPlutusData;
use agora_types::{AssetId, AssetName, Holding, OutRef, PolicyId};
use std::fmt;

use crate::scripts::POWER_TOKEN_NAME;

/// Blake2b-256 digest of an output reference's on-chain encoding.
///
/// Names the receipt token minted by a lock and is stored in the lock record.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReceiptIdentity([u8; 32]);

impl ReceiptIdentity {
    pub const LEN: usize = 32;

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Identity of a lock whose first canonical input is `out_ref`.
    pub fn derive(out_ref: &OutRef) -> Self {
        Self(blake2b_256(&out_ref.to_plutus_data().to_cbor()))
    }

    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; 32]>::try_from(bytes).ok().map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn asset_name(&self) -> AssetName {
        AssetName::from(self.0)
    }
}

impl fmt::Debug for ReceiptIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReceiptIdentity({})", hex::encode(self.0))
    }
}

impl fmt::Display for ReceiptIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Whether `quantity` of `asset` looks like a redeemable receipt of `policy`:
/// exactly one unit, a 32-byte name, and not the power token.
pub fn is_receipt(asset: &AssetId, quantity: u128, policy: &PolicyId) -> bool {
    match asset {
        AssetId::Native { policy: p, name } => {
            p == policy
                && quantity == 1
                && name.len() == ReceiptIdentity::LEN
                && name.as_bytes() != POWER_TOKEN_NAME
        }
        AssetId::Base => false,
    }
}

/// Receipt tokens of `policy` among `holdings`, in holding order.
pub fn discover_receipts(holdings: &[Holding], policy: &PolicyId) -> Vec<AssetId> {
    let receipts: Vec<AssetId> = holdings
        .iter()
        .filter(|h| is_receipt(&h.unit, h.quantity, policy))
        .map(|h| h.unit.clone())
        .collect();
    tracing::debug!(%policy, holdings = holdings.len(), receipts = receipts.len(), "discovered receipts");
    receipts
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_types::TxHash;

    fn policy() -> PolicyId {
        PolicyId::new([0x11; 28])
    }

    #[test]
    fn identity_is_deterministic() {
        let out_ref = OutRef::new(TxHash::new([0xab; 32]), 3);
        assert_eq!(ReceiptIdentity::derive(&out_ref), ReceiptIdentity::derive(&out_ref));
    }

    #[test]
    fn identity_hashes_the_out_ref_encoding() {
        let out_ref = OutRef::new(TxHash::new([0xab; 32]), 0);
        let cbor = hex::decode(format!("d8799fd8799f5820{}ff00ff", "ab".repeat(32))).unwrap();
        assert_eq!(ReceiptIdentity::derive(&out_ref).as_bytes(), &blake2b_256(&cbor));
    }

    #[test]
    fn index_changes_identity() {
        let hash = TxHash::new([7; 32]);
        assert_ne!(
            ReceiptIdentity::derive(&OutRef::new(hash, 0)),
            ReceiptIdentity::derive(&OutRef::new(hash, 1))
        );
    }

    #[test]
    fn receipt_filter() {
        let receipt = AssetId::native(policy(), AssetName::from([0x42; 32]));
        let power = AssetId::native(policy(), AssetName::new(POWER_TOKEN_NAME).unwrap());
        let foreign = AssetId::native(PolicyId::new([0x22; 28]), AssetName::from([0x42; 32]));
        let short = AssetId::native(policy(), AssetName::new(vec![1; 31]).unwrap());
        let holdings = vec![
            Holding::new(AssetId::Base, 10_000_000),
            Holding::new(receipt.clone(), 1),
            Holding::new(power, 1),
            Holding::new(foreign, 1),
            Holding::new(short, 1),
            Holding::new(AssetId::native(policy(), AssetName::from([0x43; 32])), 2),
        ];
        assert_eq!(discover_receipts(&holdings, &policy()), vec![receipt]);
    }

    #[test]
    fn from_slice_requires_32_bytes() {
        assert!(ReceiptIdentity::from_slice(&[0; 32]).is_some());
        assert!(ReceiptIdentity::from_slice(&[0; 31]).is_none());
    }
}
