//! Lock record datum and the redeemers the locker scripts expect.

use agora_plutus::{FromPlutusData, PlutusData, PlutusError, ToPlutusData};

use crate::receipt::ReceiptIdentity;

/// Datum of a locked output: `{ receipt identity, voting power }`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockRecord {
    pub identity: ReceiptIdentity,
    pub voting_power: u128,
}

impl LockRecord {
    pub fn new(identity: ReceiptIdentity, voting_power: u128) -> Self {
        Self {
            identity,
            voting_power,
        }
    }
}

impl ToPlutusData for LockRecord {
    fn to_plutus_data(&self) -> PlutusData {
        // Plans reject powers beyond i128 before building a record.
        let power = i128::try_from(self.voting_power).unwrap_or(i128::MAX);
        PlutusData::constr(
            0,
            vec![
                PlutusData::bytes(self.identity.as_bytes().to_vec()),
                PlutusData::Int(power),
            ],
        )
    }
}

impl FromPlutusData for LockRecord {
    fn from_plutus_data(data: &PlutusData) -> Result<Self, PlutusError> {
        let fields = data.expect_constr(0, 2)?;
        let name = fields[0].expect_bytes()?;
        let identity = ReceiptIdentity::from_slice(name)
            .ok_or_else(|| PlutusError::shape("32-byte receipt name", format!("{} bytes", name.len())))?;
        let voting_power = u128::try_from(fields[1].expect_int()?)
            .map_err(|_| PlutusError::shape("non-negative voting power", "negative integer"))?;
        Ok(Self::new(identity, voting_power))
    }
}

/// Redeemer of the minting policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MintRedeemer {
    Lock,
    Unlock,
}

impl ToPlutusData for MintRedeemer {
    fn to_plutus_data(&self) -> PlutusData {
        match self {
            Self::Lock => PlutusData::unit(0),
            Self::Unlock => PlutusData::unit(1),
        }
    }
}

/// Redeemer for spending a locked output: a wrapper around an empty byte
/// string.
pub fn spend_redeemer() -> PlutusData {
    PlutusData::constr(0, vec![PlutusData::bytes(Vec::new())])
}
