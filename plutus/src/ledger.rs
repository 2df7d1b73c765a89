//! On-chain representations of ledger types.

use agora_types::{OutRef, TxHash};

use crate::data::{FromPlutusData, PlutusData, ToPlutusData};
use crate::error::PlutusError;

/// `OutputReference { transaction_id: TransactionId { hash }, output_index }`
impl ToPlutusData for OutRef {
    fn to_plutus_data(&self) -> PlutusData {
        PlutusData::constr(
            0,
            vec![
                PlutusData::constr(0, vec![PlutusData::bytes(self.tx_hash.as_bytes().to_vec())]),
                PlutusData::int(self.index),
            ],
        )
    }
}

impl FromPlutusData for OutRef {
    fn from_plutus_data(data: &PlutusData) -> Result<Self, PlutusError> {
        let fields = data.expect_constr(0, 2)?;
        let tx_id = fields[0].expect_constr(0, 1)?[0].expect_bytes()?;
        let tx_hash: [u8; 32] = tx_id
            .try_into()
            .map_err(|_| PlutusError::shape("32-byte transaction id", format!("{} bytes", tx_id.len())))?;
        let index = u32::try_from(fields[1].expect_int()?)
            .map_err(|_| PlutusError::shape("output index", "out of range integer"))?;
        Ok(OutRef::new(TxHash::new(tx_hash), index))
    }
}
