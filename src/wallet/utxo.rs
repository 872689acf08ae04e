use super::*;

/// A spendable output owned by the wallet.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Utxo {
  pub txid: Txid,
  pub vout: u32,
  pub script: ScriptBuf,
  #[serde(with = "bitcoin::amount::serde::as_sat")]
  pub satoshis: Amount,
}

impl Utxo {
  pub fn outpoint(&self) -> OutPoint {
    OutPoint {
      txid: self.txid,
      vout: self.vout,
    }
  }
}
