use {
  super::*,
  bitcoincore_rpc::{json::ScanTxOutRequest, jsonrpc, Client, RpcApi},
};

#[derive(Debug, Clone, Snafu)]
#[snafu(context(suffix(false)), visibility(pub(crate)))]
pub enum BlockchainError {
  #[snafu(display("transaction {txid} not found"))]
  NotFound { txid: Txid },
  #[snafu(display("node rejected request: {message} (code {code})"))]
  Rejected { code: i32, message: String },
  #[snafu(display("node unreachable: {message}"))]
  Unreachable { message: String },
}

impl BlockchainError {
  /// Transport failures may succeed on a later attempt, rejections will not.
  pub fn is_transient(&self) -> bool {
    matches!(self, Self::Unreachable { .. })
  }
}

impl From<bitcoincore_rpc::Error> for BlockchainError {
  fn from(err: bitcoincore_rpc::Error) -> Self {
    match err {
      bitcoincore_rpc::Error::JsonRpc(jsonrpc::Error::Rpc(err)) => Self::Rejected {
        code: err.code,
        message: err.message,
      },
      err => Self::Unreachable {
        message: err.to_string(),
      },
    }
  }
}

/// Query and broadcast capability of a node.
pub trait Blockchain: Send + Sync {
  fn list_unspent(&self, address: &Address) -> Result<Vec<Utxo>, BlockchainError>;

  fn broadcast(&self, transaction: &Transaction) -> Result<Txid, BlockchainError>;

  fn get_transaction(&self, txid: Txid) -> Result<Transaction, BlockchainError>;
}

const RPC_INVALID_ADDRESS_OR_KEY: i32 = -5;
const RPC_VERIFY_ALREADY_IN_CHAIN: i32 = -27;

impl Blockchain for Client {
  /// Uses `scantxoutset`, so the node needs no wallet tracking the address.
  fn list_unspent(&self, address: &Address) -> Result<Vec<Utxo>, BlockchainError> {
    let result =
      self.scan_tx_out_set_blocking(&[ScanTxOutRequest::Single(format!("addr({address})"))])?;

    Ok(
      result
        .unspents
        .into_iter()
        .map(|utxo| Utxo {
          txid: utxo.txid,
          vout: utxo.vout,
          script: utxo.script_pub_key,
          satoshis: utxo.amount,
        })
        .collect(),
    )
  }

  /// A transaction the node already has in a block counts as broadcast, so
  /// resubmitting a recovery record is harmless.
  fn broadcast(&self, transaction: &Transaction) -> Result<Txid, BlockchainError> {
    match self.send_raw_transaction(transaction) {
      Ok(txid) => Ok(txid),
      Err(bitcoincore_rpc::Error::JsonRpc(jsonrpc::Error::Rpc(err)))
        if err.code == RPC_VERIFY_ALREADY_IN_CHAIN =>
      {
        log::info!("transaction {} already confirmed", transaction.compute_txid());
        Ok(transaction.compute_txid())
      }
      Err(err) => Err(err.into()),
    }
  }

  fn get_transaction(&self, txid: Txid) -> Result<Transaction, BlockchainError> {
    match self.get_raw_transaction(&txid, None) {
      Ok(transaction) => Ok(transaction),
      Err(bitcoincore_rpc::Error::JsonRpc(jsonrpc::Error::Rpc(err)))
        if err.code == RPC_INVALID_ADDRESS_OR_KEY =>
      {
        Err(BlockchainError::NotFound { txid })
      }
      Err(err) => Err(err.into()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rpc_errors_are_rejections() {
    let err = BlockchainError::from(bitcoincore_rpc::Error::JsonRpc(jsonrpc::Error::Rpc(
      jsonrpc::error::RpcError {
        code: -26,
        message: "mandatory-script-verify-flag-failed".into(),
        data: None,
      },
    )));

    assert!(!err.is_transient());
    assert_eq!(
      err.to_string(),
      "node rejected request: mandatory-script-verify-flag-failed (code -26)"
    );
  }

  #[test]
  fn other_errors_are_transient() {
    let err = BlockchainError::from(bitcoincore_rpc::Error::ReturnedError("timeout".into()));

    assert!(err.is_transient());
  }
}
