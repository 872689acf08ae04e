use super::*;

/// Parse a raw transaction from hex.
pub fn decode_transaction(hex: &str) -> SnafuResult<Transaction> {
  let bytes = hex::decode(hex.trim()).snafu_context(error::TransactionHex)?;
  consensus::deserialize(&bytes).snafu_context(error::TransactionDecode)
}

/// Recovery record: the raw transactions of a chain that have not been
/// broadcast yet, as a JSON array of hex strings.
#[derive(Debug, Clone)]
pub struct PendingStore {
  path: PathBuf,
}

impl PendingStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn exists(&self) -> bool {
    self.path.exists()
  }

  pub fn save(&self, transactions: &[Transaction]) -> SnafuResult {
    let hex = transactions
      .iter()
      .map(consensus::encode::serialize_hex)
      .collect::<Vec<String>>();

    let json = serde_json::to_vec(&hex)
      .map_err(io::Error::from)
      .snafu_context(error::Io {
        path: self.path.clone(),
      })?;

    ledger_store::write_atomically(&self.path, &json)?;

    log::info!(
      "saved {} pending transactions to {}",
      transactions.len(),
      self.path.display()
    );

    Ok(())
  }

  /// The pending transactions, or `None` if there is no recovery record.
  pub fn load(&self) -> SnafuResult<Option<Vec<Transaction>>> {
    if !self.exists() {
      return Ok(None);
    }

    let json = fs::read_to_string(&self.path).snafu_context(error::Io {
      path: self.path.clone(),
    })?;

    let hex = serde_json::from_str::<Vec<String>>(&json).snafu_context(error::PendingParse {
      path: self.path.clone(),
    })?;

    hex
      .iter()
      .enumerate()
      .map(|(index, hex)| {
        decode_transaction(hex).snafu_context(error::PendingTransaction {
          path: self.path.clone(),
          index,
        })
      })
      .collect::<SnafuResult<Vec<Transaction>>>()
      .map(Some)
  }

  pub fn clear(&self) -> SnafuResult {
    match fs::remove_file(&self.path) {
      Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
      result => result.snafu_context(error::Io {
        path: self.path.clone(),
      }),
    }
  }
}

#[cfg(test)]
mod tests {
  use {super::*, tempfile::TempDir};

  #[test]
  fn save_load_clear() {
    let dir = TempDir::new().unwrap();

    let store = PendingStore::new(dir.path().join("pending-txs.json"));

    assert_eq!(store.load().unwrap(), None);

    let transactions = vec![
      spend(outpoint(1), Amount::from_sat(1000)),
      spend(outpoint(2), Amount::from_sat(2000)),
    ];

    store.save(&transactions).unwrap();

    assert!(store.exists());
    assert_eq!(store.load().unwrap(), Some(transactions.clone()));

    assert_eq!(
      serde_json::from_str::<Vec<String>>(&fs::read_to_string(store.path()).unwrap()).unwrap(),
      transactions
        .iter()
        .map(consensus::encode::serialize_hex)
        .collect::<Vec<String>>()
    );

    store.clear().unwrap();

    assert!(!store.exists());

    store.clear().unwrap();
  }

  #[test]
  fn invalid_transaction_is_reported_with_index() {
    let dir = TempDir::new().unwrap();

    let store = PendingStore::new(dir.path().join("pending-txs.json"));

    fs::write(
      store.path(),
      serde_json::to_string(&[
        consensus::encode::serialize_hex(&spend(outpoint(1), Amount::from_sat(1000))),
        "zz".to_string(),
      ])
      .unwrap(),
    )
    .unwrap();

    let err = store.load().unwrap_err();

    assert_matches!(err, SnafuError::PendingTransaction { index: 1, .. });
    assert_eq!(err.kind(), ErrorKind::CorruptLedger);
  }

  #[test]
  fn unparsable_record() {
    let dir = TempDir::new().unwrap();

    let store = PendingStore::new(dir.path().join("pending-txs.json"));

    fs::write(store.path(), "not json").unwrap();

    assert_matches!(store.load().unwrap_err(), SnafuError::PendingParse { .. });
  }

  #[test]
  fn decode_transaction_errors() {
    assert_matches!(decode_transaction("xyz"), Err(SnafuError::TransactionHex { .. }));
    assert_matches!(decode_transaction("00"), Err(SnafuError::TransactionDecode { .. }));
  }

  #[test]
  fn save_replaces_record_without_leaving_temporary_files() {
    let dir = TempDir::new().unwrap();

    let store = PendingStore::new(dir.path().join("pending-txs.json"));

    store
      .save(&[
        spend(outpoint(1), Amount::from_sat(1000)),
        spend(outpoint(2), Amount::from_sat(2000)),
      ])
      .unwrap();

    let tail = vec![spend(outpoint(2), Amount::from_sat(2000))];

    store.save(&tail).unwrap();

    assert_eq!(store.load().unwrap(), Some(tail));

    assert_eq!(
      fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect::<Vec<String>>(),
      ["pending-txs.json"]
    );
  }
}
