use super::*;

pub(crate) fn run(settings: Settings) -> SubcommandResult {
  let ledger = settings.ledger_store()?;

  let client = settings.bitcoin_rpc_client()?;

  let wallet = sync(&client, &ledger)?;

  Ok(Some(Box::new(balance::Output::from(&wallet))))
}

fn sync(blockchain: &dyn Blockchain, ledger: &LedgerStore) -> SnafuResult<Wallet> {
  let mut wallet = ledger.load()?;

  eprintln!("syncing outputs of {}", wallet.address());

  let utxos = blockchain
    .list_unspent(wallet.address())
    .snafu_context(error::Blockchain)?;

  wallet.replace_utxos(utxos);

  ledger.save(&wallet)?;

  Ok(wallet)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ledger_is_replaced_with_unspent_outputs() {
    let tempdir = tempfile::TempDir::new().unwrap();

    let ledger = LedgerStore::new(tempdir.path().join(".wallet.json"), Chain::Regtest);

    ledger.save(&funded_wallet(&[1000, 2000])).unwrap();

    let blockchain = MockBlockchain::default();

    let utxo = Utxo {
      txid: txid(7),
      vout: 3,
      script: wallet().script_pubkey(),
      satoshis: Amount::from_sat(50_000),
    };

    blockchain.add_unspent(utxo.clone());

    blockchain.add_unspent(Utxo {
      txid: txid(8),
      vout: 0,
      script: recipient().script_pubkey(),
      satoshis: Amount::from_sat(60_000),
    });

    let wallet = sync(&blockchain, &ledger).unwrap();

    assert_eq!(wallet.utxos(), [utxo]);
    assert_eq!(ledger.load().unwrap(), wallet);
    assert_eq!(
      balance::Output::from(&wallet),
      balance::Output {
        address: wallet.address().as_unchecked().clone(),
        balance: 50_000,
      }
    );
  }

  #[test]
  fn missing_ledger() {
    let tempdir = tempfile::TempDir::new().unwrap();

    let ledger = LedgerStore::new(tempdir.path().join(".wallet.json"), Chain::Regtest);

    assert_eq!(
      sync(&MockBlockchain::default(), &ledger)
        .unwrap_err()
        .kind(),
      ErrorKind::CorruptLedger
    );
  }
}
