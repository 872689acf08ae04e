use super::*;

#[test]
fn new_wallet_prints_address() {
  let tempdir = Arc::new(TempDir::new().unwrap());

  let output = CommandBuilder::new("--regtest wallet new")
    .temp_dir(tempdir.clone())
    .run_and_deserialize_output::<pepinals::subcommand::wallet::new::Output>();

  let address = output.address.require_network(Network::Regtest).unwrap();

  let ledger = LedgerStore::new(tempdir.path().join(".wallet.json"), Chain::Regtest)
    .load()
    .unwrap();

  assert_eq!(ledger.address(), &address);
  assert!(ledger.utxos().is_empty());
}

#[test]
fn new_wallet_does_not_overwrite_ledger() {
  let tempdir = Arc::new(TempDir::new().unwrap());

  CommandBuilder::new("--regtest wallet new")
    .temp_dir(tempdir.clone())
    .stdout_regex(".*")
    .run();

  let before = fs::read_to_string(tempdir.path().join(".wallet.json")).unwrap();

  CommandBuilder::new("--regtest wallet new")
    .temp_dir(tempdir.clone())
    .expected_exit_code(1)
    .expected_stderr("error: wallet ledger already exists at `.wallet.json`\n")
    .run();

  assert_eq!(
    fs::read_to_string(tempdir.path().join(".wallet.json")).unwrap(),
    before
  );
}

#[test]
fn balance() {
  let wallet = funded_wallet(&[1000, 2000]);

  pretty_assert_eq!(
    CommandBuilder::new("--regtest wallet balance")
      .ledger(&wallet)
      .run_and_deserialize_output::<balance::Output>(),
    balance::Output {
      address: wallet.address().as_unchecked().clone(),
      balance: 3000,
    }
  );
}

#[test]
fn balance_from_configured_ledger_path() {
  let wallet = funded_wallet(&[5000]);

  let tempdir = Arc::new(TempDir::new().unwrap());

  LedgerStore::new(tempdir.path().join("ledger.json"), Chain::Regtest)
    .save(&wallet)
    .unwrap();

  let output = CommandBuilder::new("--regtest --wallet ledger.json wallet balance")
    .temp_dir(tempdir)
    .run_and_deserialize_output::<balance::Output>();

  assert_eq!(output.balance, 5000);
}

#[test]
fn balance_without_ledger() {
  CommandBuilder::new("--regtest wallet balance")
    .expected_exit_code(1)
    .expected_stderr("error: no wallet ledger at `.wallet.json`, create one with `wallet new`\n")
    .run();
}

#[test]
fn ledger_on_other_chain_is_rejected() {
  CommandBuilder::new("wallet balance")
    .ledger(&funded_wallet(&[1000]))
    .expected_exit_code(1)
    .stderr_regex("error: wallet ledger at `.wallet.json` is inconsistent: .*")
    .run();
}

#[test]
fn yaml_output() {
  let wallet = funded_wallet(&[1000]);

  CommandBuilder::new("--regtest --format yaml wallet balance")
    .ledger(&wallet)
    .stdout_regex(format!("address: {}\nbalance: 1000\n\n", wallet.address()))
    .run();
}
