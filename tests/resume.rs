use super::*;

#[test]
fn nothing_pending() {
  CommandBuilder::new("resume")
    .expected_stderr("no pending transactions\n")
    .run();
}

#[test]
fn pending_transactions_take_over_other_commands() {
  let transactions = inscribe("text/plain", b"hello");

  let pending = serde_json::to_string(
    &transactions
      .iter()
      .map(consensus::encode::serialize_hex)
      .collect::<Vec<String>>(),
  )
  .unwrap();

  CommandBuilder::new("--regtest --rpc-url 127.0.0.1:1 wallet balance")
    .ledger(&funded_wallet(&[10_000_000]))
    .write("pending-txs.json", pending)
    .expected_exit_code(1)
    .stderr_regex(
      "found pending transactions, rebroadcasting\nerror: failed to connect to Bitcoin Core RPC at `127.0.0.1:1`\n.*",
    )
    .run();
}

#[test]
fn corrupt_recovery_record() {
  CommandBuilder::new("resume")
    .write("pending-txs.json", "not json")
    .expected_exit_code(1)
    .stderr_regex("error: failed to parse recovery record at `pending-txs.json`\n.*")
    .run();
}
