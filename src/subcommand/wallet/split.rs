use super::*;

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Output {
  pub txid: Txid,
}

#[derive(Debug, Parser)]
pub(crate) struct Split {
  #[arg(
    value_parser = clap::value_parser!(u64).range(1..),
    help = "Split the balance into <OUTPUTS> outputs to the wallet's own address."
  )]
  outputs: u64,
}

impl Split {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    let txid = send_transaction(&settings, |wallet, fee_rate| {
      transaction(wallet, self.outputs, fee_rate)
    })?;

    Ok(Some(Box::new(Output { txid })))
  }
}

/// Spend every wallet output into `outputs - 1` outputs of an equal share of
/// the balance, with the remainder less the fee as change.
fn transaction(wallet: &Wallet, outputs: u64, fee_rate: FeeRate) -> SnafuResult<Transaction> {
  let share = Amount::from_sat(wallet.balance().to_sat() / outputs.max(1));

  let script_pubkey = wallet.script_pubkey();

  let dust = script_pubkey.minimal_non_dust();

  if outputs > 1 && share < dust {
    return error::Dust { value: share, dust }.fail();
  }

  let outputs = (1..outputs)
    .map(|_| TxOut {
      value: share,
      script_pubkey: script_pubkey.clone(),
    })
    .collect();

  TransactionBuilder::new(wallet, outputs, fee_rate)
    .spend_all()
    .build_transaction()
}
