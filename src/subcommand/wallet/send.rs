use super::*;

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Output {
  pub txid: Txid,
}

#[derive(Debug, Parser)]
pub(crate) struct Send {
  #[arg(help = "Send to <ADDRESS>.")]
  address: String,
  #[arg(help = "Send <AMOUNT> sats. Without it, sweep the whole balance minus the fee.")]
  amount: Option<u64>,
}

impl Send {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    let destination = settings.chain().address(&self.address)?;

    let amount = self.amount.map(Amount::from_sat);

    let txid = send_transaction(&settings, |wallet, fee_rate| {
      transaction(wallet, &destination, amount, fee_rate)
    })?;

    Ok(Some(Box::new(Output { txid })))
  }
}

fn transaction(
  wallet: &Wallet,
  destination: &Address,
  amount: Option<Amount>,
  fee_rate: FeeRate,
) -> SnafuResult<Transaction> {
  match amount {
    Some(value) => TransactionBuilder::new(
      wallet,
      vec![TxOut {
        value,
        script_pubkey: destination.script_pubkey(),
      }],
      fee_rate,
    )
    .build_transaction(),
    None => TransactionBuilder::new(wallet, Vec::new(), fee_rate)
      .change(destination.script_pubkey())
      .spend_all()
      .build_transaction(),
  }
}
