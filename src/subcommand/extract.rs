use super::*;

#[derive(Debug, Parser)]
pub(crate) struct Extract {
  #[arg(
    required = true,
    help = "Decode the inscription revealed by <TXIDS>, in chain order, starting with the inscription id."
  )]
  txids: Vec<Txid>,
}

impl Extract {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    let client = settings.bitcoin_rpc_client()?;

    Ok(Some(Box::new(decode::Output::from(extract(
      &client,
      &self.txids,
    )?))))
  }
}

/// Fetch reveal transactions and decode the inscription spread across them.
pub(crate) fn extract(blockchain: &dyn Blockchain, txids: &[Txid]) -> SnafuResult<Inscription> {
  let transactions = txids
    .iter()
    .map(|txid| {
      blockchain
        .get_transaction(*txid)
        .snafu_context(error::Blockchain)
    })
    .collect::<SnafuResult<Vec<Transaction>>>()?;

  Inscription::from_transactions(&transactions)
}
