use super::*;

pub mod balance;
pub mod new;
pub mod send;
pub mod split;
pub mod sync;

#[derive(Debug, Parser)]
pub(crate) enum WalletCommand {
  #[command(about = "Show wallet address and balance")]
  Balance,
  #[command(about = "Create a new wallet")]
  New,
  #[command(about = "Send sats, or sweep the whole balance when no amount is given")]
  Send(send::Send),
  #[command(about = "Split the balance into equal outputs")]
  Split(split::Split),
  #[command(about = "Replace the wallet's outputs with those the node reports as unspent")]
  Sync,
}

impl WalletCommand {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    match self {
      Self::Balance => balance::run(settings),
      Self::New => new::run(settings),
      Self::Send(send) => send.run(settings),
      Self::Split(split) => split.run(settings),
      Self::Sync => sync::run(settings),
    }
  }
}

/// Build a transaction from the wallet ledger and broadcast it.
fn send_transaction(
  settings: &Settings,
  build: impl FnOnce(&Wallet, FeeRate) -> SnafuResult<Transaction>,
) -> Result<Txid> {
  let ledger = settings.ledger_store()?;

  let wallet = ledger.load()?;

  let transaction = build(&wallet, settings.fee_rate()?)?;

  let txid = transaction.compute_txid();

  broadcast_all(settings, &ledger, &[transaction])?;

  Ok(txid)
}
