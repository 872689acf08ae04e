use super::*;

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Output {
  pub address: Address<NetworkUnchecked>,
}

pub(crate) fn run(settings: Settings) -> SubcommandResult {
  let ledger = settings.ledger_store()?;

  let wallet = Wallet::generate(settings.chain());

  ledger.create(&wallet)?;

  log::info!("created wallet ledger at {}", ledger.path().display());

  Ok(Some(Box::new(Output {
    address: wallet.address().as_unchecked().clone(),
  })))
}
