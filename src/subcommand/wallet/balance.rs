use super::*;

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Output {
  pub address: Address<NetworkUnchecked>,
  pub balance: u64,
}

impl From<&Wallet> for Output {
  fn from(wallet: &Wallet) -> Self {
    Self {
      address: wallet.address().as_unchecked().clone(),
      balance: wallet.balance().to_sat(),
    }
  }
}

pub(crate) fn run(settings: Settings) -> SubcommandResult {
  Ok(Some(Box::new(Output::from(
    &settings.ledger_store()?.load()?,
  ))))
}
