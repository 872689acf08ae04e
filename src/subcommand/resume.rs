use super::*;

pub(crate) fn run(settings: Settings) -> SubcommandResult {
  let pending = settings.pending_store()?;

  let Some(transactions) = pending.load()? else {
    eprintln!("no pending transactions");
    return Ok(None);
  };

  log::info!(
    "resuming {} pending transactions from {}",
    transactions.len(),
    pending.path().display()
  );

  let ledger = settings.ledger_store()?;

  Ok(Some(Box::new(broadcast_all(
    &settings,
    &ledger,
    &transactions,
  )?)))
}
