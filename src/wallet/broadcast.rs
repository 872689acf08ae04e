use super::*;

/// Bounded retries for transport failures, doubling the delay after each
/// attempt. Rejections by the node are never retried.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
  pub attempts: u32,
  pub backoff: Duration,
}

impl RetryPolicy {
  pub const DEFAULT_ATTEMPTS: u32 = 3;
  pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

  fn delay(self, attempt: u32) -> Duration {
    self
      .backoff
      .saturating_mul(2u32.saturating_pow(attempt))
  }
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      attempts: Self::DEFAULT_ATTEMPTS,
      backoff: Self::DEFAULT_BACKOFF,
    }
  }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Output {
  pub txids: Vec<Txid>,
  pub inscription: Option<Txid>,
}

/// Submits a chain of transactions in order, recording each one in the
/// wallet ledger once the node accepts it. If a submission fails, the
/// transactions not yet accepted are written to the recovery record.
pub struct Broadcaster<'a> {
  blockchain: &'a dyn Blockchain,
  ledger: &'a LedgerStore,
  pending: &'a PendingStore,
  retry: RetryPolicy,
  shutdown: &'a AtomicBool,
}

impl<'a> Broadcaster<'a> {
  pub fn new(
    blockchain: &'a dyn Blockchain,
    ledger: &'a LedgerStore,
    pending: &'a PendingStore,
    retry: RetryPolicy,
  ) -> Self {
    Self {
      blockchain,
      ledger,
      pending,
      retry,
      shutdown: &SHUTTING_DOWN,
    }
  }

  pub fn broadcast_all(&self, transactions: &[Transaction]) -> SnafuResult<Output> {
    let total = transactions.len();

    let mut txids = Vec::new();

    for (index, transaction) in transactions.iter().enumerate() {
      if self.shutdown.load(atomic::Ordering::Relaxed) {
        self.save_pending(&transactions[index..])?;
        return error::Interrupted { index, total }.fail();
      }

      eprintln!("broadcasting transaction {} of {total}", index + 1);

      let txid = match self.submit(transaction) {
        Ok(txid) => txid,
        Err(source) => {
          log::warn!("broadcast of transaction {} failed: {source}", index + 1);
          self.save_pending(&transactions[index..])?;
          return Err(SnafuError::Broadcast {
            index,
            total,
            source,
          });
        }
      };

      log::info!("broadcast transaction {txid}");

      if let Err(err) = self.record(transaction) {
        log::error!(
          "transaction {txid} was broadcast but not recorded in the wallet ledger, \
          run `wallet sync` to refresh it: {err}"
        );
        self.save_pending(&transactions[index + 1..])?;
        return Err(err);
      }

      txids.push(txid);
    }

    self.pending.clear()?;

    let inscription = self.inscription(transactions);

    if let Some(inscription) = inscription {
      log::info!("inscription {inscription}");
    }

    Ok(Output { txids, inscription })
  }

  fn record(&self, transaction: &Transaction) -> SnafuResult {
    let mut wallet = self.ledger.load()?;
    wallet.apply_transaction(transaction);
    self.ledger.save(&wallet)
  }

  /// Write the transactions still to be broadcast to the recovery record, or
  /// remove the record if there are none.
  fn save_pending(&self, transactions: &[Transaction]) -> SnafuResult {
    if transactions.is_empty() {
      return self.pending.clear();
    }

    self.pending.save(transactions)?;

    eprintln!(
      "saved {} pending transactions to {}",
      transactions.len(),
      self.pending.path().display()
    );

    Ok(())
  }

  /// Id of the inscription the chain reveals. A resumed chain may start after
  /// its first reveal, in which case the chain inputs are followed back
  /// through the node until the reveal that opens the envelope.
  fn inscription(&self, transactions: &[Transaction]) -> Option<Txid> {
    if let Some(reveal) = transactions
      .iter()
      .find(|transaction| inscription::is_reveal_start(transaction))
    {
      return Some(reveal.compute_txid());
    }

    let mut transaction = transactions.first()?.clone();

    while spends_chain_output(&transaction) {
      let previous = transaction.input.first()?.previous_output.txid;

      transaction = match self.blockchain.get_transaction(previous) {
        Ok(transaction) => transaction,
        Err(err) => {
          log::warn!("failed to follow inscription chain back to {previous}: {err}");
          return None;
        }
      };

      if inscription::is_reveal_start(&transaction) {
        return Some(previous);
      }
    }

    None
  }

  fn submit(&self, transaction: &Transaction) -> Result<Txid, BlockchainError> {
    let mut attempt = 0;

    loop {
      match self.blockchain.broadcast(transaction) {
        Ok(txid) => return Ok(txid),
        Err(err)
          if err.is_transient()
            && attempt + 1 < self.retry.attempts
            && !self.shutdown.load(atomic::Ordering::Relaxed) =>
        {
          let delay = self.retry.delay(attempt);
          log::warn!(
            "broadcast attempt {} failed: {err}, retrying in {}ms",
            attempt + 1,
            delay.as_millis()
          );
          thread::sleep(delay);
          attempt += 1;
        }
        Err(err) => return Err(err),
      }
    }
  }
}

/// Whether input 0 unlocks a hash-locked chain output, revealing envelope
/// elements ahead of its signature and redeem script. Funding inputs carry
/// only a signature and a public key.
fn spends_chain_output(transaction: &Transaction) -> bool {
  inscription::unlock_elements(transaction).is_ok_and(|elements| elements.len() > 2)
}
