//! Funding and signing of wallet transactions.
//!
//! `TransactionBuilder` takes the outputs a transaction must create, and
//! optionally a chain input spending the previous hash-locked output of an
//! inscription chain, and adds funding inputs from the wallet in ledger order
//! until the inputs cover the outputs plus the fee for the transaction's size.
//!
//! Size is estimated with maximum-length signatures, so the fee of the signed
//! transaction is never below the fee that was budgeted. Change above the dust
//! limit goes to the change script, by default the wallet's own address.
//! Change below it is left to the fee.
//!
//! The finished transaction is checked against its invariants with
//! assertions in `TransactionBuilder::build`, and each assertion has a test
//! that shows it fires.

use super::*;

/// Spend of the previous hash-locked output of an inscription chain.
#[derive(Debug, Clone, PartialEq)]
pub struct PrevOutputRef {
  pub outpoint: OutPoint,
  pub value: Amount,
  pub redeem_script: ScriptBuf,
  /// Envelope elements revealed by the unlock script.
  pub segment: Vec<Element>,
}

impl PrevOutputRef {
  fn unlock_script(&self, signature: Vec<u8>) -> SnafuResult<ScriptBuf> {
    let mut elements = self.segment.clone();
    elements.push(Element::Data(signature));
    elements.push(Element::Data(self.redeem_script.to_bytes()));
    envelope::elements_to_script(&elements)
  }
}

#[derive(Debug)]
pub struct TransactionBuilder<'a> {
  chain_input: Option<PrevOutputRef>,
  change: ScriptBuf,
  fee_rate: FeeRate,
  inputs: Vec<Utxo>,
  outputs: Vec<TxOut>,
  spend_all: bool,
  wallet: &'a Wallet,
}

impl<'a> TransactionBuilder<'a> {
  /// DER signature of at most 72 bytes plus the sighash byte.
  const MAX_SIGNATURE_SIZE: usize = 73;

  pub fn new(wallet: &'a Wallet, outputs: Vec<TxOut>, fee_rate: FeeRate) -> Self {
    Self {
      chain_input: None,
      change: wallet.script_pubkey(),
      fee_rate,
      inputs: Vec::new(),
      outputs,
      spend_all: false,
      wallet,
    }
  }

  pub fn chain_input(self, chain_input: PrevOutputRef) -> Self {
    Self {
      chain_input: Some(chain_input),
      ..self
    }
  }

  pub fn change(self, change: ScriptBuf) -> Self {
    Self { change, ..self }
  }

  /// Spend every wallet output instead of only as many as needed.
  pub fn spend_all(self) -> Self {
    Self {
      spend_all: true,
      ..self
    }
  }

  pub fn build_transaction(self) -> SnafuResult<Transaction> {
    self.check_outputs()?.select_inputs()?.build()
  }

  /// Outputs must be above dust and together within the money supply, which
  /// keeps every later sum of outputs and fees from overflowing.
  fn check_outputs(self) -> SnafuResult<Self> {
    let mut total = Amount::ZERO;

    for output in &self.outputs {
      let dust = output.script_pubkey.minimal_non_dust();

      if output.value < dust {
        return error::Dust {
          value: output.value,
          dust,
        }
        .fail();
      }

      total = match total.checked_add(output.value) {
        Some(total) if total <= Amount::MAX_MONEY => total,
        _ => return error::OutputsTooLarge.fail(),
      };
    }

    Ok(self)
  }

  fn select_inputs(mut self) -> SnafuResult<Self> {
    if self.spend_all {
      self.inputs = self.wallet.utxos().to_vec();
    } else {
      let mut utxos = self.wallet.utxos().iter();

      while !self.covered() {
        let Some(utxo) = utxos.next() else {
          break;
        };

        tprintln!(
          "selected {} sat input {}",
          utxo.satoshis.to_sat(),
          utxo.outpoint()
        );

        self.inputs.push(utxo.clone());
      }
    }

    if !self.covered() {
      return error::InsufficientFunds {
        needed: self.output_value() + self.estimate_fee(false),
        available: self.wallet.balance() + self.chain_input_value(),
      }
      .fail();
    }

    Ok(self)
  }

  fn covered(&self) -> bool {
    self.input_value() >= self.output_value() + self.estimate_fee(false)
  }

  fn chain_input_value(&self) -> Amount {
    self
      .chain_input
      .as_ref()
      .map(|chain_input| chain_input.value)
      .unwrap_or_default()
  }

  fn input_value(&self) -> Amount {
    self.chain_input_value() + self.inputs.iter().map(|utxo| utxo.satoshis).sum::<Amount>()
  }

  fn output_value(&self) -> Amount {
    self.outputs.iter().map(|output| output.value).sum()
  }

  fn estimate_fee(&self, with_change: bool) -> Amount {
    self.fee_rate.fee(self.estimate_size(with_change))
  }

  /// Serialized size of the transaction with every signature at its maximum
  /// length.
  fn estimate_size(&self, with_change: bool) -> usize {
    let mut transaction = self.unsigned(with_change.then_some(Amount::ZERO));

    let public_key = self.wallet.public_key().to_bytes();

    let mut script_sigs = Vec::new();

    if let Some(chain_input) = &self.chain_input {
      script_sigs.push(chain_input.unlock_script(vec![0; Self::MAX_SIGNATURE_SIZE]));
    }

    for _ in &self.inputs {
      script_sigs.push(envelope::elements_to_script(&[
        Element::Data(vec![0; Self::MAX_SIGNATURE_SIZE]),
        Element::Data(public_key.clone()),
      ]));
    }

    for (input, script_sig) in transaction.input.iter_mut().zip(script_sigs) {
      input.script_sig = script_sig.unwrap_or_default();
    }

    transaction.total_size()
  }

  fn unsigned(&self, change: Option<Amount>) -> Transaction {
    let mut output = self.outputs.clone();

    if let Some(value) = change {
      output.push(TxOut {
        value,
        script_pubkey: self.change.clone(),
      });
    }

    Transaction {
      version: Version::ONE,
      lock_time: LockTime::ZERO,
      input: self
        .chain_input
        .iter()
        .map(|chain_input| chain_input.outpoint)
        .chain(self.inputs.iter().map(Utxo::outpoint))
        .map(|previous_output| TxIn {
          previous_output,
          script_sig: ScriptBuf::new(),
          sequence: Sequence::MAX,
          witness: Witness::new(),
        })
        .collect(),
      output,
    }
  }

  fn build(self) -> SnafuResult<Transaction> {
    let change = self
      .input_value()
      .checked_sub(self.output_value() + self.estimate_fee(true))
      .filter(|change| *change >= self.change.minimal_non_dust());

    match change {
      Some(change) => tprintln!("added {} sat change output", change.to_sat()),
      None => tprintln!("dropped change output"),
    }

    let mut transaction = self.unsigned(change);

    if transaction.output.is_empty() {
      return error::InsufficientFunds {
        needed: self.estimate_fee(true) + self.change.minimal_non_dust(),
        available: self.input_value(),
      }
      .fail();
    }

    self.sign(&mut transaction)?;

    if let Some(chain_input) = &self.chain_input {
      assert_eq!(
        transaction.input[0].previous_output, chain_input.outpoint,
        "invariant: chain input is first"
      );
    }

    let output_value = transaction
      .output
      .iter()
      .map(|output| output.value)
      .sum::<Amount>();

    let actual_fee = self.input_value().checked_sub(output_value);

    let expected_fee = self.fee_rate.fee(transaction.total_size());

    assert!(
      actual_fee.is_some_and(|actual_fee| actual_fee >= expected_fee),
      "invariant: inputs cover outputs and fee: {:?} < {expected_fee}",
      actual_fee,
    );

    for output in &transaction.output {
      assert!(
        output.value >= output.script_pubkey.minimal_non_dust(),
        "invariant: all outputs are above dust limit",
      );
    }

    Ok(transaction)
  }

  fn sign(&self, transaction: &mut Transaction) -> SnafuResult {
    let script_sigs = {
      let cache = SighashCache::new(&*transaction);

      let signature = |input: usize, script_code: &Script| -> SnafuResult<Vec<u8>> {
        let sighash = cache
          .legacy_signature_hash(input, script_code, EcdsaSighashType::All.to_u32())
          .map_err(|err| SnafuError::Signing {
            input,
            reason: err.to_string(),
          })?;

        let signature = secp256k1::global::SECP256K1.sign_ecdsa(
          &Message::from_digest(sighash.to_byte_array()),
          &self.wallet.private_key().inner,
        );

        Ok(
          bitcoin::ecdsa::Signature {
            signature,
            sighash_type: EcdsaSighashType::All,
          }
          .to_vec(),
        )
      };

      let mut script_sigs = Vec::new();

      if let Some(chain_input) = &self.chain_input {
        script_sigs.push(chain_input.unlock_script(signature(0, &chain_input.redeem_script)?)?);
      }

      let offset = script_sigs.len();

      let public_key = self.wallet.public_key().to_bytes();

      for (i, utxo) in self.inputs.iter().enumerate() {
        script_sigs.push(envelope::elements_to_script(&[
          Element::Data(signature(offset + i, &utxo.script)?),
          Element::Data(public_key.clone()),
        ])?);
      }

      script_sigs
    };

    for (input, script_sig) in transaction.input.iter_mut().zip(script_sigs) {
      input.script_sig = script_sig;
    }

    Ok(())
  }
}
