use {
  super::*,
  bitcoin::opcodes::all::{OP_CHECKSIGVERIFY, OP_DROP},
  transaction_builder::{PrevOutputRef, TransactionBuilder},
};

/// Upper bound on the serialized size of the envelope segment one chain
/// transaction locks, keeping its eventual unlock script standard.
pub const MAX_SEGMENT_SIZE: usize = 1500;

/// Split an envelope into the segments carried by successive chain
/// transactions.
///
/// The leading marker opens the first segment unpaired. Element pairs are
/// then appended until the segment exceeds `MAX_SEGMENT_SIZE`, and the pair
/// that crossed the bound is carried over to the next segment. A segment
/// holding a single oversized pair keeps it.
pub fn segments(elements: &[Element]) -> SnafuResult<Vec<Vec<Element>>> {
  let mut segments = Vec::new();
  let mut start = 0;

  while start < elements.len() {
    let mut end = start;

    if segments.is_empty() {
      end += 1;
    }

    let pairs_start = end;

    while end < elements.len() && envelope::elements_size(&elements[start..end])? <= MAX_SEGMENT_SIZE
    {
      end = (end + 2).min(elements.len());
    }

    if envelope::elements_size(&elements[start..end])? > MAX_SEGMENT_SIZE && end - pairs_start > 2 {
      end -= 2;
    }

    segments.push(elements[start..end].to_vec());

    start = end;
  }

  Ok(segments)
}

/// `<pubkey> OP_CHECKSIGVERIFY OP_DROP… OP_TRUE`, with one `OP_DROP` per
/// segment element pushed by the unlock script.
pub fn redeem_script(public_key: &PublicKey, elements: usize) -> ScriptBuf {
  let mut builder = script::Builder::new()
    .push_key(public_key)
    .push_opcode(OP_CHECKSIGVERIFY);

  for _ in 0..elements {
    builder = builder.push_opcode(OP_DROP);
  }

  builder.push_opcode(opcodes::OP_TRUE).into_script()
}

/// Builds the chain of transactions that inscribes a payload and sends it to
/// a destination.
///
/// Every chain transaction locks one envelope segment in a P2SH output of
/// `POSTAGE` sats and spends the previous one, revealing the previous
/// segment. The final transaction reveals the last segment and pays
/// `POSTAGE` to the destination.
#[derive(Debug, Clone)]
pub struct ChainBuilder {
  pub content_type: String,
  pub destination: Address,
  pub fee_rate: FeeRate,
  pub payload: Vec<u8>,
}

impl ChainBuilder {
  /// Build and sign the chain, funding it from `wallet` and applying each
  /// transaction to it. `wallet` is a working copy; nothing is persisted.
  pub fn build(&self, wallet: &mut Wallet) -> SnafuResult<Vec<Transaction>> {
    let elements = Envelope::encode(&self.content_type, &self.payload)?;

    let public_key = wallet.public_key();

    let mut transactions = Vec::new();
    let mut previous = None;

    for segment in segments(&elements)? {
      let redeem_script = redeem_script(&public_key, segment.len());

      let lock = TxOut {
        value: POSTAGE,
        script_pubkey: ScriptBuf::new_p2sh(&redeem_script.script_hash()),
      };

      let transaction = self.fund(wallet, lock, previous.take())?;

      wallet.apply_transaction(&transaction);

      log::debug!(
        "built chain transaction {} locking {} elements",
        transaction.compute_txid(),
        segment.len()
      );

      previous = Some(PrevOutputRef {
        outpoint: OutPoint {
          txid: transaction.compute_txid(),
          vout: 0,
        },
        value: POSTAGE,
        redeem_script,
        segment,
      });

      transactions.push(transaction);
    }

    let reveal = self.fund(
      wallet,
      TxOut {
        value: POSTAGE,
        script_pubkey: self.destination.script_pubkey(),
      },
      previous,
    )?;

    wallet.apply_transaction(&reveal);

    transactions.push(reveal);

    Ok(transactions)
  }

  fn fund(
    &self,
    wallet: &Wallet,
    output: TxOut,
    chain_input: Option<PrevOutputRef>,
  ) -> SnafuResult<Transaction> {
    let builder = TransactionBuilder::new(wallet, vec![output], self.fee_rate);

    match chain_input {
      Some(chain_input) => builder.chain_input(chain_input),
      None => builder,
    }
    .build_transaction()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn chain_builder(content_type: &str, payload: &[u8]) -> ChainBuilder {
    ChainBuilder {
      content_type: content_type.into(),
      destination: recipient(),
      fee_rate: FeeRate::default(),
      payload: payload.into(),
    }
  }

  fn assert_chained(transactions: &[Transaction]) {
    for (previous, transaction) in transactions.iter().zip(&transactions[1..]) {
      assert_eq!(
        transaction.input[0].previous_output,
        OutPoint {
          txid: previous.compute_txid(),
          vout: 0,
        }
      );
      assert_eq!(previous.output[0].value, POSTAGE);
      assert!(previous.output[0].script_pubkey.is_p2sh());
    }
  }

  #[test]
  fn hello() {
    let mut wallet = funded_wallet(&[500_000]);

    let transactions = chain_builder("text/plain;charset=utf-8", b"hello")
      .build(&mut wallet)
      .unwrap();

    assert_eq!(transactions.len(), 2);

    assert_chained(&transactions);

    assert_eq!(
      transactions[1].output[0],
      TxOut {
        value: POSTAGE,
        script_pubkey: recipient().script_pubkey(),
      }
    );

    assert!(inscription::is_reveal_start(&transactions[1]));

    let inscription = Inscription::from_transactions(&transactions[1..]).unwrap();

    assert_eq!(inscription.id, transactions[1].compute_txid());
    assert_eq!(inscription.content_type, "text/plain;charset=utf-8");
    assert_eq!(inscription.body, b"hello");
  }

  #[test]
  fn working_copy_tracks_chain() {
    let mut wallet = funded_wallet(&[500_000]);

    let transactions = chain_builder("text/plain", b"hello")
      .build(&mut wallet)
      .unwrap();

    assert!(wallet.utxos().iter().all(|utxo| utxo.outpoint() != outpoint(1)));

    assert_eq!(wallet.utxos().len(), 1);
    assert_eq!(wallet.utxos()[0].txid, transactions[1].compute_txid());

    assert!(wallet.balance() < Amount::from_sat(500_000) - POSTAGE);
  }

  #[test]
  fn large_payload_spans_many_transactions() {
    let payload = (0..10_000)
      .map(|i| u8::try_from(i % 256).unwrap())
      .collect::<Vec<u8>>();

    let mut wallet = funded_wallet(&[100_000_000]);

    let transactions = chain_builder("application/octet-stream", &payload)
      .build(&mut wallet)
      .unwrap();

    let elements = Envelope::encode("application/octet-stream", &payload).unwrap();

    assert_eq!(transactions.len(), segments(&elements).unwrap().len() + 1);
    assert!(transactions.len() > 3);

    assert_chained(&transactions);

    assert!(!inscription::is_reveal_start(&transactions[0]));
    assert!(inscription::is_reveal_start(&transactions[1]));

    let inscription = Inscription::from_transactions(&transactions[1..]).unwrap();

    assert_eq!(inscription.body, payload);

    let funding = transactions
      .iter()
      .flat_map(|transaction| transaction.input.iter().map(|input| input.previous_output))
      .collect::<Vec<OutPoint>>();

    assert_eq!(
      funding.len(),
      funding.iter().collect::<std::collections::BTreeSet<_>>().len(),
      "no output is spent twice",
    );
  }

  #[test]
  fn insufficient_funds() {
    let mut wallet = funded_wallet(&[1000]);

    assert_eq!(
      chain_builder("text/plain", b"hello")
        .build(&mut wallet)
        .unwrap_err()
        .kind(),
      ErrorKind::InsufficientFunds
    );
  }

  #[test]
  fn validation_errors_come_first() {
    let mut wallet = funded_wallet(&[500_000]);

    assert_matches!(
      chain_builder("text/plain", b"").build(&mut wallet),
      Err(SnafuError::EmptyPayload)
    );

    assert_eq!(wallet, funded_wallet(&[500_000]));
  }

  #[test]
  fn first_segment_opens_with_marker() {
    let elements = Envelope::encode("text/plain", &[0; 2000]).unwrap();

    let segments = segments(&elements).unwrap();

    assert_eq!(segments[0][0], Element::Data(b"ord".to_vec()));

    assert_eq!(segments[0].len() % 2, 1);

    for segment in &segments[1..] {
      assert_eq!(segment.len() % 2, 0);
      assert!(segment[0].number().is_some());
    }

    assert_eq!(segments.concat(), elements);
  }

  #[test]
  fn segments_respect_size_bound() {
    let elements = Envelope::encode("image/png", &[0xff; 20_000]).unwrap();

    let segments = segments(&elements).unwrap();

    for segment in &segments {
      let size = envelope::elements_size(segment).unwrap();
      assert!(size <= MAX_SEGMENT_SIZE, "{size}");
    }

    for pair in segments.windows(2) {
      let mut extended = pair[0].clone();
      extended.extend_from_slice(&pair[1][..2]);
      assert!(envelope::elements_size(&extended).unwrap() > MAX_SEGMENT_SIZE);
    }
  }

  #[test]
  fn small_envelope_is_one_segment() {
    let elements = Envelope::encode("text/plain;charset=utf-8", b"hello").unwrap();

    assert_eq!(segments(&elements).unwrap(), [elements]);
  }

  #[test]
  fn redeem_script_layout() {
    let public_key = wallet().public_key();

    let mut expected = vec![0x21];
    expected.extend(public_key.to_bytes());
    expected.push(0xad);
    expected.extend([0x75; 3]);
    expected.push(0x51);

    assert_eq!(redeem_script(&public_key, 3).as_bytes(), expected);
  }
}
