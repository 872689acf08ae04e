use super::*;

#[derive(Serialize, Eq, PartialEq, Deserialize, Debug)]
pub struct Output {
  pub inscription: Txid,
  pub content_type: String,
  pub body: String,
  pub text: Option<String>,
}

impl From<Inscription> for Output {
  fn from(inscription: Inscription) -> Self {
    Self {
      inscription: inscription.id,
      text: inscription.body_text().map(str::to_string),
      body: hex::encode(&inscription.body),
      content_type: inscription.content_type,
    }
  }
}

#[derive(Debug, Parser)]
pub(crate) struct Decode {
  #[arg(
    required = true,
    help = "Decode the inscription revealed by <TRANSACTIONS>, in chain order. Each file holds one raw transaction, hex or binary."
  )]
  transactions: Vec<PathBuf>,
}

impl Decode {
  pub(crate) fn run(self) -> SubcommandResult {
    let transactions = self
      .transactions
      .iter()
      .map(|path| {
        let bytes =
          fs::read(path).with_context(|| format!("failed to read `{}`", path.display()))?;

        Self::parse(&bytes).with_context(|| format!("failed to decode `{}`", path.display()))
      })
      .collect::<Result<Vec<Transaction>>>()?;

    Ok(Some(Box::new(Output::from(
      Inscription::from_transactions(&transactions)?,
    ))))
  }

  fn parse(bytes: &[u8]) -> SnafuResult<Transaction> {
    match std::str::from_utf8(bytes) {
      Ok(text) if !text.trim().is_empty() && text.trim().bytes().all(|b| b.is_ascii_hexdigit()) => {
        pending::decode_transaction(text)
      }
      _ => consensus::deserialize(bytes).snafu_context(error::TransactionDecode),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn reveal() -> Transaction {
    ChainBuilder {
      content_type: "text/plain;charset=utf-8".into(),
      destination: recipient(),
      fee_rate: FeeRate::default(),
      payload: b"hello".to_vec(),
    }
    .build(&mut funded_wallet(&[500_000]))
    .unwrap()
    .remove(1)
  }

  #[test]
  fn hex_and_binary_are_accepted() {
    let reveal = reveal();

    assert_eq!(
      Decode::parse(consensus::encode::serialize_hex(&reveal).as_bytes()).unwrap(),
      reveal
    );

    assert_eq!(
      Decode::parse(format!("{}\n", consensus::encode::serialize_hex(&reveal)).as_bytes())
        .unwrap(),
      reveal
    );

    assert_eq!(
      Decode::parse(&consensus::serialize(&reveal)).unwrap(),
      reveal
    );
  }

  #[test]
  fn garbage_is_rejected() {
    assert_eq!(
      Decode::parse(b"not a transaction").unwrap_err().kind(),
      ErrorKind::InputValidation
    );
  }

  #[test]
  fn output() {
    let reveal = reveal();

    pretty_assert_eq!(
      Output::from(Inscription::from_transactions(&[reveal.clone()]).unwrap()),
      Output {
        inscription: reveal.compute_txid(),
        content_type: "text/plain;charset=utf-8".into(),
        body: "68656c6c6f".into(),
        text: Some("hello".into()),
      }
    );
  }
}
