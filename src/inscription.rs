use super::*;

/// An inscription recovered from the unlock scripts of its reveal
/// transactions.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Inscription {
  pub id: Txid,
  pub content_type: String,
  pub body: Vec<u8>,
}

impl Inscription {
  /// Decode an inscription from its reveal transactions, in chain order. Each
  /// reveal carries one segment of the envelope in input 0, followed by a
  /// signature and a redeem script.
  pub fn from_transactions(transactions: &[Transaction]) -> SnafuResult<Self> {
    let Some(first) = transactions.first() else {
      return error::NotAnInscription.fail();
    };

    let mut elements = Vec::new();

    for transaction in transactions {
      let mut segment = unlock_elements(transaction)?;

      if segment.len() < 2 {
        return error::MalformedEnvelope {
          reason: "reveal input is missing its signature or redeem script",
        }
        .fail();
      }

      segment.truncate(segment.len() - 2);
      elements.extend(segment);
    }

    let Envelope { content_type, body } = Envelope::decode(&elements)?;

    Ok(Self {
      id: first.compute_txid(),
      content_type,
      body,
    })
  }

  pub fn body_text(&self) -> Option<&str> {
    std::str::from_utf8(&self.body).ok()
  }
}

/// Elements of input 0's unlock script.
pub fn unlock_elements(transaction: &Transaction) -> SnafuResult<Vec<Element>> {
  match transaction.input.first() {
    Some(input) => envelope::script_to_elements(&input.script_sig),
    None => Ok(Vec::new()),
  }
}

/// Whether input 0 of `transaction` opens an envelope, making it the first
/// reveal of an inscription.
pub fn is_reveal_start(transaction: &Transaction) -> bool {
  transaction
    .input
    .first()
    .and_then(|input| input.script_sig.instructions().next())
    .and_then(|instruction| instruction.ok())
    .map(Element::from_instruction)
    == Some(Element::Data(envelope::PROTOCOL_ID.to_vec()))
}
