use super::*;

#[derive(Debug, Parser)]
pub(crate) struct Mint {
  #[arg(help = "Send the inscription to <ADDRESS>.")]
  address: String,
  #[arg(
    help = "Inscribe the file at <CONTENT_TYPE_OR_FILE>, or, if no such file exists, <HEX_DATA> with content type <CONTENT_TYPE_OR_FILE>."
  )]
  content_type_or_file: String,
  #[arg(help = "Inscribe hex-encoded <HEX_DATA>.")]
  hex_data: Option<String>,
}

impl Mint {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    let destination = settings.chain().address(&self.address)?;

    let (content_type, payload) = self.content()?;

    Ok(Some(Box::new(inscribe(
      &settings,
      destination,
      content_type,
      payload,
    )?)))
  }

  fn content(&self) -> Result<(String, Vec<u8>)> {
    let path = Path::new(&self.content_type_or_file);

    if path.is_file() {
      let payload =
        fs::read(path).with_context(|| format!("failed to read `{}`", path.display()))?;

      return Ok((content_type_for_path(path), payload));
    }

    let payload = hex::decode(self.hex_data.as_deref().unwrap_or_default())
      .snafu_context(error::InvalidHex)?;

    Ok((self.content_type_or_file.clone(), payload))
  }
}

/// Content type of a file, from its extension. Text types carry an explicit
/// utf-8 charset.
fn content_type_for_path(path: &Path) -> String {
  let mime = mime_guess::from_path(path).first_or_octet_stream();

  if mime.type_() == mime_guess::mime::TEXT && mime.get_param(mime_guess::mime::CHARSET).is_none()
  {
    format!("{mime};charset=utf-8")
  } else {
    mime.to_string()
  }
}

/// Build the inscription chain from the wallet ledger and broadcast it.
pub(crate) fn inscribe(
  settings: &Settings,
  destination: Address,
  content_type: String,
  payload: Vec<u8>,
) -> Result<broadcast::Output> {
  let ledger = settings.ledger_store()?;

  let mut wallet = ledger.load()?;

  let transactions = ChainBuilder {
    content_type,
    destination,
    fee_rate: settings.fee_rate()?,
    payload,
  }
  .build(&mut wallet)?;

  log::info!(
    "built {} transactions, wallet balance after broadcast {} sats",
    transactions.len(),
    wallet.balance().to_sat()
  );

  broadcast_all(settings, &ledger, &transactions)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn mint(content_type_or_file: &str, hex_data: Option<&str>) -> Mint {
    Mint {
      address: recipient().to_string(),
      content_type_or_file: content_type_or_file.into(),
      hex_data: hex_data.map(str::to_string),
    }
  }

  #[test]
  fn hex_content() {
    assert_eq!(
      mint("text/plain;charset=utf-8", Some("68656c6c6f"))
        .content()
        .unwrap(),
      ("text/plain;charset=utf-8".to_string(), b"hello".to_vec())
    );
  }

  #[test]
  fn data_must_be_hex() {
    let err = mint("text/plain", Some("hello")).content().unwrap_err();

    assert_eq!(err.to_string(), "data must be hex");

    assert_eq!(
      err.downcast_ref::<SnafuError>().unwrap().kind(),
      ErrorKind::InputValidation
    );
  }

  #[test]
  fn missing_data_is_empty() {
    assert_eq!(
      mint("text/plain", None).content().unwrap(),
      ("text/plain".to_string(), Vec::new())
    );
  }

  #[test]
  fn file_content() {
    let tempdir = tempfile::TempDir::new().unwrap();

    let path = tempdir.path().join("pepe.txt");

    fs::write(&path, "hello").unwrap();

    assert_eq!(
      mint(path.to_str().unwrap(), None).content().unwrap(),
      ("text/plain;charset=utf-8".to_string(), b"hello".to_vec())
    );
  }

  #[test]
  fn content_types() {
    assert_eq!(content_type_for_path(Path::new("pepe.png")), "image/png");
    assert_eq!(content_type_for_path(Path::new("pepe.JPG")), "image/jpeg");
    assert_eq!(
      content_type_for_path(Path::new("pepe.html")),
      "text/html;charset=utf-8"
    );
    assert_eq!(
      content_type_for_path(Path::new("pepe")),
      "application/octet-stream"
    );
  }
}
