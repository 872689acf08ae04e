use {super::*, std::io::Write};

/// Replace the file at `path` by writing a sibling temporary file and renaming
/// it over the old one, so readers see either the old or the new contents.
pub(crate) fn write_atomically(path: &Path, contents: &[u8]) -> SnafuResult {
  let dir = match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  };

  let mut tempfile = tempfile::NamedTempFile::new_in(dir).snafu_context(error::Io { path: dir })?;

  tempfile
    .write_all(contents)
    .and_then(|()| tempfile.as_file().sync_all())
    .snafu_context(error::Io { path: tempfile.path() })?;

  tempfile
    .persist(path)
    .map_err(|err| err.error)
    .snafu_context(error::Io { path })?;

  Ok(())
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct LedgerFile {
  privkey: String,
  address: String,
  utxos: Vec<Utxo>,
}

/// JSON file holding the wallet ledger.
#[derive(Debug, Clone)]
pub struct LedgerStore {
  chain: Chain,
  path: PathBuf,
}

impl LedgerStore {
  pub fn new(path: impl Into<PathBuf>, chain: Chain) -> Self {
    Self {
      chain,
      path: path.into(),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn create(&self, wallet: &Wallet) -> SnafuResult {
    if self.path.exists() {
      return error::WalletExists {
        path: self.path.clone(),
      }
      .fail();
    }

    self.save(wallet)
  }

  pub fn load(&self) -> SnafuResult<Wallet> {
    if !self.path.exists() {
      return error::LedgerMissing {
        path: self.path.clone(),
      }
      .fail();
    }

    let json = fs::read_to_string(&self.path).snafu_context(error::LedgerRead {
      path: self.path.clone(),
    })?;

    let file = serde_json::from_str::<LedgerFile>(&json).snafu_context(error::LedgerParse {
      path: self.path.clone(),
    })?;

    let private_key =
      PrivateKey::from_wif(&file.privkey).map_err(|err| self.inconsistent(err.to_string()))?;

    if private_key.network != bitcoin::NetworkKind::from(self.chain.network()) {
      return Err(self.inconsistent(format!("private key is not for {}", self.chain)));
    }

    let address = self
      .chain
      .address(&file.address)
      .map_err(|err| self.inconsistent(err.to_string()))?;

    let wallet = Wallet::new(private_key, self.chain).with_utxos(file.utxos);

    if *wallet.address() != address {
      return Err(self.inconsistent(format!(
        "address {address} does not belong to private key"
      )));
    }

    if let Some(reason) = wallet.inconsistency() {
      return Err(self.inconsistent(reason));
    }

    Ok(wallet)
  }

  pub fn save(&self, wallet: &Wallet) -> SnafuResult {
    let file = LedgerFile {
      privkey: wallet.private_key().to_wif(),
      address: wallet.address().to_string(),
      utxos: wallet.utxos().to_vec(),
    };

    let json = serde_json::to_vec_pretty(&file)
      .map_err(io::Error::from)
      .snafu_context(error::Io {
        path: self.path.clone(),
      })?;

    write_atomically(&self.path, &json)?;

    log::debug!(
      "saved wallet ledger with {} outputs to {}",
      wallet.utxos().len(),
      self.path.display()
    );

    Ok(())
  }

  fn inconsistent(&self, reason: String) -> SnafuError {
    SnafuError::LedgerInconsistent {
      path: self.path.clone(),
      reason,
    }
  }
}
