use {
  super::*,
  bitcoincore_rpc::{Auth, Client, RpcApi},
};

#[derive(Default, Debug, Clone)]
pub struct Settings {
  pub(crate) chain: Chain,
  pub(crate) config: Config,
  pub(crate) options: Options,
}

impl Settings {
  pub(crate) fn new(options: Options) -> Result<Self> {
    let config: Config = match &options.config {
      Some(path) => serde_yaml::from_reader(
        fs::File::open(path)
          .with_context(|| format!("failed to open config file `{}`", path.display()))?,
      )
      .with_context(|| format!("failed to parse config file `{}`", path.display()))?,
      None => match &options.config_dir {
        Some(dir) if dir.join("pepinals.yaml").exists() => {
          serde_yaml::from_reader(fs::File::open(dir.join("pepinals.yaml"))?)?
        }
        Some(_) | None => Default::default(),
      },
    };

    let chain = Self::setting_typed(
      options
        .signet
        .then_some(Chain::Signet)
        .or(options.regtest.then_some(Chain::Regtest))
        .or(options.testnet.then_some(Chain::Testnet))
        .or(options.chain_argument),
      Some("CHAIN"),
      config.chain,
      Chain::Mainnet,
    )?;

    Ok(Self {
      chain,
      config,
      options,
    })
  }

  pub(crate) fn chain(&self) -> Chain {
    self.chain
  }

  pub(crate) fn fee_rate(&self) -> Result<FeeRate> {
    Self::setting_typed(
      self.options.fee_rate.map(FeeRate::from),
      Some("FEE_RATE"),
      self.config.fee_rate.map(FeeRate::from),
      FeeRate::default(),
    )
  }

  pub(crate) fn ledger_store(&self) -> Result<LedgerStore> {
    let path = Self::setting_typed(
      self.options.wallet.clone(),
      Some("WALLET"),
      self.config.wallet.clone(),
      ".wallet.json".into(),
    )?;

    Ok(LedgerStore::new(path, self.chain()))
  }

  pub(crate) fn pending_store(&self) -> Result<PendingStore> {
    let path = Self::setting_typed(
      self.options.pending.clone(),
      Some("PENDING"),
      self.config.pending.clone(),
      "pending-txs.json".into(),
    )?;

    Ok(PendingStore::new(path))
  }

  pub(crate) fn retry_policy(&self) -> Result<RetryPolicy> {
    let attempts = Self::setting_typed(
      self.options.broadcast_attempts,
      Some("BROADCAST_ATTEMPTS"),
      self.config.broadcast_attempts,
      RetryPolicy::DEFAULT_ATTEMPTS,
    )?;

    ensure!(attempts > 0, "broadcast attempts must be at least 1");

    let backoff = Self::setting_typed(
      self.options.broadcast_backoff,
      Some("BROADCAST_BACKOFF"),
      self.config.broadcast_backoff,
      u64::try_from(RetryPolicy::DEFAULT_BACKOFF.as_millis())?,
    )?;

    Ok(RetryPolicy {
      attempts,
      backoff: Duration::from_millis(backoff),
    })
  }

  pub(crate) fn server_port(&self) -> Result<u16> {
    Self::setting_typed(None, Some("SERVER_PORT"), self.config.server_port, 3000)
  }

  pub(crate) fn auth(&self) -> Result<Auth> {
    let rpc_username = Self::setting(
      self.options.rpc_username.as_deref(),
      Some("RPC_USERNAME"),
      self.config.rpc_username.as_deref(),
      None,
    )?;

    let rpc_password = Self::setting(
      self.options.rpc_password.as_deref(),
      Some("RPC_PASSWORD"),
      self.config.rpc_password.as_deref(),
      None,
    )?;

    match (rpc_username, rpc_password) {
      (Some(rpc_username), Some(rpc_password)) => Ok(Auth::UserPass(rpc_username, rpc_password)),
      (None, Some(_rpc_password)) => Err(anyhow!("no bitcoind rpc username specified")),
      (Some(_rpc_username), None) => Err(anyhow!("no bitcoind rpc password specified")),
      (None, None) => Ok(match self.cookie_file()? {
        Some(cookie_file) => Auth::CookieFile(cookie_file),
        None => Auth::None,
      }),
    }
  }

  pub(crate) fn cookie_file(&self) -> Result<Option<PathBuf>> {
    let cookie_file = Self::setting(
      self
        .options
        .cookie_file
        .as_deref()
        .and_then(|path| path.to_str()),
      Some("COOKIE_FILE"),
      self
        .config
        .cookie_file
        .as_deref()
        .and_then(|path| path.to_str()),
      None,
    )?;

    Ok(cookie_file.map(PathBuf::from))
  }

  pub(crate) fn rpc_url(&self) -> Result<String> {
    Ok(
      Self::setting(
        self.options.rpc_url.as_deref(),
        Some("RPC_URL"),
        self.config.rpc_url.as_deref(),
        None,
      )?
      .unwrap_or_else(|| format!("127.0.0.1:{}", self.chain().default_rpc_port())),
    )
  }

  pub(crate) fn bitcoin_rpc_client(&self) -> Result<Client> {
    let rpc_url = self.rpc_url()?;

    let auth = self.auth()?;

    log::info!("Connecting to Bitcoin Core at {rpc_url}");

    if let Auth::CookieFile(cookie_file) = &auth {
      log::info!(
        "Using credentials from cookie file at `{}`",
        cookie_file.display()
      );

      ensure!(
        cookie_file.is_file(),
        "cookie file `{}` does not exist",
        cookie_file.display()
      );
    }

    let client = Client::new(&rpc_url, auth)
      .with_context(|| format!("failed to connect to Bitcoin Core RPC at `{rpc_url}`"))?;

    let blockchain_info = client
      .get_blockchain_info()
      .with_context(|| format!("failed to connect to Bitcoin Core RPC at `{rpc_url}`"))?;

    let rpc_chain = match blockchain_info.chain {
      Network::Bitcoin => Chain::Mainnet,
      Network::Testnet => Chain::Testnet,
      Network::Signet => Chain::Signet,
      Network::Regtest => Chain::Regtest,
      other => bail!("Bitcoin RPC server on unknown chain: {other}"),
    };

    let chain = self.chain();

    if rpc_chain != chain {
      bail!("Bitcoin RPC server is on {rpc_chain} but pepinals is on {chain}");
    }

    Ok(client)
  }

  fn setting_typed<T>(
    arg_value: Option<T>,
    env_key: Option<&str>,
    config_value: Option<T>,
    default_value: T,
  ) -> Result<T>
  where
    T: FromStr,
    T::Err: Into<Error>,
  {
    if let Some(arg_value) = arg_value {
      return Ok(arg_value);
    }

    if let Some(env_key) = env_key {
      match env::var(format!("PEPINALS_{env_key}")) {
        Ok(env_value) => {
          return env_value
            .parse::<T>()
            .map_err(|err| -> Error { err.into() })
            .with_context(|| anyhow!("failed to parse {env_key}"))
        }
        Err(err @ env::VarError::NotUnicode(_)) => return Err(err.into()),
        Err(env::VarError::NotPresent) => {}
      }
    }

    if let Some(config_value) = config_value {
      return Ok(config_value);
    }

    Ok(default_value)
  }

  fn setting(
    arg_value: Option<&str>,
    env_key: Option<&str>,
    config_value: Option<&str>,
    default_value: Option<&str>,
  ) -> Result<Option<String>> {
    if let Some(arg_value) = arg_value {
      return Ok(Some(arg_value.into()));
    }

    if let Some(env_key) = env_key {
      match env::var(format!("PEPINALS_{env_key}")) {
        Ok(env_value) => return Ok(Some(env_value)),
        Err(err @ env::VarError::NotUnicode(_)) => return Err(err.into()),
        Err(env::VarError::NotPresent) => {}
      }
    }

    Ok(config_value.or(default_value).map(str::to_string))
  }
}
