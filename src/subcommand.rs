use super::*;

pub mod decode;
pub mod extract;
pub mod mint;
pub mod prc20;
pub mod resume;
pub mod server;
pub mod wallet;

#[derive(Debug, Parser)]
pub(crate) enum Subcommand {
  #[command(about = "Decode an inscription from raw reveal transaction files")]
  Decode(decode::Decode),
  #[command(about = "Fetch reveal transactions from the node and decode their inscription")]
  Extract(extract::Extract),
  #[command(about = "Inscribe a file or hex data")]
  Mint(mint::Mint),
  #[command(subcommand, alias = "prc-20", about = "Deploy, mint and transfer prc-20 tokens")]
  Prc20(prc20::Prc20),
  #[command(about = "Rebroadcast pending transactions")]
  Resume,
  #[command(about = "Serve inscription content over HTTP")]
  Server(server::Server),
  #[command(subcommand, about = "Wallet commands")]
  Wallet(wallet::WalletCommand),
}

impl Subcommand {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    match self {
      Self::Decode(decode) => decode.run(),
      Self::Extract(extract) => extract.run(settings),
      Self::Mint(mint) => mint.run(settings),
      Self::Prc20(prc20) => prc20.run(settings),
      Self::Resume => resume::run(settings),
      Self::Server(server) => server.run(settings),
      Self::Wallet(wallet) => wallet.run(settings),
    }
  }

  /// Whether a pending recovery record takes over this run. Commands that
  /// never touch the wallet are left alone.
  pub(crate) fn resumes_pending(&self) -> bool {
    !matches!(
      self,
      Self::Decode(_) | Self::Extract(_) | Self::Resume | Self::Server(_)
    )
  }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub enum OutputFormat {
  #[default]
  Json,
  Minify,
  Yaml,
}

pub trait Output: Send {
  fn print(&self, format: OutputFormat);
}

impl<T> Output for T
where
  T: Serialize + Send,
{
  fn print(&self, format: OutputFormat) {
    match format {
      OutputFormat::Json => serde_json::to_writer_pretty(io::stdout(), self).ok(),
      OutputFormat::Minify => serde_json::to_writer(io::stdout(), self).ok(),
      OutputFormat::Yaml => serde_yaml::to_writer(io::stdout(), self).ok(),
    };
    println!();
  }
}

pub(crate) type SubcommandResult = Result<Option<Box<dyn Output>>>;

/// Submit `transactions` through the node configured in `settings`, keeping
/// the wallet ledger and recovery record up to date.
pub(crate) fn broadcast_all(
  settings: &Settings,
  ledger: &LedgerStore,
  transactions: &[Transaction],
) -> Result<broadcast::Output> {
  let client = settings.bitcoin_rpc_client()?;

  let pending = settings.pending_store()?;

  Ok(
    Broadcaster::new(&client, ledger, &pending, settings.retry_policy()?)
      .broadcast_all(transactions)?,
  )
}
