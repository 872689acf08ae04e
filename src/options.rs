use super::*;

#[derive(Clone, Default, Debug, Parser)]
#[command(group(
  ArgGroup::new("chains")
    .required(false)
    .args(&["chain_argument", "signet", "regtest", "testnet"]),
))]
pub struct Options {
  #[arg(
    long,
    help = "Submit each transaction at most <BROADCAST_ATTEMPTS> times. [default: 3]"
  )]
  pub(crate) broadcast_attempts: Option<u32>,
  #[arg(
    long,
    help = "Wait <BROADCAST_BACKOFF> milliseconds before the first broadcast retry, doubling after each attempt. [default: 1000]"
  )]
  pub(crate) broadcast_backoff: Option<u64>,
  #[arg(long = "chain", value_enum, help = "Use <CHAIN>. [default: mainnet]")]
  pub(crate) chain_argument: Option<Chain>,
  #[arg(long, help = "Load configuration from <CONFIG>.")]
  pub(crate) config: Option<PathBuf>,
  #[arg(long, help = "Load configuration from <CONFIG_DIR>.")]
  pub(crate) config_dir: Option<PathBuf>,
  #[arg(long, help = "Load Bitcoin Core RPC cookie file from <COOKIE_FILE>.")]
  pub(crate) cookie_file: Option<PathBuf>,
  #[arg(long, help = "Pay <FEE_RATE> sats per kilobyte. [default: 100000]")]
  pub(crate) fee_rate: Option<u64>,
  #[clap(long, short, help = "Specify output format. [default: json]")]
  pub(crate) format: Option<OutputFormat>,
  #[arg(
    long,
    help = "Record unbroadcast transactions at <PENDING>. [default: pending-txs.json]"
  )]
  pub(crate) pending: Option<PathBuf>,
  #[arg(long, short, help = "Use regtest. Equivalent to `--chain regtest`.")]
  pub(crate) regtest: bool,
  #[arg(long, help = "Authenticate to Bitcoin Core RPC with <RPC_PASSWORD>.")]
  pub(crate) rpc_password: Option<String>,
  #[arg(long, help = "Connect to Bitcoin Core RPC at <RPC_URL>.")]
  pub(crate) rpc_url: Option<String>,
  #[arg(long, help = "Authenticate to Bitcoin Core RPC as <RPC_USERNAME>.")]
  pub(crate) rpc_username: Option<String>,
  #[arg(long, short, help = "Use signet. Equivalent to `--chain signet`.")]
  pub(crate) signet: bool,
  #[arg(long, short, help = "Use testnet. Equivalent to `--chain testnet`.")]
  pub(crate) testnet: bool,
  #[arg(long, help = "Load wallet ledger from <WALLET>. [default: .wallet.json]")]
  pub(crate) wallet: Option<PathBuf>,
}
