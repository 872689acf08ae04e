use super::*;

/// Coarse classification of failures. Callers decide whether to abort, retry
/// or surface based on the kind rather than the individual variant.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ErrorKind {
  CorruptLedger,
  InputValidation,
  InsufficientFunds,
  Internal,
  NetworkFailure,
  Storage,
}

#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)), visibility(pub(crate)))]
pub enum SnafuError {
  #[snafu(display("address `{address}` is not valid on {chain}"))]
  AddressNetwork { address: String, chain: Chain },
  #[snafu(display("failed to query blockchain"))]
  Blockchain { source: BlockchainError },
  #[snafu(display("failed to broadcast transaction {} of {total}", index + 1))]
  Broadcast {
    index: usize,
    total: usize,
    source: BlockchainError,
  },
  #[snafu(display(
    "content type of {len} bytes exceeds the {MAX_SCRIPT_ELEMENT_SIZE} byte script element limit"
  ))]
  ContentTypeTooLong { len: usize },
  #[snafu(display("output value {} sats is below the {} sat dust limit", value.to_sat(), dust.to_sat()))]
  Dust { value: Amount, dust: Amount },
  #[snafu(display("script element of {len} bytes cannot be pushed"))]
  ElementTooLarge { len: usize },
  #[snafu(display("no data to inscribe"))]
  EmptyPayload,
  #[snafu(display(
    "not enough funds: need {} sats but wallet holds {} sats",
    needed.to_sat(),
    available.to_sat()
  ))]
  InsufficientFunds { needed: Amount, available: Amount },
  #[snafu(display("broadcast interrupted before transaction {} of {total}", index + 1))]
  Interrupted { index: usize, total: usize },
  #[snafu(display("data must be hex"))]
  InvalidHex { source: hex::FromHexError },
  #[snafu(display("I/O error at `{}`", path.display()))]
  Io {
    backtrace: Backtrace,
    path: PathBuf,
    source: io::Error,
  },
  #[snafu(display("wallet ledger at `{}` is inconsistent: {reason}", path.display()))]
  LedgerInconsistent { path: PathBuf, reason: String },
  #[snafu(display("no wallet ledger at `{}`, create one with `wallet new`", path.display()))]
  LedgerMissing { path: PathBuf },
  #[snafu(display("failed to parse wallet ledger at `{}`", path.display()))]
  LedgerParse {
    path: PathBuf,
    source: serde_json::Error,
  },
  #[snafu(display("failed to read wallet ledger at `{}`", path.display()))]
  LedgerRead {
    backtrace: Backtrace,
    path: PathBuf,
    source: io::Error,
  },
  #[snafu(display("malformed envelope: {reason}"))]
  MalformedEnvelope { reason: &'static str },
  #[snafu(display("not an inscription"))]
  NotAnInscription,
  #[snafu(display(
    "outputs exceed the {} sat money supply",
    Amount::MAX_MONEY.to_sat()
  ))]
  OutputsTooLarge,
  #[snafu(display(
    "payload needs {parts} parts but an envelope indexes at most {}",
    u16::MAX
  ))]
  PayloadTooLarge { parts: usize },
  #[snafu(display("failed to parse recovery record at `{}`", path.display()))]
  PendingParse {
    path: PathBuf,
    source: serde_json::Error,
  },
  #[snafu(display("invalid transaction {index} in recovery record at `{}`", path.display()))]
  PendingTransaction {
    path: PathBuf,
    index: usize,
    #[snafu(source(from(SnafuError, Box::new)))]
    source: Box<SnafuError>,
  },
  #[snafu(display("failed to sign input {input}: {reason}"))]
  Signing { input: usize, reason: String },
  #[snafu(display("invalid transaction encoding"))]
  TransactionDecode {
    source: bitcoin::consensus::encode::Error,
  },
  #[snafu(display("transaction is not valid hex"))]
  TransactionHex { source: hex::FromHexError },
  #[snafu(display("wallet ledger already exists at `{}`", path.display()))]
  WalletExists { path: PathBuf },
}

impl SnafuError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::AddressNetwork { .. }
      | Self::ContentTypeTooLong { .. }
      | Self::Dust { .. }
      | Self::ElementTooLarge { .. }
      | Self::EmptyPayload
      | Self::InvalidHex { .. }
      | Self::MalformedEnvelope { .. }
      | Self::NotAnInscription
      | Self::OutputsTooLarge
      | Self::PayloadTooLarge { .. }
      | Self::TransactionDecode { .. }
      | Self::TransactionHex { .. } => ErrorKind::InputValidation,
      Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
      Self::Blockchain { .. } | Self::Broadcast { .. } | Self::Interrupted { .. } => {
        ErrorKind::NetworkFailure
      }
      Self::LedgerInconsistent { .. }
      | Self::LedgerMissing { .. }
      | Self::LedgerParse { .. }
      | Self::LedgerRead { .. }
      | Self::PendingParse { .. }
      | Self::PendingTransaction { .. } => ErrorKind::CorruptLedger,
      Self::Io { .. } | Self::WalletExists { .. } => ErrorKind::Storage,
      Self::Signing { .. } => ErrorKind::Internal,
    }
  }
}

/// `anyhow::Context` is in scope crate-wide and shadows
/// `snafu::ResultExt::context`, so typed context goes through
/// `snafu_context` instead.
pub(crate) trait ResultExt<T, E>: Sized {
  fn snafu_context<C, E2>(self, context: C) -> Result<T, E2>
  where
    C: snafu::IntoError<E2, Source = E>,
    E2: std::error::Error + snafu::ErrorCompat;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E> {
  fn snafu_context<C, E2>(self, context: C) -> Result<T, E2>
  where
    C: snafu::IntoError<E2, Source = E>,
    E2: std::error::Error + snafu::ErrorCompat,
  {
    use snafu::ResultExt;
    self.context(context)
  }
}
