#![allow(clippy::large_enum_variant, clippy::result_large_err)]
#![deny(
  clippy::cast_lossless,
  clippy::cast_possible_truncation,
  clippy::cast_possible_wrap,
  clippy::cast_sign_loss
)]

use {
  self::{
    arguments::Arguments,
    blockchain::{Blockchain, BlockchainError},
    config::Config,
    error::ResultExt,
    options::Options,
    settings::Settings,
    subcommand::{OutputFormat, Subcommand, SubcommandResult},
    wallet::{
      broadcast::{self, Broadcaster, RetryPolicy},
      inscribe::ChainBuilder,
      ledger_store::LedgerStore,
      pending::{self, PendingStore},
      transaction_builder::TransactionBuilder,
      utxo::Utxo,
      Wallet,
    },
  },
  anyhow::{anyhow, bail, ensure, Context, Error},
  bitcoin::{
    absolute::LockTime,
    address::{Address, NetworkUnchecked},
    blockdata::constants::MAX_SCRIPT_ELEMENT_SIZE,
    consensus,
    hashes::Hash,
    opcodes,
    script::{self, Instruction, PushBytesBuf},
    secp256k1::{self, Message, SecretKey},
    sighash::{EcdsaSighashType, SighashCache},
    transaction::Version,
    Amount, Network, OutPoint, PrivateKey, PublicKey, Script, ScriptBuf, Sequence,
    Transaction, TxIn, TxOut, Txid, Witness,
  },
  clap::{ArgGroup, Parser},
  serde::{Deserialize, Serialize},
  snafu::{Backtrace, ErrorCompat, Snafu},
  std::{
    backtrace::BacktraceStatus,
    env,
    fmt::{self, Display, Formatter},
    fs, io,
    path::{Path, PathBuf},
    process,
    str::FromStr,
    sync::{
      atomic::{self, AtomicBool},
      Arc, Mutex,
    },
    thread,
    time::Duration,
  },
};

pub use self::{
  chain::Chain,
  envelope::{Element, Envelope},
  error::{ErrorKind, SnafuError},
  fee_rate::FeeRate,
  inscription::Inscription,
};


#[cfg(test)]
use self::test::*;

pub mod arguments;
pub mod blockchain;
pub mod chain;
mod config;
pub mod envelope;
mod error;
mod fee_rate;
pub mod inscription;
mod macros;
pub mod options;
pub mod settings;
pub mod subcommand;
pub mod wallet;

type Result<T = (), E = Error> = std::result::Result<T, E>;
type SnafuResult<T = (), E = SnafuError> = std::result::Result<T, E>;

/// Value locked in every chain output and paid to the inscription's destination.
pub const POSTAGE: Amount = Amount::from_sat(100_000);

static SHUTTING_DOWN: AtomicBool = AtomicBool::new(false);
static LISTENERS: Mutex<Vec<axum_server::Handle>> = Mutex::new(Vec::new());

fn default<T: Default>() -> T {
  Default::default()
}

pub fn main() {
  env_logger::init();

  ctrlc::set_handler(move || {
    if SHUTTING_DOWN.fetch_or(true, atomic::Ordering::Relaxed) {
      process::exit(1);
    }

    eprintln!("Shutting down gracefully. Press <CTRL-C> again to shutdown immediately.");

    LISTENERS
      .lock()
      .unwrap()
      .iter()
      .for_each(|handle| handle.graceful_shutdown(Some(Duration::from_millis(100))));
  })
  .expect("Error setting <CTRL-C> handler");

  let args = Arguments::parse();

  let format = args.options.format;

  match args.run() {
    Err(err) => {
      eprintln!("error: {err}");

      let typed = err.downcast_ref::<SnafuError>();

      for (i, err) in err.chain().skip(1).enumerate() {
        if i == 0 {
          eprintln!();
          eprintln!("because:");
        }

        eprintln!("- {err}");
      }

      if let Some(backtrace) = typed.and_then(|err| ErrorCompat::backtrace(err)) {
        if backtrace.status() == BacktraceStatus::Captured {
          eprintln!("backtrace:");
          eprintln!("{backtrace}");
        }
      } else if env::var_os("RUST_BACKTRACE")
        .map(|val| val == "1")
        .unwrap_or_default()
      {
        eprintln!("{}", err.backtrace());
      }

      process::exit(1);
    }
    Ok(output) => {
      if let Some(output) = output {
        output.print(format.unwrap_or_default());
      }
    }
  }
}
