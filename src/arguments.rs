use super::*;

#[derive(Debug, Parser)]
#[command(version)]
pub(crate) struct Arguments {
  #[command(flatten)]
  pub(crate) options: Options,
  #[command(subcommand)]
  pub(crate) subcommand: Subcommand,
}

impl Arguments {
  pub(crate) fn run(self) -> SubcommandResult {
    let settings = Settings::new(self.options)?;

    if self.subcommand.resumes_pending() && settings.pending_store()?.exists() {
      eprintln!("found pending transactions, rebroadcasting");
      return subcommand::resume::run(settings);
    }

    self.subcommand.run(settings)
  }
}
