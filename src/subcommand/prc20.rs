use super::*;

const CONTENT_TYPE: &str = "text/plain;charset=utf-8";

#[derive(Debug, Parser)]
pub(crate) enum Prc20 {
  #[command(about = "Deploy a token")]
  Deploy(Deploy),
  #[command(about = "Mint a token")]
  Mint(Transfer),
  #[command(about = "Inscribe a token transfer")]
  Transfer(Transfer),
}

#[derive(Debug, Parser)]
pub(crate) struct Deploy {
  #[arg(help = "Send the deploy inscription to <ADDRESS>.")]
  address: String,
  #[arg(help = "Deploy token <TICK>.")]
  tick: String,
  #[arg(help = "Cap supply at <MAX>.")]
  max: String,
  #[arg(help = "Allow at most <LIMIT> per mint.")]
  limit: String,
}

#[derive(Debug, Parser)]
pub(crate) struct Transfer {
  #[arg(help = "Send the inscription to <ADDRESS>.")]
  address: String,
  #[arg(help = "Use token <TICK>.")]
  tick: String,
  #[arg(help = "Move <AMOUNT> tokens.")]
  amount: String,
  #[arg(default_value_t = 1, help = "Inscribe <REPEAT> times.")]
  repeat: u32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub(crate) struct Operation {
  pub(crate) p: String,
  pub(crate) op: String,
  pub(crate) tick: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub(crate) max: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub(crate) lim: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub(crate) amt: Option<String>,
}

impl Operation {
  fn new(op: &str, tick: &str) -> Self {
    Self {
      p: "prc-20".into(),
      op: op.into(),
      tick: tick.to_lowercase(),
      max: None,
      lim: None,
      amt: None,
    }
  }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Output {
  pub inscriptions: Vec<broadcast::Output>,
}

impl Prc20 {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    let (address, operation, repeat) = self.operation();

    let destination = settings.chain().address(&address)?;

    let payload = serde_json::to_vec(&operation)?;

    let mut inscriptions = Vec::new();

    for i in 0..repeat {
      eprintln!(
        "inscribing prc-20 {} {}, {} of {repeat}",
        operation.op,
        operation.tick,
        i + 1
      );

      inscriptions.push(mint::inscribe(
        &settings,
        destination.clone(),
        CONTENT_TYPE.into(),
        payload.clone(),
      )?);
    }

    Ok(Some(Box::new(Output { inscriptions })))
  }

  fn operation(self) -> (String, Operation, u32) {
    match self {
      Self::Deploy(deploy) => (
        deploy.address,
        Operation {
          max: Some(deploy.max),
          lim: Some(deploy.limit),
          ..Operation::new("deploy", &deploy.tick)
        },
        1,
      ),
      Self::Mint(transfer) => transfer.operation("mint"),
      Self::Transfer(transfer) => transfer.operation("transfer"),
    }
  }
}

impl Transfer {
  fn operation(self, op: &str) -> (String, Operation, u32) {
    (
      self.address,
      Operation {
        amt: Some(self.amount),
        ..Operation::new(op, &self.tick)
      },
      self.repeat,
    )
  }
}
