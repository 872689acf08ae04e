use super::*;

#[derive(Deserialize, Default, PartialEq, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
  pub(crate) broadcast_attempts: Option<u32>,
  pub(crate) broadcast_backoff: Option<u64>,
  pub(crate) chain: Option<Chain>,
  pub(crate) cookie_file: Option<PathBuf>,
  pub(crate) fee_rate: Option<u64>,
  pub(crate) pending: Option<PathBuf>,
  pub(crate) rpc_password: Option<String>,
  pub(crate) rpc_url: Option<String>,
  pub(crate) rpc_username: Option<String>,
  pub(crate) server_port: Option<u16>,
  pub(crate) wallet: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn example_config_file_is_valid() {
    let config: Config =
      serde_yaml::from_reader(fs::File::open("pepinals.yaml").unwrap()).unwrap();

    assert_eq!(config.chain, Some(Chain::Regtest));
    assert_eq!(config.fee_rate, Some(100_000));
  }

  #[test]
  fn unknown_fields_are_rejected() {
    assert!(serde_yaml::from_str::<Config>("electrumx_host: localhost").is_err());
  }

  #[test]
  fn empty_config_is_default() {
    assert_eq!(
      serde_yaml::from_str::<Config>("{}").unwrap(),
      Config::default()
    );
  }
}
