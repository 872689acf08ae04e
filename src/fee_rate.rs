use super::*;

/// Fee rate in satoshis per kilobyte of serialized transaction.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct FeeRate(u64);

impl FromStr for FeeRate {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(Self(
      s.parse()
        .with_context(|| format!("invalid fee rate: {s}"))?,
    ))
  }
}

impl From<u64> for FeeRate {
  fn from(sats_per_kb: u64) -> Self {
    Self(sats_per_kb)
  }
}

impl Display for FeeRate {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{} sat/kB", self.0)
  }
}

impl FeeRate {
  pub const DEFAULT: Self = Self(100_000);

  /// Fee for a transaction of `size` bytes, rounded up to the next satoshi.
  pub fn fee(self, size: usize) -> Amount {
    let size = u64::try_from(size).unwrap_or(u64::MAX);
    Amount::from_sat(size.saturating_mul(self.0).div_ceil(1000))
  }
}

impl Default for FeeRate {
  fn default() -> Self {
    Self::DEFAULT
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse() {
    assert_eq!("1000".parse::<FeeRate>().unwrap(), FeeRate(1000));
    assert_eq!("0".parse::<FeeRate>().unwrap(), FeeRate(0));
    assert!("-4".parse::<FeeRate>().is_err());
    assert!("1.5".parse::<FeeRate>().is_err());
    assert_eq!(
      "foo".parse::<FeeRate>().unwrap_err().to_string(),
      "invalid fee rate: foo"
    );
  }

  #[test]
  fn fee() {
    assert_eq!(FeeRate(1000).fee(250), Amount::from_sat(250));
    assert_eq!(FeeRate(100_000).fee(226), Amount::from_sat(22_600));
    assert_eq!(FeeRate(1).fee(1), Amount::from_sat(1));
    assert_eq!(FeeRate(1).fee(1001), Amount::from_sat(2));
    assert_eq!(FeeRate(0).fee(123_456), Amount::ZERO);
  }

  #[test]
  fn display() {
    assert_eq!(FeeRate(1000).to_string(), "1000 sat/kB");
  }
}
