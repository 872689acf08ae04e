use {super::*, std::collections::BTreeSet};

pub mod broadcast;
pub mod inscribe;
pub mod ledger_store;
pub mod pending;
pub mod transaction_builder;
pub mod utxo;

/// Single-key wallet: a private key, its P2PKH address and the outputs paying
/// that address.
#[derive(Debug, Clone, PartialEq)]
pub struct Wallet {
  private_key: PrivateKey,
  address: Address,
  utxos: Vec<Utxo>,
}

impl Wallet {
  pub fn new(private_key: PrivateKey, chain: Chain) -> Self {
    let public_key = private_key.public_key(secp256k1::global::SECP256K1);

    Self {
      private_key,
      address: Address::p2pkh(public_key.pubkey_hash(), chain.network()),
      utxos: Vec::new(),
    }
  }

  pub fn generate(chain: Chain) -> Self {
    Self::new(
      PrivateKey::new(
        SecretKey::new(&mut secp256k1::rand::thread_rng()),
        chain.network(),
      ),
      chain,
    )
  }

  pub(crate) fn with_utxos(mut self, utxos: Vec<Utxo>) -> Self {
    self.utxos = utxos;
    self
  }

  pub fn private_key(&self) -> PrivateKey {
    self.private_key
  }

  pub fn public_key(&self) -> PublicKey {
    self.private_key.public_key(secp256k1::global::SECP256K1)
  }

  pub fn address(&self) -> &Address {
    &self.address
  }

  pub fn script_pubkey(&self) -> ScriptBuf {
    self.address.script_pubkey()
  }

  pub fn utxos(&self) -> &[Utxo] {
    &self.utxos
  }

  pub fn balance(&self) -> Amount {
    self.utxos.iter().map(|utxo| utxo.satoshis).sum()
  }

  pub fn replace_utxos(&mut self, utxos: Vec<Utxo>) {
    self.utxos = utxos;
  }

  /// Drop the outputs `transaction` spends and record the outputs it pays to
  /// this wallet. Applying the same transaction again changes nothing.
  pub fn apply_transaction(&mut self, transaction: &Transaction) {
    let spent = transaction
      .input
      .iter()
      .map(|input| input.previous_output)
      .collect::<BTreeSet<OutPoint>>();

    self
      .utxos
      .retain(|utxo| !spent.contains(&utxo.outpoint()));

    let txid = transaction.compute_txid();
    let script_pubkey = self.script_pubkey();

    for (vout, output) in (0..).zip(&transaction.output) {
      if output.script_pubkey != script_pubkey {
        continue;
      }

      let outpoint = OutPoint { txid, vout };

      if self.utxos.iter().any(|utxo| utxo.outpoint() == outpoint) {
        continue;
      }

      self.utxos.push(Utxo {
        txid,
        vout,
        script: output.script_pubkey.clone(),
        satoshis: output.value,
      });
    }
  }

  /// Problems that make the ledger untrustworthy, if any.
  pub(crate) fn inconsistency(&self) -> Option<String> {
    let mut seen = BTreeSet::new();

    let script_pubkey = self.script_pubkey();

    let mut total = Amount::ZERO;

    for utxo in &self.utxos {
      total = match total.checked_add(utxo.satoshis) {
        Some(total) if total <= Amount::MAX_MONEY => total,
        _ => {
          return Some(format!(
            "outputs exceed the {} sat money supply",
            Amount::MAX_MONEY.to_sat()
          ))
        }
      };

      if !seen.insert(utxo.outpoint()) {
        return Some(format!("duplicate output {}", utxo.outpoint()));
      }

      if utxo.script != script_pubkey {
        return Some(format!(
          "output {} is not locked to {}",
          utxo.outpoint(),
          self.address
        ));
      }
    }

    None
  }
}
