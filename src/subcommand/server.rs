use {
  self::error::{ServerError, ServerResult},
  super::*,
  axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
  },
  axum_server::Handle,
  std::net::ToSocketAddrs,
  tokio::{runtime::Runtime, task},
};

mod error;

#[derive(Debug, Parser)]
pub(crate) struct Server {
  #[arg(
    long,
    default_value = "0.0.0.0",
    help = "Listen on <ADDRESS> for incoming requests."
  )]
  address: String,
  #[arg(
    long,
    help = "Listen on <HTTP_PORT> for incoming HTTP requests. [default: 3000]"
  )]
  http_port: Option<u16>,
}

impl Server {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    let port = match self.http_port {
      Some(port) => port,
      None => settings.server_port()?,
    };

    let blockchain: Arc<dyn Blockchain> = Arc::new(settings.bitcoin_rpc_client()?);

    let handle = Handle::new();

    LISTENERS.lock().unwrap().push(handle.clone());

    Runtime::new()?.block_on(async {
      let router = Router::new()
        .route("/tx/{txids}", get(Self::transaction))
        .with_state(blockchain);

      let addr = (self.address.as_str(), port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| anyhow!("failed to get socket addrs"))?;

      eprintln!("Listening on http://{addr}");
      eprintln!("Example: http://{addr}/tx/<txid>");

      axum_server::Server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;

      Ok(None)
    })
  }

  async fn transaction(
    State(blockchain): State<Arc<dyn Blockchain>>,
    Path(txids): Path<String>,
  ) -> ServerResult<Response> {
    task::spawn_blocking(move || Self::content(&*blockchain, &txids))
      .await
      .map_err(|err| ServerError::Internal(err.into()))?
      .map(IntoResponse::into_response)
  }

  /// Content of the inscription revealed by a comma-separated list of txids,
  /// in chain order.
  fn content(blockchain: &dyn Blockchain, txids: &str) -> ServerResult<(HeaderMap, Vec<u8>)> {
    let txids = txids
      .split(',')
      .map(|txid| {
        txid
          .parse::<Txid>()
          .map_err(|err| ServerError::BadRequest(format!("invalid txid `{txid}`: {err}")))
      })
      .collect::<ServerResult<Vec<Txid>>>()?;

    let inscription = extract::extract(blockchain, &txids)?;

    let mut headers = HeaderMap::new();

    headers.insert(
      header::CONTENT_TYPE,
      inscription
        .content_type
        .parse()
        .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );

    headers.insert(
      header::CACHE_CONTROL,
      HeaderValue::from_static("max-age=31536000, immutable"),
    );

    Ok((headers, inscription.body))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn blockchain_with(payload: &[u8]) -> (MockBlockchain, Vec<Txid>) {
    let transactions = ChainBuilder {
      content_type: "text/plain;charset=utf-8".into(),
      destination: recipient(),
      fee_rate: FeeRate::default(),
      payload: payload.into(),
    }
    .build(&mut funded_wallet(&[10_000_000]))
    .unwrap();

    let blockchain = MockBlockchain::default();

    for transaction in &transactions {
      blockchain.insert_transaction(transaction.clone());
    }

    let reveals = transactions[1..]
      .iter()
      .map(Transaction::compute_txid)
      .collect();

    (blockchain, reveals)
  }

  #[test]
  fn content() {
    let (blockchain, reveals) = blockchain_with(b"hello");

    let (headers, body) = Server::content(&blockchain, &reveals[0].to_string()).unwrap();

    assert_eq!(headers[header::CONTENT_TYPE], "text/plain;charset=utf-8");
    assert_eq!(body, b"hello");
  }

  #[test]
  fn content_across_reveals() {
    let payload = vec![b'a'; 2500];

    let (blockchain, reveals) = blockchain_with(&payload);

    assert!(reveals.len() > 1);

    let txids = reveals
      .iter()
      .map(Txid::to_string)
      .collect::<Vec<String>>()
      .join(",");

    assert_eq!(Server::content(&blockchain, &txids).unwrap().1, payload);

    assert_eq!(
      Server::content(&blockchain, &reveals[0].to_string())
        .unwrap_err()
        .into_response()
        .status(),
      StatusCode::BAD_REQUEST
    );
  }

  #[test]
  fn unknown_transaction_is_not_found() {
    assert_eq!(
      Server::content(&MockBlockchain::default(), &txid(1).to_string())
        .unwrap_err()
        .into_response()
        .status(),
      StatusCode::NOT_FOUND
    );
  }

  #[test]
  fn invalid_txid_is_bad_request() {
    assert_matches!(
      Server::content(&MockBlockchain::default(), "foo"),
      Err(ServerError::BadRequest(_))
    );
  }
}
