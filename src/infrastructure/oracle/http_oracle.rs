use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::domain::entities::health::HealthStatus;
use crate::domain::entities::keys::TrackedKey;
use crate::domain::ports::health_oracle::{HealthOracle, OracleError};

/// Maximum response body accepted from the resolver (256 KB).
const MAX_RESPONSE_BYTES: usize = 256 * 1024;

/// Health oracle backed by an HTTP resolver in front of the ledger.
///
/// - `GET {endpoint}/deposits/{key}` returns the collateralization figures
///   of a deposit.
/// - `GET {endpoint}/signers/{key}/deposits` lists the deposits backed by a
///   signer; `404` means the key is not a signer.
pub struct HttpHealthOracle {
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct DepositResponse {
    collateralization_percent: f64,
    undercollateralized_threshold_percent: f64,
}

#[derive(Debug, Deserialize)]
struct SignerDepositsResponse {
    deposits: Vec<String>,
}

impl HttpHealthOracle {
    /// # Errors
    ///
    /// Returns `OracleError::Unavailable` if the HTTP client cannot be
    /// initialized (e.g. TLS backend failure).
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OracleError::Unavailable(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            client,
        })
    }

    fn deposit_url(&self, key: &TrackedKey) -> String {
        format!("{}/deposits/{}", self.endpoint, key)
    }

    fn signer_url(&self, key: &TrackedKey) -> String {
        format!("{}/signers/{}/deposits", self.endpoint, key)
    }

    /// Fetch `url`, refusing bodies over `MAX_RESPONSE_BYTES` without
    /// buffering them.
    async fn get(&self, url: &str) -> Result<(StatusCode, Vec<u8>), OracleError> {
        let mut response = self.client.get(url).send().await.map_err(transport_error)?;
        let status = response.status();
        if let Some(len) = response.content_length() {
            if len > MAX_RESPONSE_BYTES as u64 {
                return Err(too_large(len));
            }
        }
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(transport_error)? {
            if body.len() + chunk.len() > MAX_RESPONSE_BYTES {
                return Err(too_large((body.len() + chunk.len()) as u64));
            }
            body.extend_from_slice(&chunk);
        }
        Ok((status, body))
    }
}

fn too_large(len: u64) -> OracleError {
    OracleError::InvalidResponse(format!("response too large: {len}+ bytes"))
}

fn transport_error(e: reqwest::Error) -> OracleError {
    if e.is_timeout() {
        OracleError::Timeout
    } else {
        OracleError::Unavailable(e.to_string())
    }
}

/// Map a deposit lookup reply to a health status.
fn parse_deposit(
    key: &TrackedKey,
    status: StatusCode,
    body: &[u8],
) -> Result<HealthStatus, OracleError> {
    match status {
        s if s.is_success() => {
            let raw: DepositResponse = serde_json::from_slice(body).map_err(|e| {
                OracleError::InvalidResponse(format!("failed to parse deposit: {e}"))
            })?;
            Ok(HealthStatus::new(
                raw.collateralization_percent,
                raw.undercollateralized_threshold_percent,
            ))
        }
        StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            Err(OracleError::InvalidKey(key.clone()))
        }
        s => Err(OracleError::Unavailable(format!("resolver answered HTTP {s}"))),
    }
}

/// Map a signer lookup reply to the list of deposit keys it stands for.
fn parse_signer_deposits(
    key: &TrackedKey,
    status: StatusCode,
    body: &[u8],
) -> Result<Vec<TrackedKey>, OracleError> {
    match status {
        s if s.is_success() => {
            let raw: SignerDepositsResponse = serde_json::from_slice(body).map_err(|e| {
                OracleError::InvalidResponse(format!("failed to parse signer deposits: {e}"))
            })?;
            if raw.deposits.is_empty() {
                Ok(vec![key.clone()])
            } else {
                Ok(raw.deposits.into_iter().map(TrackedKey::new).collect())
            }
        }
        StatusCode::NOT_FOUND => Ok(vec![key.clone()]),
        s => Err(OracleError::Unavailable(format!("resolver answered HTTP {s}"))),
    }
}

#[async_trait]
impl HealthOracle for HttpHealthOracle {
    async fn resolve(&self, key: &TrackedKey) -> Result<HealthStatus, OracleError> {
        let (status, body) = self.get(&self.deposit_url(key)).await?;
        parse_deposit(key, status, &body)
    }

    async fn expand(&self, key: &TrackedKey) -> Result<Vec<TrackedKey>, OracleError> {
        let (status, body) = self.get(&self.signer_url(key)).await?;
        parse_signer_deposits(key, status, &body)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    fn key() -> TrackedKey {
        TrackedKey::from("0xC309D0C7DC827ea92e956324F1e540eeA6e1AEaa")
    }

    fn oracle(endpoint: &str) -> HttpHealthOracle {
        HttpHealthOracle::new(endpoint, Duration::from_secs(1)).expect("build HTTP client")
    }

    #[test]
    fn urls_are_built_without_double_slash() {
        let o = oracle("http://resolver.local/api/");
        assert_eq!(
            o.deposit_url(&key()),
            "http://resolver.local/api/deposits/0xC309D0C7DC827ea92e956324F1e540eeA6e1AEaa"
        );
        assert_eq!(
            o.signer_url(&key()),
            "http://resolver.local/api/signers/0xC309D0C7DC827ea92e956324F1e540eeA6e1AEaa/deposits"
        );
    }

    #[test]
    fn deposit_body_maps_to_health_status() {
        let body = br#"{"collateralization_percent": 118.5, "undercollateralized_threshold_percent": 125}"#;
        let status = parse_deposit(&key(), StatusCode::OK, body).expect("parse");
        assert!((status.ratio - 118.5).abs() < f64::EPSILON);
        assert!((status.threshold - 125.0).abs() < f64::EPSILON);
        assert!(status.is_unhealthy());
    }

    #[test]
    fn unknown_deposit_is_invalid_key() {
        let err = parse_deposit(&key(), StatusCode::NOT_FOUND, b"").expect_err("404");
        assert!(matches!(err, OracleError::InvalidKey(_)));
        let err = parse_deposit(&key(), StatusCode::UNPROCESSABLE_ENTITY, b"").expect_err("422");
        assert!(!err.is_transient());
    }

    #[test]
    fn server_errors_are_transient() {
        let err = parse_deposit(&key(), StatusCode::BAD_GATEWAY, b"").expect_err("502");
        assert!(err.is_transient());
    }

    #[test]
    fn garbage_body_is_invalid_response() {
        let err = parse_deposit(&key(), StatusCode::OK, b"not json").expect_err("garbage");
        assert!(matches!(err, OracleError::InvalidResponse(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn signer_expands_to_its_deposits() {
        let body = br#"{"deposits": ["0x01", "0x02"]}"#;
        let keys = parse_signer_deposits(&key(), StatusCode::OK, body).expect("parse");
        assert_eq!(keys, vec![TrackedKey::from("0x01"), TrackedKey::from("0x02")]);
    }

    #[test]
    fn non_signer_stands_for_itself() {
        let keys = parse_signer_deposits(&key(), StatusCode::NOT_FOUND, b"").expect("404");
        assert_eq!(keys, vec![key()]);
        let keys =
            parse_signer_deposits(&key(), StatusCode::OK, br#"{"deposits": []}"#).expect("empty");
        assert_eq!(keys, vec![key()]);
    }

    /// Serve one canned response on a local port and return its base URL.
    async fn serve_once(head: String, body_len: usize) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut request = [0_u8; 1024];
            let _ = socket.read(&mut request).await;
            let _ = socket.write_all(head.as_bytes()).await;
            let chunk = vec![b'x'; 16 * 1024];
            let mut left = body_len;
            while left > 0 {
                let n = left.min(chunk.len());
                if socket.write_all(&chunk[..n]).await.is_err() {
                    return;
                }
                left -= n;
            }
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn declared_oversized_body_is_refused() {
        let len = MAX_RESPONSE_BYTES + 1;
        let url = serve_once(
            format!("HTTP/1.1 200 OK\r\nContent-Length: {len}\r\nConnection: close\r\n\r\n"),
            0,
        )
        .await;
        let err = oracle(&url).resolve(&key()).await.expect_err("too large");
        assert!(
            matches!(err, OracleError::InvalidResponse(ref m) if m.contains("too large")),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn undeclared_oversized_body_is_cut_off() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n".to_owned(),
            MAX_RESPONSE_BYTES * 4,
        )
        .await;
        let err = oracle(&url).resolve(&key()).await.expect_err("too large");
        assert!(
            matches!(err, OracleError::InvalidResponse(ref m) if m.contains("too large")),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn small_body_under_cap_is_parsed() {
        let body = r#"{"collateralization_percent": 150, "undercollateralized_threshold_percent": 125}"#;
        let url = serve_once(
            format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            ),
            0,
        )
        .await;
        let status = oracle(&url).resolve(&key()).await.expect("resolve");
        assert!(!status.is_unhealthy());
    }

    #[tokio::test]
    async fn unreachable_resolver_is_transient() {
        let o = oracle("http://127.0.0.1:9");
        let err = o.resolve(&key()).await.expect_err("nothing listens on port 9");
        assert!(err.is_transient());
    }
}
