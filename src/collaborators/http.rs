// ABOUTME: HTTP health probe over a plain hyper http1 connection.
// ABOUTME: A 2xx response is healthy; any other status is unhealthy.

use async_trait::async_trait;
use hyper::Uri;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use super::traits::{HealthProbe, ProbeError};
use crate::config::Settings;

/// Probes `healthcheck.url` with a single GET per attempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpHealthProbe;

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn probe(&self, settings: &Settings) -> Result<bool, ProbeError> {
        let timeout = settings.probe_timeout();
        match tokio::time::timeout(timeout, get(&settings.healthcheck.url)).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout(timeout)),
        }
    }
}

/// Issue `GET url` and report whether the status was 2xx.
pub async fn get(url: &str) -> Result<bool, ProbeError> {
    let uri: Uri = url
        .parse()
        .map_err(|_| ProbeError::InvalidUrl(url.to_string()))?;
    match uri.scheme_str() {
        Some("http") => {}
        Some(_) => return Err(ProbeError::UnsupportedScheme(url.to_string())),
        None => return Err(ProbeError::InvalidUrl(url.to_string())),
    }
    let host = uri
        .host()
        .ok_or_else(|| ProbeError::InvalidUrl(url.to_string()))?;
    let port = uri.port_u16().unwrap_or(80);
    let authority = uri
        .authority()
        .map(|a| a.as_str().to_string())
        .unwrap_or_else(|| host.to_string());
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    // IPv6 literals keep their brackets in the URI.
    let addr_host = host.trim_start_matches('[').trim_end_matches(']');
    let stream = TcpStream::connect((addr_host, port))
        .await
        .map_err(|e| ProbeError::Connection(format!("{host}:{port}: {e}")))?;
    let io = TokioIo::new(stream);

    let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
        .await
        .map_err(|e| ProbeError::Http(format!("HTTP handshake failed: {}", e)))?;

    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::debug!("health probe connection error: {}", e);
        }
    });

    let req = hyper::Request::builder()
        .method("GET")
        .uri(path)
        .header("Host", authority)
        .header("User-Agent", concat!("rollout/", env!("CARGO_PKG_VERSION")))
        .body(http_body_util::Empty::<bytes::Bytes>::new())
        .map_err(|e| ProbeError::Http(format!("failed to build request: {}", e)))?;

    let resp = sender
        .send_request(req)
        .await
        .map_err(|e| ProbeError::Http(format!("request failed: {}", e)))?;

    let status = resp.status();
    tracing::debug!("health probe {} -> {}", url, status);
    Ok(status.is_success())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_https_urls() {
        let err = get("https://localhost/health").await.unwrap_err();
        assert!(matches!(err, ProbeError::UnsupportedScheme(_)));
        assert!(err.to_string().contains("TLS is not supported"), "{err}");
    }

    #[tokio::test]
    async fn rejects_garbage() {
        let err = get("not a url").await.unwrap_err();
        assert!(matches!(err, ProbeError::InvalidUrl(_)));
    }
}
