//! Network health probes for locally running services.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::StepError;

/// Timeout applied to every health probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// What a probe of an HTTP endpoint found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Health {
    /// Endpoint answered 200.
    Healthy,
    /// Endpoint answered with a non-200 status.
    Unhealthy(u16),
    /// HTTP failed but the port accepts TCP connections.
    PortOpen,
    /// Nothing is listening.
    Down,
}

impl Health {
    pub fn is_up(&self) -> bool {
        matches!(self, Health::Healthy | Health::PortOpen)
    }
}

fn client() -> Result<Client, StepError> {
    Ok(Client::builder().timeout(PROBE_TIMEOUT).build()?)
}

/// Performs a GET and returns the status code.
pub fn http_status(url: &str) -> Result<u16, StepError> {
    let response = client()?.get(url).send()?;
    Ok(response.status().as_u16())
}

/// Performs a GET and returns the body of a 200 response.
pub fn http_body(url: &str) -> Result<Option<String>, StepError> {
    let response = client()?.get(url).send()?;
    if response.status().is_success() {
        Ok(Some(response.text()?))
    } else {
        Ok(None)
    }
}

/// Returns true when `url` answers 200 within the probe timeout.
pub fn is_healthy(url: &str) -> bool {
    matches!(http_status(url), Ok(200))
}

/// Returns true when a TCP connection to `addr` succeeds.
pub fn tcp_open(addr: &str) -> bool {
    let Ok(addrs) = addr.to_socket_addrs() else {
        return false;
    };
    addrs
        .into_iter()
        .any(|sock| TcpStream::connect_timeout(&sock, PROBE_TIMEOUT).is_ok())
}

/// Probes an HTTP endpoint, falling back to a plain TCP connect.
pub fn probe(url: &str) -> Health {
    match http_status(url) {
        Ok(200) => Health::Healthy,
        Ok(status) => Health::Unhealthy(status),
        Err(err) => {
            tracing::debug!(url, error = %err, "HTTP probe failed, trying TCP");
            match host_port(url) {
                Some(addr) if tcp_open(&addr) => Health::PortOpen,
                _ => Health::Down,
            }
        }
    }
}

/// Extracts `host:port` from an HTTP(S) URL, using the scheme's default port.
pub fn host_port(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?;
    let port = url.port_or_known_default()?;
    Some(format!("{host}:{port}"))
}

/// Joins a base URL and a path without doubling slashes.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}


#[cfg(test)]
mod wiremock_tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn serve(status: u16, body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_probe_healthy_endpoint() {
        let server = serve(200, "ok").await;
        let url = format!("{}/health", server.uri());

        let health = tokio::task::spawn_blocking(move || probe(&url))
            .await
            .unwrap();

        assert_eq!(health, Health::Healthy);
    }

    #[tokio::test]
    async fn test_probe_reports_non_200_status() {
        let server = serve(503, "").await;
        let url = format!("{}/health", server.uri());

        let health = tokio::task::spawn_blocking(move || probe(&url))
            .await
            .unwrap();

        assert_eq!(health, Health::Unhealthy(503));
    }

    #[tokio::test]
    async fn test_http_body_only_for_success() {
        let server = serve(200, "alive").await;
        let ok_url = format!("{}/health", server.uri());
        let missing_url = format!("{}/nope", server.uri());

        let (body, missing) =
            tokio::task::spawn_blocking(move || (http_body(&ok_url), http_body(&missing_url)))
                .await
                .unwrap();

        assert_eq!(body.unwrap().as_deref(), Some("alive"));
        assert_eq!(missing.unwrap(), None);
    }
}
