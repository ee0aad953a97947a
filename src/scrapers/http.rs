//! Shared HTTP fetching for article pages and feeds.

use crate::config::HttpConfig;
use reqwest::{Client, Response};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Errors raised while fetching or parsing a page.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },
    #[error("feed could not be parsed: {0}")]
    Feed(String),
}

/// Thin wrapper over a configured [`reqwest::Client`].
///
/// Every request carries the configured browser-like User-Agent and is
/// bounded by the configured timeout. Non-2xx responses are errors.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client })
    }

    /// GET `url` and return the body decoded with the `Content-Type` charset
    /// (UTF-8 when none is declared).
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_text(&self, url: &str) -> Result<String, ExtractError> {
        let t0 = Instant::now();
        let text = self.get(url).await?.text().await?;
        debug!(%url, chars = text.chars().count(), elapsed_ms = t0.elapsed().as_millis() as u64, "Fetched");
        Ok(text)
    }

    /// GET `url` and return the raw body bytes.
    ///
    /// Used for feeds, whose XML declaration names the encoding.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ExtractError> {
        let t0 = Instant::now();
        let body = self.get(url).await?.bytes().await?;
        debug!(%url, bytes = body.len(), elapsed_ms = t0.elapsed().as_millis() as u64, "Fetched");
        Ok(body.to_vec())
    }

    async fn get(&self, url: &str) -> Result<Response, ExtractError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Non-success HTTP status");
            return Err(ExtractError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

/// A one-route HTTP server on a loopback port for fetcher tests.
#[cfg(test)]
pub(crate) mod fixture_server {
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// A running server; `requests` collects the raw request heads it saw.
    pub(crate) struct Served {
        pub base_url: String,
        pub requests: Arc<Mutex<Vec<String>>>,
    }

    impl Served {
        pub(crate) fn request_heads(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    /// Answer every connection with the same `status` line, `content_type`
    /// and `body` until the test's runtime shuts down.
    pub(crate) async fn serve(status: &'static str, content_type: &'static str, body: Vec<u8>) -> Served {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }
                seen.lock().unwrap().push(String::from_utf8_lossy(&head).into_owned());

                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.write_all(&body).await;
                let _ = socket.shutdown().await;
            }
        });

        Served { base_url, requests }
    }

    /// A loopback URL with nothing listening behind it.
    pub(crate) async fn closed_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}/feed.xml")
    }
}
