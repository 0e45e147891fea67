// src/blockchain/transport.rs
//! Network transport to the ledger.
//!
//! [`Transport`] is the only seam between the client and the network: it
//! takes a finished request body and returns the ledger's raw response text.
//! [`ProxyTransport`] talks HTTP to an indy-vdr-proxy, which relays requests
//! to the validator pool and handles consensus on the way back.

use std::future::Future;

use log::{debug, warn};
use reqwest::{header, Client, Response};
use url::Url;

use crate::error::TransportError;

/// Delivers request bodies to the ledger.
pub trait Transport: Send + Sync {
    /// Sends one JSON request and returns the raw response.
    fn submit(&self, body: String) -> impl Future<Output = Result<String, TransportError>> + Send;

    /// Fetches the pool's genesis transactions.
    fn genesis(&self) -> impl Future<Output = Result<String, TransportError>> + Send;
}

/// HTTP transport to an indy-vdr-proxy.
///
/// Requests are posted to `{base}/submit`; genesis is read from `{base}/genesis`.
#[derive(Clone, Debug)]
pub struct ProxyTransport {
    /// Shared HTTP client (connection pooled)
    client: Client,
    /// Proxy base URL, always ending in `/`
    base_url: Url,
}

impl ProxyTransport {
    /// Creates a transport for the proxy at `base_url`.
    ///
    /// # Arguments
    /// * `base_url` - Proxy root, e.g. `http://localhost:3030`. A trailing
    ///   slash is added when missing so that path joins stay under it.
    ///
    /// # Errors
    /// [`TransportError::Url`] if `base_url` does not parse.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self, TransportError> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_owned()
        } else {
            format!("{base_url}/")
        };

        Ok(ProxyTransport {
            client,
            base_url: Url::parse(&normalized)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

/// Turns a non-2xx response into [`TransportError::Status`] carrying the body.
async fn read_body(response: Response) -> Result<String, TransportError> {
    let status = response.status();
    if !status.is_success() {
        let text = error_body(response.text().await);
        warn!("Ledger proxy answered {}: {}", status, text);
        return Err(TransportError::Status(status.as_u16(), text));
    }
    Ok(response.text().await?)
}

/// Body text of an error response. A body that cannot be read is replaced
/// by a note naming the read failure.
fn error_body<E: std::fmt::Display>(text: Result<String, E>) -> String {
    text.unwrap_or_else(|e| {
        warn!("Could not read error response body: {}", e);
        format!("<unreadable body: {}>", e)
    })
}

impl Transport for ProxyTransport {
    async fn submit(&self, body: String) -> Result<String, TransportError> {
        let url = self.base_url.join("submit")?;
        debug!("Posting {} byte request to {}", body.len(), url);

        let response = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        read_body(response).await
    }

    async fn genesis(&self) -> Result<String, TransportError> {
        let url = self.base_url.join("genesis")?;
        debug!("Fetching genesis from {}", url);

        let response = self.client.get(url).send().await?;
        read_body(response).await
    }
}
