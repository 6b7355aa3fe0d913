//! Session-holding HTTP client for Microsoft Graph.
//!
//! `GraphClient` wraps a `reqwest::Client`, the Graph base URL, and the
//! session headers produced by [`GraphClient::authenticate`]. Every
//! operation in [`crate::users`], [`crate::groups`] and
//! [`crate::identity_protection`] goes through [`GraphClient::send`], which
//! enforces the single-success-status contract.
//!
//! Paths are passed as segment lists and each segment is percent-encoded,
//! so identifiers such as guest UPNs (`alice_contoso.com#EXT#@fabrikam.onmicrosoft.com`)
//! stay inside their own segment instead of turning into a URL fragment.
//!
//! Session lifecycle:
//! - The header set starts EMPTY. Operations issued before a successful
//!   `authenticate` are sent without credentials and will normally come
//!   back as `GraphError::Api` with status 401. Use
//!   [`GraphClient::is_authenticated`] to check first.
//! - `authenticate` replaces the whole header set atomically. Requests
//!   already in flight keep the snapshot they started with.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::auth::{HeaderMapping, HeaderProvider};
use crate::error::{GraphError, Result};

/// Microsoft Graph v1.0 endpoint.
pub const BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Authenticated HTTP client for the Graph REST API.
///
/// `base_url` is configurable so tests can point it at a wiremock server.
pub struct GraphClient {
    client: Client,
    base_url: Url,
    headers: RwLock<HeaderMap>,
}

impl GraphClient {
    /// Client against the public Graph endpoint with reqwest's defaults.
    pub fn new() -> Result<Self> {
        Self::with_base_url(BASE_URL)
    }

    /// Client against a custom base URL (a trailing slash is optional).
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = Client::builder().build()?;
        Self::with_http_client(client, base_url)
    }

    /// Client using a caller-supplied `reqwest::Client`, so its timeouts,
    /// proxies and TLS settings apply to every Graph call.
    ///
    /// # Errors
    ///
    /// - `GraphError::Url` — `base_url` is not an absolute hierarchical URL.
    pub fn with_http_client(client: Client, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(GraphError::Url(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        Ok(GraphClient {
            client,
            base_url,
            headers: RwLock::new(HeaderMap::new()),
        })
    }

    /// The Graph root every request path is appended to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    pub fn url_for(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Obtains session headers from `provider` and stores them on the client.
    ///
    /// Any provider failure, or a header the provider returned that is not
    /// legal HTTP, becomes `GraphError::Auth` (status 401). Single attempt.
    pub async fn authenticate<P: HeaderProvider>(
        &self,
        provider: &P,
        tenant_id: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<HeaderMapping> {
        let mapping = provider
            .graph_headers(tenant_id, client_id, client_secret)
            .await
            .map_err(|e| GraphError::Auth {
                message: format!("Authentication failed. Error: {e}"),
                source: Some(e),
            })?;

        let headers = to_header_map(&mapping)?;
        *self.headers.write().await = headers;
        info!(tenant_id, header_count = mapping.len(), "authenticated to Microsoft Graph");

        Ok(mapping)
    }

    /// Whether a session header set has been installed.
    pub async fn is_authenticated(&self) -> bool {
        !self.headers.read().await.is_empty()
    }

    /// Sends one request and checks the response status.
    ///
    /// `path` lists the segments appended to the base URL. Returns the raw
    /// body text when the status equals `expected`; any other status
    /// (including a different 2xx) becomes `GraphError::Api` with the body
    /// preserved.
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &[&str],
        query: &[(&str, &str)],
        body: Option<&B>,
        expected: StatusCode,
    ) -> Result<String> {
        let url = self.url_for(path);
        // Snapshot so the lock is not held across the network round-trip.
        let headers = self.headers.read().await.clone();

        debug!(%method, %url, expected = expected.as_u16(), "sending Graph request");

        let mut req = self.client.request(method.clone(), url.clone()).headers(headers);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(payload) = body {
            req = req.json(payload);
        }

        let resp = req.send().await?;
        let status = resp.status();

        if status != expected {
            // The status is the error; a body that cannot be read stays empty.
            let body = resp.text().await.unwrap_or_default();
            warn!(%method, %url, status = status.as_u16(), expected = expected.as_u16(), "unexpected Graph response status");
            return Err(GraphError::Api { status, body });
        }

        Ok(resp.text().await?)
    }

    /// GET expecting 200, deserializing the JSON body.
    pub async fn get<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T> {
        self.get_with_query(path, &[]).await
    }

    /// GET with query parameters, expecting 200.
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &[&str],
        query: &[(&str, &str)],
    ) -> Result<T> {
        let text = self
            .send::<()>(Method::GET, path, query, None, StatusCode::OK)
            .await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// PATCH with a JSON body; the response body is discarded.
    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        path: &[&str],
        body: &B,
        expected: StatusCode,
    ) -> Result<()> {
        self.send(Method::PATCH, path, &[], Some(body), expected)
            .await
            .map(drop)
    }

    /// POST with an optional JSON body; the response body is discarded.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &[&str],
        body: Option<&B>,
        expected: StatusCode,
    ) -> Result<()> {
        self.send(Method::POST, path, &[], body, expected)
            .await
            .map(drop)
    }

    /// DELETE; the response body is discarded.
    pub async fn delete(&self, path: &[&str], expected: StatusCode) -> Result<()> {
        self.send::<()>(Method::DELETE, path, &[], None, expected)
            .await
            .map(drop)
    }
}

/// Validates a provider mapping as HTTP headers.
fn to_header_map(mapping: &HeaderMapping) -> Result<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(mapping.len());
    for (name, value) in mapping {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| GraphError::Auth {
            message: format!("Authentication failed. Error: invalid header name '{name}'"),
            source: Some(Box::new(e)),
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| GraphError::Auth {
            message: format!("Authentication failed. Error: invalid value for header '{name}'"),
            source: Some(Box::new(e)),
        })?;
        headers.insert(name, value);
    }
    Ok(headers)
}
