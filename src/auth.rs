//! Authentication providers for Microsoft Graph.
//!
//! A [`HeaderProvider`] turns app-registration credentials into the HTTP
//! headers every Graph call needs. The client never looks inside those
//! headers; it stores whatever the provider returns and attaches it to each
//! request.
//!
//! Two providers ship with the crate:
//!
//! - [`ClientCredentialsProvider`] — OAuth2 client-credentials grant against
//!   the Azure AD v2.0 token endpoint.
//! - [`StaticHeaderProvider`] — a fixed mapping, for callers that already
//!   hold a token (and for tests).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::future::Future;
use std::time::Duration;

/// Header name → value mapping produced by a provider.
pub type HeaderMapping = BTreeMap<String, String>;

/// Error type returned by providers. Wrapped into `GraphError::Auth` by
/// the client.
pub type ProviderError = Box<dyn Error + Send + Sync>;

/// Azure AD v2.0 token endpoint. `{tenant_id}` is replaced at runtime.
const TOKEN_URL: &str = "https://login.microsoftonline.com/{tenant_id}/oauth2/v2.0/token";

/// Application-permission scope for Microsoft Graph.
pub const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Token requests are small; 30 seconds covers a slow Azure AD round-trip.
const TOKEN_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Produces authentication headers for Graph from app-registration
/// credentials.
pub trait HeaderProvider {
    /// Returns the headers to attach to subsequent Graph requests
    /// (normally just `Authorization: Bearer ...`).
    fn graph_headers(
        &self,
        tenant_id: &str,
        client_id: &str,
        client_secret: &str,
    ) -> impl Future<Output = Result<HeaderMapping, ProviderError>> + Send;
}

/// Form body sent to the token endpoint.
/// Serialized as `application/x-www-form-urlencoded` by reqwest's `.form()`.
#[derive(Serialize)]
pub struct TokenRequest<'a> {
    client_id: &'a str,
    scope: &'a str,
    client_secret: &'a str,
    grant_type: &'a str,
}

/// Subset of the Azure AD token response that we need.
/// Extra fields such as `ext_expires_in` are ignored.
#[derive(Deserialize)]
pub struct TokenResponse {
    /// The bearer token itself.
    pub access_token: String,
    /// Token scheme, `Bearer` for client credentials.
    pub token_type: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
}

/// OAuth2 client-credentials provider for the Microsoft identity platform.
///
/// Every call to [`HeaderProvider::graph_headers`] fetches a fresh token;
/// there is no caching, since the client only authenticates when asked to.
pub struct ClientCredentialsProvider {
    client: reqwest::Client,
    token_url: String,
    scope: String,
}

impl ClientCredentialsProvider {
    /// Creates a provider targeting the public Azure AD endpoint with the
    /// Graph `.default` scope.
    pub fn new() -> crate::error::Result<Self> {
        Self::with_token_url(TOKEN_URL)
    }

    /// Creates a provider with a custom token URL template. `{tenant_id}`
    /// in the template is substituted per request. Used by tests to point
    /// at a local mock server.
    pub fn with_token_url(token_url: &str) -> crate::error::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(TOKEN_REQUEST_TIMEOUT)
            .build()?;
        Ok(ClientCredentialsProvider {
            client,
            token_url: token_url.to_string(),
            scope: GRAPH_SCOPE.to_string(),
        })
    }

    /// Overrides the requested scope.
    pub fn scope(mut self, scope: &str) -> Self {
        self.scope = scope.to_string();
        self
    }

    fn token_url_for(&self, tenant_id: &str) -> String {
        self.token_url.replace("{tenant_id}", tenant_id)
    }

    /// Fetches a token from Azure AD.
    ///
    /// The body is read as text before the status check so that a failure
    /// keeps Azure AD's AADSTS message.
    pub async fn fetch_token(
        &self,
        tenant_id: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<TokenResponse, ProviderError> {
        let form = TokenRequest {
            client_id,
            scope: &self.scope,
            client_secret,
            grant_type: "client_credentials",
        };

        let response = self
            .client
            .post(self.token_url_for(tenant_id))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(format!("Token request failed ({status}): {body}").into());
        }

        Ok(serde_json::from_str(&body)?)
    }
}

impl HeaderProvider for ClientCredentialsProvider {
    async fn graph_headers(
        &self,
        tenant_id: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<HeaderMapping, ProviderError> {
        let token = self.fetch_token(tenant_id, client_id, client_secret).await?;
        Ok(bearer_mapping(&token.access_token))
    }
}

/// Provider that hands back the same headers every time.
#[derive(Debug, Clone, Default)]
pub struct StaticHeaderProvider {
    headers: HeaderMapping,
}

impl StaticHeaderProvider {
    /// Provider returning `headers` unchanged.
    pub fn new(headers: HeaderMapping) -> Self {
        StaticHeaderProvider { headers }
    }

    /// `Authorization: Bearer <token>`.
    pub fn bearer(token: &str) -> Self {
        StaticHeaderProvider::new(bearer_mapping(token))
    }
}

impl HeaderProvider for StaticHeaderProvider {
    async fn graph_headers(
        &self,
        _tenant_id: &str,
        _client_id: &str,
        _client_secret: &str,
    ) -> Result<HeaderMapping, ProviderError> {
        Ok(self.headers.clone())
    }
}

fn bearer_mapping(token: &str) -> HeaderMapping {
    HeaderMapping::from([("Authorization".to_string(), format!("Bearer {token}"))])
}
