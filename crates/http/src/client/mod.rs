//! Marketplace HTTP client
//!
//! Every request built through [`MarketClient::request`] passes through a single
//! outbound interceptor that attaches the bearer token published by the
//! configured [`TokenSource`]. Callers never set the `Authorization` header
//! themselves.

pub mod applications;
pub mod auth;
pub mod catalog;
pub mod error;
pub mod jobs;
pub mod skills;
pub mod users;

use error::ClientError;
use reqwest::{Client, ClientBuilder, StatusCode, header};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Path of the token validation endpoint, relative to the base URL
pub const VALIDATE_PATH: &str = "/auth/validate";

/// Default base URL of the marketplace API
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Default network timeout applied on native targets
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Supplies the bearer token for outgoing requests
///
/// Implemented by the session layer. The client only reads tokens, with one
/// exception: a 401 from [`VALIDATE_PATH`] means the stored credentials are
/// dead, and the source is told to drop them before the error reaches the
/// caller.
pub trait TokenSource: Send + Sync {
    /// Token to attach, if any
    fn bearer_token(&self) -> Option<String>;

    /// Called when the validation endpoint rejected the current token
    fn validation_rejected(&self);
}

/// Marketplace API client
#[derive(Clone)]
pub struct MarketClient {
    client: Client,
    base_url: String,
    tokens: Option<Arc<dyn TokenSource>>,
}

impl fmt::Debug for MarketClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarketClient")
            .field("base_url", &self.base_url)
            .field("has_token_source", &self.tokens.is_some())
            .finish()
    }
}

impl MarketClient {
    /// Create a new client with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> MarketClientBuilder {
        MarketClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Same client, reading tokens from `tokens`
    pub fn with_token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Create a request builder, attaching the current bearer token if there is one
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let token = self.tokens.as_ref().and_then(|tokens| tokens.bearer_token());
        self.build_request(method, path, token.as_deref())
    }

    /// Create a request builder carrying an explicit token instead of the current one
    pub fn request_with_token(
        &self,
        method: reqwest::Method,
        path: &str,
        token: &str,
    ) -> reqwest::RequestBuilder {
        self.build_request(method, path, Some(token))
    }

    fn build_request(
        &self,
        method: reqwest::Method,
        path: &str,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let request = self.client.request(method, url);

        match token {
            Some(token) => request.header(header::AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }

    /// Execute a request and decode its JSON body
    ///
    /// A body that does not match `T` fails with [`ClientError::Serialization`].
    pub async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Execute a request whose response body is irrelevant
    pub async fn execute_empty(&self, request: reqwest::RequestBuilder) -> Result<(), ClientError> {
        self.send(request).await.map(|_| ())
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        let request = request.build()?;
        let method = request.method().clone();
        let url = request.url().clone();

        let response = self.client.execute(request).await?;
        let status = response.status();

        if status.is_success() {
            debug!(%method, %url, %status, "API request succeeded");
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_else(|_| status.to_string());
        warn!(%method, %url, %status, body = %message, "API request failed");

        if status == StatusCode::UNAUTHORIZED && url.path().ends_with(VALIDATE_PATH) {
            if let Some(tokens) = &self.tokens {
                debug!("Validation endpoint rejected the token, clearing stored credentials");
                tokens.validation_rejected();
            }
        }

        Err(ClientError::from_status(status, message))
    }
}

/// Builder for MarketClient
#[derive(Default)]
pub struct MarketClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    tokens: Option<Arc<dyn TokenSource>>,
}

impl MarketClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout (ignored on wasm32, where the browser owns timeouts)
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set the source of bearer tokens
    pub fn token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<MarketClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Configuration("base_url must not be empty".into()));
        }

        let mut client_builder = ClientBuilder::new();

        #[cfg(not(target_arch = "wasm32"))]
        {
            client_builder = client_builder.timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT));
        }

        #[cfg(target_arch = "wasm32")]
        let _ = self.timeout;

        if let Some(user_agent) = self.user_agent {
            client_builder = client_builder.user_agent(user_agent);
        } else {
            client_builder = client_builder.user_agent(concat!(
                "jobboard-client/",
                env!("CARGO_PKG_VERSION")
            ));
        }

        let client = client_builder.build()?;

        Ok(MarketClient {
            client,
            base_url,
            tokens: self.tokens,
        })
    }
}
