//! Vartiq HTTP Client
//!
//! A native Rust client for the Vartiq webhook delivery API: manage projects,
//! apps and webhooks, dispatch webhook messages, and verify the signatures
//! of deliveries you receive.
//!
//! # Quick Start
//!
//! ```no_run
//! use vartiq_client::{CreateProjectRequest, VartiqClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), vartiq_client::Error> {
//!     let client = VartiqClient::new("your-api-key")?;
//!
//!     let project = client
//!         .projects()
//!         .create(&CreateProjectRequest::new("Billing", "Invoice events"))
//!         .await?;
//!     println!("Created project {}", project.data.id);
//!
//!     let message = client
//!         .webhook_messages()
//!         .create("app-id", &serde_json::json!({"event": "invoice.paid"}))
//!         .await?;
//!     println!("Signature: {}", message.data.signature);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Verifying deliveries
//!
//! Signature checks are pure and need no client:
//!
//! ```
//! use vartiq_client::signature::{self, SignatureError};
//!
//! let body = b"{\"event\":\"invoice.paid\"}";
//! let header = signature::sign(body, b"secret").unwrap();
//!
//! assert!(signature::verify(body, &header, b"secret").is_ok());
//! assert_eq!(
//!     signature::verify(body, &header, b"wrong"),
//!     Err(SignatureError::VerificationFailed),
//! );
//! ```
//!
//! # Configuration
//!
//! ```no_run
//! use vartiq_client::VartiqClientBuilder;
//! use std::time::Duration;
//!
//! let client = VartiqClientBuilder::new("your-api-key")
//!     .base_url("https://api.eu.example.com")
//!     .timeout(Duration::from_secs(10))
//!     .build()
//!     .unwrap();
//! ```
//!
//! Requests are cancelled by dropping their future; the configured timeout
//! surfaces as an [`Error::Connection`] for which [`Error::is_timeout`] is
//! `true`. The client never retries.

mod apps;
mod config;
mod envelope;
mod error;
mod projects;
pub mod signature;
#[cfg(test)]
mod test_support;
mod webhook_messages;
mod webhooks;

pub use apps::{App, Apps, CreateAppRequest, UpdateAppRequest};
pub use config::ClientConfig;
pub use envelope::Envelope;
pub use error::Error;
pub use projects::{CreateProjectRequest, Project, Projects, UpdateProjectRequest};
pub use signature::{SIGNATURE_HEADER, SignatureError};
pub use webhook_messages::{WebhookMessage, WebhookMessages};
pub use webhooks::{
    AuthMethod, CreateWebhookRequest, Header, UpdateWebhookRequest, Webhook, WebhookAuth,
    Webhooks,
};

use std::time::Duration;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Production API host.
pub const DEFAULT_BASE_URL: &str = "https://api.us.vartiq.com";

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Characters escaped when an id is placed in a URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// HTTP client for the Vartiq API.
///
/// Holds the shared, read-only transport configuration. Cloning is cheap and
/// shares the connection pool. Resource operations live on the service
/// handles returned by [`projects`](Self::projects), [`apps`](Self::apps),
/// [`webhooks`](Self::webhooks) and
/// [`webhook_messages`](Self::webhook_messages).
#[derive(Clone)]
pub struct VartiqClient {
    client: Client,
    base_url: String,
    api_key: String,
}

/// Builder for configuring a [`VartiqClient`].
#[derive(Debug)]
pub struct VartiqClientBuilder {
    api_key: String,
    base_url: String,
    timeout: Duration,
    client: Option<Client>,
}

impl VartiqClientBuilder {
    /// Create a new builder targeting the production API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            client: None,
        }
    }

    /// Set the API base URL. A trailing `/` is ignored.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a custom reqwest Client.
    ///
    /// Useful for configuring TLS, proxies, or other advanced settings. The
    /// builder's timeout is not applied to a custom client.
    #[must_use]
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<VartiqClient, Error> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Configuration("API key must not be empty".into()));
        }
        reqwest::Url::parse(&self.base_url)
            .map_err(|e| Error::Configuration(format!("invalid base URL {:?}: {e}", self.base_url)))?;

        let client = match self.client {
            Some(c) => c,
            None => Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| Error::Configuration(e.to_string()))?,
        };

        Ok(VartiqClient {
            client,
            base_url: self.base_url,
            api_key: self.api_key,
        })
    }
}

impl VartiqClient {
    /// Create a client for the production API with default settings.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use vartiq_client::VartiqClient;
    ///
    /// let client = VartiqClient::new("your-api-key").unwrap();
    /// ```
    pub fn new(api_key: impl Into<String>) -> Result<Self, Error> {
        VartiqClientBuilder::new(api_key).build()
    }

    /// Create a builder for advanced configuration.
    pub fn builder(api_key: impl Into<String>) -> VartiqClientBuilder {
        VartiqClientBuilder::new(api_key)
    }

    /// Create a client from a [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, Error> {
        let mut builder = VartiqClientBuilder::new(&config.api_key).base_url(&config.base_url);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        builder.build()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Project operations.
    pub fn projects(&self) -> Projects<'_> {
        Projects::new(self)
    }

    /// App operations.
    pub fn apps(&self) -> Apps<'_> {
        Apps::new(self)
    }

    /// Webhook operations.
    pub fn webhooks(&self) -> Webhooks<'_> {
        Webhooks::new(self)
    }

    /// Webhook message dispatch.
    pub fn webhook_messages(&self) -> WebhookMessages<'_> {
        WebhookMessages::new(self)
    }

    /// Verify the signature of a received webhook delivery.
    ///
    /// Same as [`signature::verify`]; provided on the client for
    /// convenience. `secret` is the secret configured on the webhook.
    pub fn verify<'a>(
        &self,
        payload: &'a [u8],
        signature: &str,
        secret: &str,
    ) -> Result<&'a [u8], SignatureError> {
        signature::verify(payload, signature, secret.as_bytes())
    }

    // =========================================================================
    // Transport
    // =========================================================================

    /// Start a request against `path`, with the API key attached.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header(API_KEY_HEADER, &self.api_key)
    }

    /// Send a request and decode the response envelope.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Envelope<T>, Error> {
        let (status, body) = Self::execute(request).await?;
        envelope::decode(status, &body).inspect_err(|e| warn!(error = %e, "request failed"))
    }

    /// Send a request whose response payload is not needed.
    pub(crate) async fn send_unit(&self, request: RequestBuilder) -> Result<(), Error> {
        let (status, body) = Self::execute(request).await?;
        envelope::check(status, &body).inspect_err(|e| warn!(error = %e, "request failed"))
    }

    async fn execute(request: RequestBuilder) -> Result<(StatusCode, String), Error> {
        let response = request.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), "received response");
        let body = response.text().await?;
        Ok((status, body))
    }
}

impl std::fmt::Debug for VartiqClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VartiqClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Build `/{collection}/{id}` with `id` escaped as a single path segment.
pub(crate) fn resource_path(collection: &str, id: &str) -> String {
    format!("/{collection}/{}", utf8_percent_encode(id, PATH_SEGMENT))
}
