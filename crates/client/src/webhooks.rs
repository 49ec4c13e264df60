use std::fmt;
use std::str::FromStr;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::{Envelope, Error, VartiqClient, resource_path};

/// How Vartiq authenticates itself to a webhook endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthMethod {
    /// API key sent in a custom header.
    #[serde(rename = "apiKey")]
    ApiKey,
    /// HTTP Basic authentication.
    #[serde(rename = "basic")]
    Basic,
    /// HMAC-SHA256 signature of the body, sent in a custom header.
    #[serde(rename = "hmac")]
    Hmac,
}

impl AuthMethod {
    /// Returns the wire name of the method.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ApiKey => "apiKey",
            Self::Basic => "basic",
            Self::Hmac => "hmac",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apiKey" => Ok(Self::ApiKey),
            "basic" => Ok(Self::Basic),
            "hmac" => Ok(Self::Hmac),
            other => Err(Error::Validation(format!("invalid auth method: {other}"))),
        }
    }
}

/// A single HTTP header as the API represents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Header name.
    pub key: String,
    /// Header value.
    pub value: String,
}

impl Header {
    /// Create a header.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Authentication configured on a webhook, as returned by the API.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAuth {
    /// Authentication method.
    pub method: AuthMethod,
    /// Header carrying the HMAC signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hmac_header: Option<String>,
    /// HMAC signing secret. Use it to verify deliveries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hmac_secret: Option<String>,
    /// API key value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Header carrying the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_header: Option<String>,
    /// Basic auth user name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// Basic auth password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl fmt::Debug for WebhookAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookAuth")
            .field("method", &self.method)
            .field("hmac_header", &self.hmac_header)
            .field("hmac_secret", &redacted(self.hmac_secret.as_ref()))
            .field("api_key", &redacted(self.api_key.as_ref()))
            .field("api_key_header", &self.api_key_header)
            .field("user_name", &self.user_name)
            .field("password", &redacted(self.password.as_ref()))
            .finish()
    }
}

/// A webhook endpoint registered on an app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawWebhook")]
pub struct Webhook {
    /// Webhook ID.
    pub id: String,
    /// Delivery URL.
    pub url: String,
    /// App the webhook belongs to.
    pub app_id: String,
    /// Owning company ID.
    pub company: String,
    /// Headers added to every delivery.
    pub custom_headers: Vec<Header>,
    /// Headers managed by the platform.
    pub headers: Vec<Header>,
    /// Authentication applied to deliveries, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_method: Option<WebhookAuth>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// Wire form of [`Webhook`].
///
/// The API reports `authMethod` either as a nested object or as a bare
/// method name next to flat credential fields. Both collapse into
/// [`Webhook::auth_method`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWebhook {
    id: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    app_id: String,
    #[serde(default)]
    company: String,
    #[serde(default)]
    custom_headers: Option<Vec<Header>>,
    #[serde(default)]
    headers: Option<Vec<Header>>,
    #[serde(default)]
    auth_method: Option<RawAuthMethod>,
    #[serde(default)]
    hmac_header: Option<String>,
    #[serde(default)]
    hmac_secret: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    api_key_header: Option<String>,
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    created_at: String,
    #[serde(default)]
    updated_at: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAuthMethod {
    Nested(RawAuth),
    Flat(String),
}

/// Auth settings with the method still an unchecked name.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAuth {
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    hmac_header: Option<String>,
    #[serde(default)]
    hmac_secret: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    api_key_header: Option<String>,
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

impl RawAuth {
    fn resolve(self, webhook_id: &str) -> Option<WebhookAuth> {
        let name = self.method.filter(|m| !m.is_empty())?;
        match name.parse::<AuthMethod>() {
            Ok(method) => Some(WebhookAuth {
                method,
                hmac_header: self.hmac_header,
                hmac_secret: self.hmac_secret,
                api_key: self.api_key,
                api_key_header: self.api_key_header,
                user_name: self.user_name,
                password: self.password,
            }),
            Err(_) => {
                warn!(webhook_id, method = %name, "ignoring unknown webhook auth method");
                None
            }
        }
    }
}

impl From<RawWebhook> for Webhook {
    fn from(raw: RawWebhook) -> Self {
        let auth = match raw.auth_method {
            Some(RawAuthMethod::Nested(auth)) => auth,
            Some(RawAuthMethod::Flat(name)) => RawAuth {
                method: Some(name),
                hmac_header: raw.hmac_header,
                hmac_secret: raw.hmac_secret,
                api_key: raw.api_key,
                api_key_header: raw.api_key_header,
                user_name: raw.user_name,
                password: raw.password,
            },
            None => RawAuth::default(),
        };
        let auth_method = auth.resolve(&raw.id);

        Self {
            id: raw.id,
            url: raw.url,
            app_id: raw.app_id,
            company: raw.company,
            custom_headers: raw.custom_headers.unwrap_or_default(),
            headers: raw.headers.unwrap_or_default(),
            auth_method,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        }
    }
}

/// Request body for registering a webhook.
///
/// Authentication is expressed with an `authMethod` name and flat credential
/// fields. [`Webhooks::create`] checks that the fields required by the chosen
/// method are present before sending anything.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWebhookRequest {
    /// Delivery URL.
    pub url: String,
    /// App the webhook belongs to.
    pub app_id: String,
    /// Headers added to every delivery.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_headers: Vec<Header>,
    /// `basic`, `hmac` or `apiKey`; `None` for no authentication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_method: Option<String>,
    /// Basic auth user name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// Basic auth password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// API key value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Header carrying the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_header: Option<String>,
    /// Header carrying the HMAC signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hmac_header: Option<String>,
    /// HMAC signing secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hmac_secret: Option<String>,
}

impl CreateWebhookRequest {
    /// Create an unauthenticated webhook request for `url` on `app_id`.
    pub fn new(url: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            app_id: app_id.into(),
            ..Default::default()
        }
    }

    /// Add a custom header sent with every delivery.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push(Header::new(key, value));
        self
    }

    /// Authenticate deliveries with HTTP Basic auth.
    #[must_use]
    pub fn with_basic_auth(mut self, user_name: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth_method = Some(AuthMethod::Basic.as_str().to_string());
        self.user_name = Some(user_name.into());
        self.password = Some(password.into());
        self
    }

    /// Sign deliveries with HMAC-SHA256 in header `header`.
    #[must_use]
    pub fn with_hmac_auth(mut self, header: impl Into<String>, secret: impl Into<String>) -> Self {
        self.auth_method = Some(AuthMethod::Hmac.as_str().to_string());
        self.hmac_header = Some(header.into());
        self.hmac_secret = Some(secret.into());
        self
    }

    /// Send an API key in header `header` with every delivery.
    #[must_use]
    pub fn with_api_key_auth(mut self, api_key: impl Into<String>, header: impl Into<String>) -> Self {
        self.auth_method = Some(AuthMethod::ApiKey.as_str().to_string());
        self.api_key = Some(api_key.into());
        self.api_key_header = Some(header.into());
        self
    }

    /// Check that the fields required by the declared auth method are set.
    ///
    /// Returns the parsed method, or `None` when no authentication is
    /// configured.
    pub fn validate(&self) -> Result<Option<AuthMethod>, Error> {
        let Some(name) = self.auth_method.as_deref().filter(|m| !m.is_empty()) else {
            return Ok(None);
        };

        let method: AuthMethod = name.parse()?;
        let complete = match method {
            AuthMethod::Basic => present(self.user_name.as_ref()) && present(self.password.as_ref()),
            AuthMethod::Hmac => present(self.hmac_header.as_ref()) && present(self.hmac_secret.as_ref()),
            AuthMethod::ApiKey => present(self.api_key.as_ref()) && present(self.api_key_header.as_ref()),
        };

        if complete {
            Ok(Some(method))
        } else {
            Err(Error::Validation(missing_fields_message(method).to_string()))
        }
    }
}

impl fmt::Debug for CreateWebhookRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateWebhookRequest")
            .field("url", &self.url)
            .field("app_id", &self.app_id)
            .field("custom_headers", &self.custom_headers)
            .field("auth_method", &self.auth_method)
            .field("user_name", &self.user_name)
            .field("password", &redacted(self.password.as_ref()))
            .field("api_key", &redacted(self.api_key.as_ref()))
            .field("api_key_header", &self.api_key_header)
            .field("hmac_header", &self.hmac_header)
            .field("hmac_secret", &redacted(self.hmac_secret.as_ref()))
            .finish()
    }
}

/// Partial update for a webhook. Unset fields are left unchanged.
///
/// Not validated locally: the server may keep stored credentials when only
/// some auth fields change.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWebhookRequest {
    /// New delivery URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Replacement custom headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_headers: Option<Vec<Header>>,
    /// New auth method name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_method: Option<String>,
    /// Basic auth user name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// Basic auth password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// API key value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Header carrying the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_header: Option<String>,
    /// Header carrying the HMAC signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hmac_header: Option<String>,
    /// HMAC signing secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hmac_secret: Option<String>,
}

impl fmt::Debug for UpdateWebhookRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateWebhookRequest")
            .field("url", &self.url)
            .field("custom_headers", &self.custom_headers)
            .field("auth_method", &self.auth_method)
            .field("user_name", &self.user_name)
            .field("password", &redacted(self.password.as_ref()))
            .field("api_key", &redacted(self.api_key.as_ref()))
            .field("api_key_header", &self.api_key_header)
            .field("hmac_header", &self.hmac_header)
            .field("hmac_secret", &redacted(self.hmac_secret.as_ref()))
            .finish()
    }
}

fn present(field: Option<&String>) -> bool {
    field.is_some_and(|v| !v.is_empty())
}

fn missing_fields_message(method: AuthMethod) -> &'static str {
    match method {
        AuthMethod::Basic => "basic auth requires username and password",
        AuthMethod::Hmac => "hmac auth requires header name and secret",
        AuthMethod::ApiKey => "apiKey auth requires key and header name",
    }
}

fn redacted(value: Option<&String>) -> Option<&'static str> {
    value.map(|_| "[REDACTED]")
}

/// Webhook operations, obtained from [`VartiqClient::webhooks`].
#[derive(Debug, Clone, Copy)]
pub struct Webhooks<'a> {
    client: &'a VartiqClient,
}

impl<'a> Webhooks<'a> {
    pub(crate) fn new(client: &'a VartiqClient) -> Self {
        Self { client }
    }

    /// Register a webhook.
    ///
    /// The auth fields are validated first; an incomplete request fails with
    /// [`Error::Validation`] and nothing is sent.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> Result<(), vartiq_client::Error> {
    /// use vartiq_client::{CreateWebhookRequest, VartiqClient};
    ///
    /// let client = VartiqClient::new("your-api-key")?;
    /// let request = CreateWebhookRequest::new("https://example.com/hooks", "app-id")
    ///     .with_hmac_auth("X-Signature", "whsec")
    ///     .with_header("X-Env", "prod");
    /// let webhook = client.webhooks().create(&request).await?;
    /// println!("Registered {}", webhook.data.id);
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip_all, fields(method = "POST", path = "/webhooks", app_id = %request.app_id))]
    pub async fn create(&self, request: &CreateWebhookRequest) -> Result<Envelope<Webhook>, Error> {
        if let Err(e) = request.validate() {
            warn!(error = %e, "rejected webhook request before sending");
            return Err(e);
        }

        let req = self.client.request(Method::POST, "/webhooks").json(request);
        self.client.send(req).await
    }

    /// List the webhooks of an app.
    #[instrument(skip(self), fields(method = "GET", path = "/webhooks"))]
    pub async fn list(&self, app_id: &str) -> Result<Envelope<Vec<Webhook>>, Error> {
        let req = self
            .client
            .request(Method::GET, "/webhooks")
            .query(&[("appId", app_id)]);
        self.client.send(req).await
    }

    /// Get a webhook by ID.
    #[instrument(skip(self), fields(method = "GET"))]
    pub async fn get(&self, webhook_id: &str) -> Result<Envelope<Webhook>, Error> {
        let req = self
            .client
            .request(Method::GET, &resource_path("webhooks", webhook_id));
        self.client.send(req).await
    }

    /// Update a webhook by ID.
    #[instrument(skip(self, request), fields(method = "PUT"))]
    pub async fn update(
        &self,
        webhook_id: &str,
        request: &UpdateWebhookRequest,
    ) -> Result<Envelope<Webhook>, Error> {
        let req = self
            .client
            .request(Method::PUT, &resource_path("webhooks", webhook_id))
            .json(request);
        self.client.send(req).await
    }

    /// Delete a webhook by ID.
    #[instrument(skip(self), fields(method = "DELETE"))]
    pub async fn delete(&self, webhook_id: &str) -> Result<(), Error> {
        let req = self
            .client
            .request(Method::DELETE, &resource_path("webhooks", webhook_id));
        self.client.send_unit(req).await
    }
}
