use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::signature::SIGNATURE_HEADER;
use crate::webhooks::Header;
use crate::{Envelope, Error, VartiqClient};

/// A message queued for delivery to an app's webhooks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookMessage {
    /// Message ID.
    pub id: String,
    /// App the message was sent to.
    pub app_id: String,
    /// The JSON payload as it will be delivered.
    pub payload: serde_json::Value,
    /// Hex HMAC-SHA256 signature attached to the delivery, empty if absent.
    pub signature: String,
    /// Headers attached to the delivery.
    pub headers: Vec<Header>,
    /// Whether the message has been delivered.
    pub is_delivered: bool,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateMessageBody<'a, P: ?Sized> {
    app_id: &'a str,
    payload: &'a P,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageBatch {
    #[serde(default)]
    webhook_messages: Vec<RawWebhookMessage>,
}

/// Wire form of a message. `payload` usually arrives as a JSON-encoded
/// string.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWebhookMessage {
    id: String,
    #[serde(default)]
    app: Option<String>,
    #[serde(default)]
    payload: serde_json::Value,
    #[serde(default)]
    headers: Option<Vec<Header>>,
    #[serde(default)]
    is_delivered: bool,
    #[serde(default)]
    created_at: String,
    #[serde(default)]
    updated_at: String,
}

impl RawWebhookMessage {
    fn normalize(self, requested_app_id: &str) -> Result<WebhookMessage, Error> {
        let payload = match self.payload {
            serde_json::Value::String(encoded) => serde_json::from_str(&encoded)
                .map_err(|e| Error::Deserialization(format!("failed to parse message payload: {e}")))?,
            other => other,
        };

        let headers = self.headers.unwrap_or_default();
        let signature = headers
            .iter()
            .find(|h| h.key.eq_ignore_ascii_case(SIGNATURE_HEADER))
            .map(|h| h.value.clone())
            .unwrap_or_default();

        let app_id = self
            .app
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| requested_app_id.to_string());

        Ok(WebhookMessage {
            id: self.id,
            app_id,
            payload,
            signature,
            headers,
            is_delivered: self.is_delivered,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Webhook message dispatch, obtained from [`VartiqClient::webhook_messages`].
#[derive(Debug, Clone, Copy)]
pub struct WebhookMessages<'a> {
    client: &'a VartiqClient,
}

impl<'a> WebhookMessages<'a> {
    pub(crate) fn new(client: &'a VartiqClient) -> Self {
        Self { client }
    }

    /// Send `payload` to every webhook of `app_id`.
    ///
    /// `payload` can be any serializable value. The returned message carries
    /// the payload as stored by the server and the delivery signature.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> Result<(), vartiq_client::Error> {
    /// use vartiq_client::VartiqClient;
    ///
    /// let client = VartiqClient::new("your-api-key")?;
    /// let message = client
    ///     .webhook_messages()
    ///     .create("app-id", &serde_json::json!({"hello": "world"}))
    ///     .await?;
    /// println!("{} signed {}", message.data.id, message.data.signature);
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self, payload), fields(method = "POST", path = "/webhook-messages"))]
    pub async fn create<P>(&self, app_id: &str, payload: &P) -> Result<Envelope<WebhookMessage>, Error>
    where
        P: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(&CreateMessageBody { app_id, payload })
            .map_err(|e| Error::Validation(format!("invalid message payload: {e}")))?;

        let req = self
            .client
            .request(Method::POST, "/webhook-messages")
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        let envelope: Envelope<MessageBatch> = self.client.send(req).await?;

        debug!(
            count = envelope.data.webhook_messages.len(),
            "webhook messages created"
        );

        let raw = envelope
            .data
            .webhook_messages
            .into_iter()
            .next()
            .ok_or_else(|| Error::Deserialization("response contained no webhook messages".into()))?;

        Ok(Envelope {
            data: raw.normalize(app_id)?,
            message: envelope.message,
            success: envelope.success,
        })
    }
}
