//! The `{data, message, success}` wrapper every API response uses.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Successful API response.
///
/// Envelopes with `success: false` never reach the caller; they are turned
/// into [`Error::Api`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Response payload.
    pub data: T,
    /// Human-readable status message from the server.
    #[serde(default)]
    pub message: String,
    /// Always `true` for envelopes returned by the client.
    pub success: bool,
}

impl<T> Envelope<T> {
    /// Consume the envelope and return its payload.
    pub fn into_data(self) -> T {
        self.data
    }
}

/// Envelope with an untyped payload, decoded before the payload is trusted.
#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    data: serde_json::Value,
    #[serde(default)]
    message: String,
    #[serde(default)]
    success: bool,
}

/// Decode a response body into an envelope of `T`.
pub(crate) fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<Envelope<T>, Error> {
    let raw = decode_raw(status, body)?;
    let data = serde_json::from_value(raw.data)
        .map_err(|e| Error::Deserialization(e.to_string()))?;
    Ok(Envelope {
        data,
        message: raw.message,
        success: raw.success,
    })
}

/// Check the outcome of a request whose payload the caller does not need.
///
/// A 2xx counts as success unless its body is an envelope with
/// `success: false`, which surfaces as [`Error::Api`]. Empty and non-JSON
/// bodies are accepted.
pub(crate) fn check(status: StatusCode, body: &str) -> Result<(), Error> {
    if status.is_success() {
        let rejected = serde_json::from_str::<Outcome>(body)
            .is_ok_and(|outcome| outcome.success == Some(false));
        if !rejected {
            return Ok(());
        }
    }
    decode_raw(status, body).map(|_| ())
}

/// Just the `success` flag of an envelope.
#[derive(Deserialize)]
struct Outcome {
    #[serde(default)]
    success: Option<bool>,
}

fn decode_raw(status: StatusCode, body: &str) -> Result<RawEnvelope, Error> {
    let raw = match serde_json::from_str::<RawEnvelope>(body) {
        Ok(raw) => raw,
        Err(e) if status.is_success() => return Err(Error::Deserialization(e.to_string())),
        Err(_) => {
            return Err(Error::Http {
                status: status.as_u16(),
                message: http_message(status, body),
            });
        }
    };

    if !raw.success || !status.is_success() {
        let message = if raw.message.is_empty() {
            http_message(status, body)
        } else {
            raw.message
        };
        return Err(Error::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(raw)
}

fn http_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: String,
    }

    #[test]
    fn decodes_successful_envelope() {
        let body = r#"{"data":{"id":"p1"},"message":"Project fetched","success":true}"#;
        let env: Envelope<Item> = decode(StatusCode::OK, body).unwrap();
        assert_eq!(env.data, Item { id: "p1".into() });
        assert_eq!(env.message, "Project fetched");
        assert!(env.success);
    }

    #[test]
    fn success_false_is_api_error_with_server_message() {
        let body = r#"{"data":null,"message":"App not found","success":false}"#;
        let err = decode::<Item>(StatusCode::OK, body).unwrap_err();
        assert!(err.is_api_error());
        assert_eq!(err.api_message(), Some("App not found"));
        assert_eq!(err.status(), Some(200));
    }

    #[test]
    fn error_status_with_envelope_is_api_error() {
        let body = r#"{"message":"Invalid API key","success":false}"#;
        let err = decode::<Item>(StatusCode::UNAUTHORIZED, body).unwrap_err();
        assert_eq!(err.api_message(), Some("Invalid API key"));
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn error_status_without_envelope_is_http_error() {
        let err = decode::<Item>(StatusCode::BAD_GATEWAY, "<html>upstream</html>").unwrap_err();
        assert!(matches!(
            err,
            Error::Http { status: 502, ref message } if message == "<html>upstream</html>"
        ));

        let err = decode::<Item>(StatusCode::SERVICE_UNAVAILABLE, "").unwrap_err();
        assert!(matches!(
            err,
            Error::Http { status: 503, ref message } if message == "Service Unavailable"
        ));
    }

    #[test]
    fn malformed_success_body_is_deserialization_error() {
        let err = decode::<Item>(StatusCode::OK, "not json").unwrap_err();
        assert!(matches!(err, Error::Deserialization(_)));
    }

    #[test]
    fn mismatched_data_is_deserialization_error() {
        let body = r#"{"data":{"name":"no id"},"message":"ok","success":true}"#;
        let err = decode::<Item>(StatusCode::OK, body).unwrap_err();
        assert!(matches!(err, Error::Deserialization(ref m) if m.contains("id")));
    }

    #[test]
    fn check_accepts_success_without_envelope() {
        assert!(check(StatusCode::NO_CONTENT, "").is_ok());
        assert!(check(StatusCode::OK, "   ").is_ok());
        assert!(check(StatusCode::OK, "garbage").is_ok());
        assert!(check(StatusCode::OK, r#"{"data":null,"message":"Deleted","success":true}"#).is_ok());
        assert!(check(StatusCode::OK, r#"{"deleted":true}"#).is_ok());
    }

    #[test]
    fn check_rejects_success_false_on_2xx() {
        let err = check(
            StatusCode::OK,
            r#"{"data":null,"message":"Webhook not found","success":false}"#,
        )
        .unwrap_err();
        assert!(err.is_api_error());
        assert_eq!(err.api_message(), Some("Webhook not found"));
        assert_eq!(err.status(), Some(200));
    }

    #[test]
    fn check_surfaces_failures() {
        let err = check(
            StatusCode::NOT_FOUND,
            r#"{"message":"Webhook not found","success":false}"#,
        )
        .unwrap_err();
        assert_eq!(err.api_message(), Some("Webhook not found"));

        let err = check(StatusCode::INTERNAL_SERVER_ERROR, "").unwrap_err();
        assert!(matches!(err, Error::Http { status: 500, .. }));
    }
}
