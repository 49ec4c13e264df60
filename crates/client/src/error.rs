//! Error types for the Vartiq client.

use thiserror::Error;

use crate::signature::SignatureError;

/// Errors that can occur when using the Vartiq client.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure (network, DNS, TLS, timeout). The underlying
    /// `reqwest` error is kept as the source.
    #[error("connection error: {0}")]
    Connection(#[from] reqwest::Error),

    /// Non-success HTTP status whose body was not a response envelope.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body, or the status reason when empty.
        message: String,
    },

    /// The server answered with `success: false`.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the response envelope.
        message: String,
    },

    /// Response body could not be decoded into the expected shape.
    #[error("failed to deserialize response: {0}")]
    Deserialization(String),

    /// A request failed local validation and was never sent.
    #[error("{0}")]
    Validation(String),

    /// Webhook signature verification failed.
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// Client configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Returns `true` if this is a transport error.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` if the request timed out before a response arrived.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Connection(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Returns `true` if the server reported `success: false`.
    pub fn is_api_error(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    /// Returns `true` if the request was rejected before being sent.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns the server-provided message if this is an API error.
    pub fn api_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Returns the HTTP status attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::Connection(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_helpers() {
        let err = Error::Api {
            status: 404,
            message: "Project not found".to_string(),
        };
        assert!(err.is_api_error());
        assert!(!err.is_connection_error());
        assert_eq!(err.api_message(), Some("Project not found"));
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn validation_error_displays_bare_message() {
        let err = Error::Validation("invalid auth method: bogus".to_string());
        assert!(err.is_validation_error());
        assert_eq!(err.to_string(), "invalid auth method: bogus");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn signature_error_converts() {
        let err: Error = SignatureError::VerificationFailed.into();
        assert!(matches!(
            err,
            Error::Signature(SignatureError::VerificationFailed)
        ));
        assert_eq!(err.to_string(), "signature verification failed");
    }

    #[test]
    fn error_display() {
        let err = Error::Http {
            status: 502,
            message: "Bad Gateway".into(),
        };
        assert_eq!(err.to_string(), "HTTP 502: Bad Gateway");

        let err = Error::Deserialization("missing field `id`".into());
        assert_eq!(
            err.to_string(),
            "failed to deserialize response: missing field `id`"
        );

        let err = Error::Api {
            status: 400,
            message: "name is required".into(),
        };
        assert_eq!(err.to_string(), "API error (HTTP 400): name is required");
    }
}
