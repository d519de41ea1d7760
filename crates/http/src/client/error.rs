//! Client error types

use crate::storage::StorageError;
use reqwest::StatusCode;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};
use vetogest_core::ApiErrorBody;

/// Coarse classification of a [`ClientError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response was received
    NetworkUnreachable,
    /// 401
    Unauthorized,
    /// 403
    Forbidden,
    /// 5xx
    ServerError,
    /// Any other 4xx
    ClientError,
    Serialization,
    Storage,
    Configuration,
}

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or transport error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// 401 from the API
    #[error("Authentication failed: {message}")]
    Unauthorized {
        message: String,
        detail: Option<String>,
    },

    /// 403 from the API
    #[error("Forbidden: {message}")]
    Forbidden {
        message: String,
        detail: Option<String>,
    },

    /// 5xx from the API
    #[error("Server error {status}: {message}")]
    ServerError {
        status: u16,
        message: String,
        detail: Option<String>,
    },

    /// Other 4xx from the API
    #[error("Request rejected {status}: {message}")]
    Rejected {
        status: u16,
        message: String,
        detail: Option<String>,
    },

    /// The refresh call failed and the session was invalidated
    #[error("Token refresh failed: {0}")]
    RefreshFailed(Arc<ClientError>),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Token storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from HTTP status code and raw response body
    pub fn from_status(status: StatusCode, body: String) -> Self {
        let detail = ApiErrorBody::detail_from(&body);
        let message = if body.trim().is_empty() {
            status.to_string()
        } else {
            body
        };

        match status.as_u16() {
            401 => Self::Unauthorized { message, detail },
            403 => Self::Forbidden { message, detail },
            code @ 500..=599 => Self::ServerError {
                status: code,
                message,
                detail,
            },
            code => Self::Rejected {
                status: code,
                message,
                detail,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Request(e) if e.is_builder() => ErrorKind::Configuration,
            Self::Request(e) if e.is_decode() => ErrorKind::Serialization,
            Self::Request(_) => ErrorKind::NetworkUnreachable,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::ServerError { .. } => ErrorKind::ServerError,
            Self::Rejected { .. } => ErrorKind::ClientError,
            Self::RefreshFailed(inner) => inner.kind(),
            Self::Serialization(_) => ErrorKind::Serialization,
            Self::Storage(_) => ErrorKind::Storage,
            Self::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// HTTP status, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::Unauthorized { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::ServerError { status, .. } | Self::Rejected { status, .. } => Some(*status),
            Self::RefreshFailed(inner) => inner.status(),
            _ => None,
        }
    }

    /// Server-provided `detail` message
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { detail, .. }
            | Self::Forbidden { detail, .. }
            | Self::ServerError { detail, .. }
            | Self::Rejected { detail, .. } => detail.as_deref(),
            Self::RefreshFailed(inner) => inner.detail(),
            _ => None,
        }
    }

    /// True for a plain 401 that has not gone through a refresh
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// True when the session was invalidated by a failed refresh
    ///
    /// A refresh that succeeded but could not be stored keeps the session.
    pub fn is_session_expired(&self) -> bool {
        match self {
            Self::RefreshFailed(inner) => !matches!(**inner, Self::Storage(_)),
            _ => false,
        }
    }

    /// Message suitable for display: the server `detail`, else `fallback`
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_string()
    }

    /// Log the failure at a level matching its class
    pub(crate) fn log(&self, method: &reqwest::Method, path: &str) {
        match self.kind() {
            ErrorKind::NetworkUnreachable => {
                error!(%method, path, error = %self, "Network error: unable to reach the server");
            }
            ErrorKind::Unauthorized => {
                warn!(%method, path, "Session expired or unauthorized");
            }
            ErrorKind::Forbidden => {
                warn!(%method, path, "Forbidden: insufficient rights");
            }
            ErrorKind::ServerError => {
                error!(%method, path, status = self.status(), "Server error");
            }
            ErrorKind::ClientError => {
                debug!(%method, path, status = self.status(), body = %self, "API error");
            }
            _ => {
                warn!(%method, path, error = %self, "Request failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classification() {
        let cases = [
            (401, ErrorKind::Unauthorized),
            (403, ErrorKind::Forbidden),
            (400, ErrorKind::ClientError),
            (404, ErrorKind::ClientError),
            (500, ErrorKind::ServerError),
            (503, ErrorKind::ServerError),
        ];

        for (code, kind) in cases {
            let status = StatusCode::from_u16(code).unwrap();
            let error = ClientError::from_status(status, String::new());
            assert_eq!(error.kind(), kind, "status {code}");
            assert_eq!(error.status(), Some(code));
        }
    }

    #[test]
    fn test_empty_body_uses_status_text() {
        let error = ClientError::from_status(StatusCode::FORBIDDEN, String::new());
        assert_eq!(error.to_string(), "Forbidden: 403 Forbidden");
        assert_eq!(error.detail(), None);
    }

    #[test]
    fn test_user_message_prefers_detail() {
        let error = ClientError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"detail": "Un client avec cet email existe déjà."}"#.to_string(),
        );
        assert_eq!(
            error.user_message("fallback"),
            "Un client avec cet email existe déjà."
        );

        let error = ClientError::from_status(StatusCode::BAD_GATEWAY, "<html/>".to_string());
        assert_eq!(error.user_message("fallback"), "fallback");
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn logged_at(level: tracing::Level, error: &ClientError) -> String {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            error.log(&reqwest::Method::POST, "/customers/");
        });
        String::from_utf8(logs.0.lock().unwrap().clone()).unwrap()
    }

    #[test]
    fn test_rejected_body_is_logged_at_debug() {
        let error = ClientError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"email": ["invalide"]}"#.to_string(),
        );

        assert!(logged_at(tracing::Level::INFO, &error).is_empty());

        let debug_output = logged_at(tracing::Level::DEBUG, &error);
        assert!(debug_output.contains("DEBUG"));
        assert!(debug_output.contains("API error"));
        assert!(debug_output.contains("invalide"));
    }

    #[test]
    fn test_server_error_is_logged_at_error() {
        let error = ClientError::from_status(StatusCode::SERVICE_UNAVAILABLE, String::new());
        let output = logged_at(tracing::Level::WARN, &error);
        assert!(output.contains("ERROR"));
        assert!(output.contains("Server error"));
    }

    #[test]
    fn test_refresh_failure_delegates_to_inner() {
        let inner = ClientError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"detail": "Token is invalid or expired"}"#.to_string(),
        );
        let error = ClientError::RefreshFailed(Arc::new(inner));

        assert!(error.is_session_expired());
        assert!(!error.is_unauthorized());
        assert_eq!(error.kind(), ErrorKind::Unauthorized);
        assert_eq!(error.status(), Some(401));
        assert_eq!(error.detail(), Some("Token is invalid or expired"));
    }
}
