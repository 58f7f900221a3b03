//! Gateway errors and their HTTP representation.
//!
//! Every failure in the request path ends up here and is turned into a
//! plain-text response; nothing is retried.

use std::time::Duration;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::gemini::{ProtocolError, TransportError};
use crate::render::RenderError;
use crate::routing::{NamespaceError, RouteError};

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Network, TLS or connection failure.
    #[error("Gateway error: {0}")]
    Transport(#[from] TransportError),

    /// Malformed data from upstream.
    #[error("Gateway error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Gateway error: upstream did not answer within {} seconds", .0.as_secs())]
    Timeout(Duration),

    #[error("Unsupported charset: {0}")]
    UnsupportedCharset(String),

    #[error("Proxy does not understand Gemini response status {0}")]
    UnrecognizedStatus(u8),

    /// 4x from upstream.
    #[error("The remote server returned {status}: {meta}")]
    TemporaryFailure { status: u8, meta: String },

    /// 50 and 51 from upstream.
    #[error("The remote server returned {status}: {meta}")]
    PermanentFailure { status: u8, meta: String },

    /// 52, 53 and 59 from upstream.
    #[error("The remote server returned {status}: {meta}")]
    OtherFailure { status: u8, meta: String },

    #[error("Internal error: {0}")]
    Render(#[from] RenderError),

    #[error("404 Not found")]
    NotFound,

    #[error("404 Not found: {0}")]
    Unmapped(#[from] NamespaceError),

    #[error("405 Method not allowed")]
    MethodNotAllowed,

    #[error("400 Bad request: {0}")]
    BadForm(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Transport(_) | GatewayError::Protocol(_) | GatewayError::Timeout(_) => {
                StatusCode::BAD_GATEWAY
            }
            GatewayError::UnsupportedCharset(_) | GatewayError::UnrecognizedStatus(_) => {
                StatusCode::NOT_IMPLEMENTED
            }
            GatewayError::TemporaryFailure { .. } | GatewayError::OtherFailure { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            GatewayError::PermanentFailure { .. }
            | GatewayError::NotFound
            | GatewayError::Unmapped(_) => StatusCode::NOT_FOUND,
            GatewayError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::BadForm(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<RouteError> for GatewayError {
    fn from(err: RouteError) -> Self {
        match err {
            RouteError::MethodNotAllowed(_) => GatewayError::MethodNotAllowed,
            RouteError::Favicon => GatewayError::NotFound,
            RouteError::Namespace(e) => GatewayError::Unmapped(e),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            GatewayError::Render(e) => tracing::error!(error = %e, "Rendering failed"),
            _ if status.is_server_error() => {
                tracing::warn!(status = status.as_u16(), error = %self, "Request failed")
            }
            _ => {}
        }
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_failures() {
        let err = GatewayError::PermanentFailure {
            status: 51,
            meta: "not found".into(),
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "The remote server returned 51: not found");

        let err = GatewayError::TemporaryFailure {
            status: 44,
            meta: "slow down".into(),
        };
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let err = GatewayError::OtherFailure {
            status: 53,
            meta: "no proxying".into(),
        };
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_gateway_failures() {
        let err = GatewayError::Timeout(Duration::from_secs(30));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(err.to_string().contains("30 seconds"));

        let err = GatewayError::from(ProtocolError::EmptyResponse);
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(err.to_string().starts_with("Gateway error:"));
    }

    #[test]
    fn test_route_errors() {
        use axum::http::Method;

        assert_eq!(
            GatewayError::from(RouteError::MethodNotAllowed(Method::DELETE)).status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            GatewayError::from(RouteError::Favicon).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_unsupported_content() {
        assert_eq!(
            GatewayError::UnrecognizedStatus(62).status_code(),
            StatusCode::NOT_IMPLEMENTED
        );
        assert_eq!(
            GatewayError::UnsupportedCharset("latin1".into()).status_code(),
            StatusCode::NOT_IMPLEMENTED
        );
    }
}
