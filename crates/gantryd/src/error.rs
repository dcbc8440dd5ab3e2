//! Daemon-level errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use gantry_push::Envelope;

/// Errors surfaced by the daemon's configuration loading and HTTP surface.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration file could not be read.
    #[error("failed to read config file '{path}': {source}")]
    ConfigIo {
        /// Offending path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file was not valid TOML.
    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration failed semantic validation.
    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    /// A request carried unusable parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// An internal failure while serving a request.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Envelope::err(i32::from(status.as_u16()), self.to_string());
        (status, axum::Json(body)).into_response()
    }
}
