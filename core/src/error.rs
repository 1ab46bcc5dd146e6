//! Error types for the cinema API client.
//!
//! # Design
//! `NotFound` keeps a dedicated variant because views distinguish "the record
//! is gone" from "the server returned an unexpected status". Every other
//! non-2xx response lands in `HttpError` with the raw status and body.
//! Network failures are `Transport`; nothing is retried.

use thiserror::Error;

use crate::forms::ValidationError;

/// Errors returned by `CineClient` and the resource services.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),
}

/// Why a form submission did not reach a successful response.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Local validation failed; no request was sent.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// A submission from the same form is still outstanding.
    #[error("a submission is already in progress")]
    InFlight,

    /// `finish` was called without a matching `begin`.
    #[error("no submission is in progress")]
    NotStarted,

    /// The request was sent and rejected.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Invalid client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("base URL must start with http:// or https://, got '{0}'")]
    InvalidBaseUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_display_includes_status_and_body() {
        let err = ApiError::HttpError {
            status: 400,
            body: "{\"email\":[\"invalid\"]}".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 400: {\"email\":[\"invalid\"]}");
    }

    #[test]
    fn validation_errors_surface_their_own_message() {
        let err = SubmitError::from(ValidationError::MissingSelection { field: "usuario" });
        assert_eq!(err.to_string(), "Debe seleccionar un usuario");
    }
}
