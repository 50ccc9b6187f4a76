//! Error types for the posts/users API client.
//!
//! # Design
//! `NotFound` and `Unauthorized` get dedicated variants because scenarios
//! routinely assert on them. Other unexpected statuses land in `HttpError`
//! with the raw status and body. A response with status 0 never reached the
//! server and maps to `Transport`.

/// Errors returned by `ApiClient` build and parse methods.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned 401: missing, unknown or rejected session/credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// The server returned an unexpected status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The request never produced a response.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}
