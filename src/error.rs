//! Error types for the NuHeat API client.

/// Errors that can occur while talking to the NuHeat cloud API.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Transport-level or decoding failure from the HTTP stack.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The authentication endpoint rejected the email/password pair.
    ///
    /// The API signals this with an `ErrorCode` field in an HTTP 200 reply
    /// rather than an error status.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The authentication endpoint replied without a `SessionId`.
    #[error("authentication response did not include a session id")]
    MissingSessionId,

    /// The API kept rejecting the session even after re-authenticating.
    #[error("session rejected after re-authentication")]
    SessionExpired,

    /// The API reported a schedule mode outside the known set.
    #[error("invalid schedule mode: {0}")]
    InvalidScheduleMode(u8),

    /// The configured base URL cannot be used as an `Origin` header value.
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
}

/// Result type for NuHeat API operations.
pub type Result<T> = std::result::Result<T, Error>;
