//! Error types for the ecobee-client crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur talking to the ecobee API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-zero status code.
    #[error("ecobee api error {code}: {message}")]
    Api {
        /// The ecobee status code.
        code: i64,
        /// The ecobee status message.
        message: String,
    },

    /// The server answered with a non-success HTTP status and no ecobee status.
    #[error("unexpected http status {status}: {body}")]
    UnexpectedStatus {
        /// The HTTP status code.
        status: u16,
        /// The response body.
        body: String,
    },

    /// The authorization server rejected a token request.
    #[error("authorization failed: {reason}")]
    Auth {
        /// The OAuth error and description.
        reason: String,
    },

    /// The PIN has not been entered in the ecobee portal yet.
    #[error("authorization pending")]
    AuthorizationPending,

    /// Reading or writing the token cache failed.
    #[error("token cache {}: {reason}", .path.display())]
    TokenCache {
        /// The cache file path.
        path: PathBuf,
        /// The reason the operation failed.
        reason: String,
    },

    /// A request or response body could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No tokens are available; the PIN flow must be run first.
    #[error("not authorized: no tokens in {}, run `ecobee-exporter authorize`", .path.display())]
    NotAuthorized {
        /// The cache file that was consulted.
        path: PathBuf,
    },
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
