//! OAuth tokens and their on-disk cache.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClientError, Result};

/// Tokens are refreshed when they expire within this many seconds.
pub const REFRESH_MARGIN_SECS: i64 = 60;

/// Access and refresh tokens with their expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokens {
    /// Bearer token for API requests.
    pub access_token: String,
    /// Token used to obtain a new access token.
    pub refresh_token: String,
    /// When the access token expires.
    pub expires_at: DateTime<Utc>,
}

impl Tokens {
    /// Builds tokens from a token endpoint response received at `now`.
    #[must_use]
    pub fn from_response(response: TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: now + Duration::seconds(response.expires_in),
        }
    }

    /// Returns whether the access token expires within the refresh margin.
    #[must_use]
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - now <= Duration::seconds(REFRESH_MARGIN_SECS)
    }
}

/// Body returned by the `/token` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// New access token.
    pub access_token: String,
    /// New refresh token.
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    /// Always `Bearer`.
    #[serde(default)]
    pub token_type: String,
    /// Granted scope.
    #[serde(default)]
    pub scope: String,
}

/// Body returned by the `/authorize` endpoint for the PIN flow.
#[derive(Debug, Clone, Deserialize)]
pub struct PinResponse {
    /// PIN the user enters in the ecobee portal.
    #[serde(rename = "ecobeePin")]
    pub ecobee_pin: String,
    /// Authorization code exchanged for tokens once the PIN is entered.
    pub code: String,
    /// Minutes until the PIN expires.
    pub expires_in: i64,
    /// Minimum seconds between token polls.
    #[serde(default)]
    pub interval: u64,
    /// Requested scope.
    #[serde(default)]
    pub scope: String,
}

/// Error body returned by the authorization endpoints.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OAuthError {
    pub error: String,
    #[serde(default)]
    pub error_description: String,
}

impl From<OAuthError> for ClientError {
    fn from(e: OAuthError) -> Self {
        if e.error == "authorization_pending" {
            return Self::AuthorizationPending;
        }
        Self::Auth {
            reason: if e.error_description.is_empty() {
                e.error
            } else {
                format!("{}: {}", e.error, e.error_description)
            },
        }
    }
}

/// JSON file holding the current [`Tokens`].
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    /// Creates a cache backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the cache file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn error(&self, reason: impl std::fmt::Display) -> ClientError {
        ClientError::TokenCache {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }

    /// Loads the cached tokens; `None` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::TokenCache` if the file cannot be read or parsed.
    pub async fn load(&self) -> Result<Option<Tokens>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "token cache not found");
                return Ok(None);
            }
            Err(e) => return Err(self.error(e)),
        };
        let tokens = serde_json::from_str(&content).map_err(|e| self.error(e))?;
        Ok(Some(tokens))
    }

    /// Writes `tokens` to the cache, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::TokenCache` if the file cannot be written.
    pub async fn store(&self, tokens: &Tokens) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.error(e))?;
        }
        let content = serde_json::to_string_pretty(tokens)?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| self.error(e))?;
        debug!(path = %self.path.display(), expires_at = %tokens.expires_at, "stored tokens");
        Ok(())
    }
}
