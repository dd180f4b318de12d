//! HTTP client for the ecobee API.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use ecobee_metrics::{Selection, Thermostat, ThermostatSource};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{ClientError, Result};
use crate::token::{OAuthError, PinResponse, TokenCache, TokenResponse, Tokens};

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.ecobee.com";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Scope requested during authorization.
pub const SCOPE: &str = "smartRead";

/// API status code for an expired access token.
pub const TOKEN_EXPIRED_CODE: i64 = 14;

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Application key registered in the ecobee developer portal.
    pub app_key: String,
    /// Path of the token cache file.
    pub cache_path: PathBuf,
    /// API base URL.
    pub base_url: String,
    /// Timeout applied to every request.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Creates a configuration for the production API.
    #[must_use]
    pub fn new(app_key: impl Into<String>, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            app_key: app_key.into(),
            cache_path: cache_path.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct ThermostatRequest<'a> {
    selection: &'a Selection,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThermostatResponse {
    #[serde(default)]
    thermostat_list: Vec<Thermostat>,
    status: ApiStatus,
}

#[derive(Deserialize)]
struct ApiStatus {
    code: i64,
    #[serde(default)]
    message: String,
}

/// ecobee API client.
///
/// Tokens are loaded lazily from the cache on the first request and refreshed
/// when close to expiry. The token state is held behind an async mutex so
/// concurrent requests refresh at most once.
#[derive(Debug)]
pub struct EcobeeClient {
    http: reqwest::Client,
    config: ClientConfig,
    cache: TokenCache,
    tokens: Mutex<Option<Tokens>>,
}

impl EcobeeClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        let cache = TokenCache::new(config.cache_path.clone());
        Ok(Self {
            http,
            config,
            cache,
            tokens: Mutex::new(None),
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Starts the PIN flow, returning the PIN the user must enter.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn request_pin(&self) -> Result<PinResponse> {
        let response = self
            .http
            .get(self.url("/authorize"))
            .query(&[
                ("response_type", "ecobeePin"),
                ("client_id", self.config.app_key.as_str()),
                ("scope", SCOPE),
            ])
            .send()
            .await?;
        oauth_body(response).await
    }

    /// Exchanges an authorization code for tokens and stores them.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::AuthorizationPending` while the PIN has not been
    /// entered, or another error if the exchange fails.
    pub async fn exchange_pin(&self, code: &str) -> Result<Tokens> {
        let tokens = self.request_tokens("ecobeePin", code).await?;
        self.cache.store(&tokens).await?;
        *self.tokens.lock().await = Some(tokens.clone());
        info!(path = %self.cache.path().display(), "authorization complete");
        Ok(tokens)
    }

    async fn request_tokens(&self, grant_type: &str, code: &str) -> Result<Tokens> {
        let response = self
            .http
            .post(self.url("/token"))
            .query(&[
                ("grant_type", grant_type),
                ("code", code),
                ("client_id", self.config.app_key.as_str()),
            ])
            .send()
            .await?;
        let body: TokenResponse = oauth_body(response).await?;
        Ok(Tokens::from_response(body, Utc::now()))
    }

    /// Returns a valid access token, refreshing it if necessary.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthorized` if no tokens are cached, or an
    /// error if the refresh fails.
    pub async fn access_token(&self) -> Result<String> {
        let mut guard = self.tokens.lock().await;

        if guard.is_none() {
            *guard = self.cache.load().await?;
        }
        let Some(current) = guard.as_ref() else {
            return Err(ClientError::NotAuthorized {
                path: self.cache.path().to_path_buf(),
            });
        };

        if current.needs_refresh(Utc::now()) {
            debug!(expires_at = %current.expires_at, "refreshing access token");
            let refreshed = self
                .request_tokens("refresh_token", &current.refresh_token)
                .await?;
            self.cache.store(&refreshed).await?;
            let access = refreshed.access_token.clone();
            *guard = Some(refreshed);
            return Ok(access);
        }

        Ok(current.access_token.clone())
    }

    /// Fetches every thermostat matching `selection`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` on a non-zero ecobee status, or a transport,
    /// authorization or decoding error.
    pub async fn thermostats(&self, selection: &Selection) -> Result<Vec<Thermostat>> {
        let token = self.access_token().await?;
        let query = serde_json::to_string(&ThermostatRequest { selection })?;

        let response = self
            .http
            .get(self.url("/1/thermostat"))
            .query(&[("json", query.as_str())])
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(CONTENT_TYPE, "application/json;charset=UTF-8")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let parsed = match serde_json::from_str::<ThermostatResponse>(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(ClientError::UnexpectedStatus {
                    status: status.as_u16(),
                    body,
                });
            }
            Err(e) => return Err(e.into()),
        };

        if parsed.status.code != 0 {
            if parsed.status.code == TOKEN_EXPIRED_CODE {
                self.expire_access_token(&token).await;
            }
            return Err(ClientError::Api {
                code: parsed.status.code,
                message: parsed.status.message,
            });
        }

        debug!(thermostat_count = parsed.thermostat_list.len(), "fetched thermostats");
        Ok(parsed.thermostat_list)
    }

    /// Marks `token` as expired so the next request refreshes it.
    ///
    /// A token already replaced by a concurrent refresh is left alone.
    async fn expire_access_token(&self, token: &str) {
        let mut guard = self.tokens.lock().await;
        if let Some(current) = guard.as_mut().filter(|t| t.access_token == token) {
            current.expires_at = Utc::now();
            warn!("access token rejected as expired, refreshing on next request");
        }
    }
}

impl ThermostatSource for EcobeeClient {
    type Error = ClientError;

    async fn fetch(&self, selection: &Selection) -> Result<Vec<Thermostat>> {
        self.thermostats(selection).await
    }
}

/// Decodes an authorization endpoint body, mapping OAuth errors.
async fn oauth_body<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return Ok(serde_json::from_str(&body)?);
    }
    match serde_json::from_str::<OAuthError>(&body) {
        Ok(e) => Err(e.into()),
        Err(_) => Err(ClientError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        }),
    }
}
