//! Exporter configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ecobee_client::ClientConfig;
use ecobee_metrics::{CollectorConfig, MetricName};

use crate::cli::Cli;
use crate::error::{ExporterError, ExporterResult};

/// Validated exporter configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExporterConfig {
    /// Address the HTTP server binds to, as `host:port`.
    pub listen_address: String,
    /// ecobee application key.
    pub app_key: String,
    /// Token cache file.
    pub cache_path: PathBuf,
    /// Metric name prefix.
    pub metric_prefix: String,
    /// Whether weather forecasts are requested and exported.
    pub include_weather: bool,
    /// Per-request API timeout.
    pub api_timeout: Duration,
}

impl ExporterConfig {
    /// Builds and validates a configuration from parsed arguments.
    ///
    /// A listen address of the form `:port` binds every interface. Hostnames
    /// are accepted and resolved by [`Self::resolve_listen_address`].
    ///
    /// # Errors
    ///
    /// Returns `ExporterError::Config` if any value is invalid.
    pub fn from_cli(cli: &Cli) -> ExporterResult<Self> {
        let config = Self {
            listen_address: parse_listen_address(&cli.listen_address)?,
            app_key: cli.appkey.trim().to_string(),
            cache_path: cli.cachefile.clone(),
            metric_prefix: cli.metric_prefix.clone(),
            include_weather: cli.weather,
            api_timeout: Duration::from_secs(cli.api_timeout_secs),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ExporterError::Config` if validation fails.
    pub fn validate(&self) -> ExporterResult<()> {
        if self.app_key.is_empty() {
            return Err(ExporterError::Config("appkey must not be empty".to_string()));
        }
        if self.cache_path.as_os_str().is_empty() {
            return Err(ExporterError::Config("cachefile must not be empty".to_string()));
        }
        if let Err(e) = MetricName::new(self.metric_prefix.as_str()) {
            return Err(ExporterError::Config(format!(
                "invalid metric prefix {:?}: {e}",
                self.metric_prefix
            )));
        }
        if self.api_timeout.is_zero() {
            return Err(ExporterError::Config(
                "api timeout must be at least one second".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolves the listen address, taking the first address the host maps to.
    ///
    /// # Errors
    ///
    /// Returns `ExporterError::Config` if the host cannot be resolved.
    pub async fn resolve_listen_address(&self) -> ExporterResult<SocketAddr> {
        let mut addrs = tokio::net::lookup_host(self.listen_address.as_str())
            .await
            .map_err(|e| {
                ExporterError::Config(format!(
                    "cannot resolve listen address {:?}: {e}",
                    self.listen_address
                ))
            })?;
        addrs.next().ok_or_else(|| {
            ExporterError::Config(format!(
                "listen address {:?} resolved to no addresses",
                self.listen_address
            ))
        })
    }

    /// Returns the API client configuration.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.app_key.clone(), self.cache_path.clone()).with_timeout(self.api_timeout)
    }

    /// Returns the collector options.
    #[must_use]
    pub const fn collector_config(&self) -> CollectorConfig {
        CollectorConfig {
            include_weather: self.include_weather,
        }
    }
}

fn parse_listen_address(raw: &str) -> ExporterResult<String> {
    let normalized = if raw.starts_with(':') {
        format!("0.0.0.0{raw}")
    } else {
        raw.to_string()
    };
    let invalid = |reason: String| {
        ExporterError::Config(format!("invalid listen address {raw:?}: {reason}"))
    };

    let Some((host, port)) = normalized.rsplit_once(':') else {
        return Err(invalid("expected host:port".to_string()));
    };
    if host.is_empty() {
        return Err(invalid("missing host".to_string()));
    }
    port.parse::<u16>().map_err(|e| invalid(format!("bad port: {e}")))?;
    Ok(normalized)
}
