//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

/// Prometheus exporter for ecobee thermostats.
#[derive(Parser, Debug, Clone)]
#[command(name = "ecobee-exporter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Address the HTTP server listens on (`host:port`, `:port` for all interfaces).
    #[arg(long, env = "ECOBEE_LISTEN_ADDRESS", default_value = "0.0.0.0:9098")]
    pub listen_address: String,

    /// Application API key from the ecobee developer portal.
    #[arg(long, env = "ECOBEE_APPKEY")]
    pub appkey: String,

    /// Cache file where authorization tokens are stored.
    #[arg(long, env = "ECOBEE_CACHEFILE", default_value = "/db/auth.cache")]
    pub cachefile: PathBuf,

    /// Prefix for every exported metric name.
    #[arg(long, env = "ECOBEE_METRIC_PREFIX", default_value = "ecobee")]
    pub metric_prefix: String,

    /// Request and export weather forecasts.
    #[arg(long, env = "ECOBEE_WEATHER", default_value_t = true, action = ArgAction::Set)]
    pub weather: bool,

    /// Timeout for each ecobee API request, in seconds.
    #[arg(long, env = "ECOBEE_API_TIMEOUT_SECS", default_value_t = 30)]
    pub api_timeout_secs: u64,

    /// Subcommand to execute (defaults to `serve`).
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Returns the subcommand, defaulting to [`Commands::Serve`].
    #[must_use]
    pub fn subcommand(&self) -> Commands {
        self.command.unwrap_or(Commands::Serve)
    }
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Serve metrics over HTTP.
    Serve,

    /// Run the ecobee PIN authorization flow and write the token cache.
    ///
    /// Prints a PIN to enter under "My Apps" in the ecobee portal, then waits
    /// until the PIN is accepted or expires.
    Authorize,
}
