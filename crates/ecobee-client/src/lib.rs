//! Client for the ecobee thermostat REST API.
//!
//! Provides the PIN authorization flow, a JSON token cache with automatic
//! refresh, and [`EcobeeClient`], which implements
//! [`ecobee_metrics::ThermostatSource`] over `GET /1/thermostat`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod token;

pub use client::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, EcobeeClient, SCOPE, TOKEN_EXPIRED_CODE};
pub use error::{ClientError, Result};
pub use token::{PinResponse, REFRESH_MARGIN_SECS, TokenCache, TokenResponse, Tokens};
