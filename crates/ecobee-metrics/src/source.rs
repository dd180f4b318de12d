//! The data source consulted once per scrape.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::model::{Selection, Thermostat};

/// Trait for fetching a thermostat snapshot.
///
/// Implementations own authentication, transport and timeouts. The collector
/// calls [`ThermostatSource::fetch`] exactly once per scrape and never retries.
pub trait ThermostatSource: Send + Sync {
    /// The error returned when a fetch fails.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetches every thermostat matching `selection`, in API order.
    fn fetch(
        &self,
        selection: &Selection,
    ) -> impl Future<Output = Result<Vec<Thermostat>, Self::Error>> + Send;
}

/// Error returned by [`FakeThermostatSource`] when configured to fail.
#[derive(Debug, Clone, thiserror::Error)]
#[error("fake fetch failed: {0}")]
pub struct FakeFetchError(pub String);

/// An in-memory thermostat source for testing.
#[derive(Debug, Clone, Default)]
pub struct FakeThermostatSource {
    response: Arc<Mutex<Option<Result<Vec<Thermostat>, String>>>>,
    selections: Arc<Mutex<Vec<Selection>>>,
}

impl FakeThermostatSource {
    /// Creates a source that returns an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source that returns `thermostats` on every fetch.
    #[must_use]
    pub fn with_thermostats(thermostats: Vec<Thermostat>) -> Self {
        let source = Self::new();
        source.set_thermostats(thermostats);
        source
    }

    /// Creates a source whose fetches fail with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        let source = Self::new();
        *source.response.lock() = Some(Err(message.into()));
        source
    }

    /// Replaces the snapshot returned by subsequent fetches.
    pub fn set_thermostats(&self, thermostats: Vec<Thermostat>) {
        *self.response.lock() = Some(Ok(thermostats));
    }

    /// Returns every selection received so far.
    #[must_use]
    pub fn selections(&self) -> Vec<Selection> {
        self.selections.lock().clone()
    }

    /// Returns the number of fetches performed.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.selections.lock().len()
    }
}

impl ThermostatSource for FakeThermostatSource {
    type Error = FakeFetchError;

    async fn fetch(&self, selection: &Selection) -> Result<Vec<Thermostat>, Self::Error> {
        self.selections.lock().push(selection.clone());
        match self.response.lock().clone() {
            Some(Ok(thermostats)) => Ok(thermostats),
            Some(Err(message)) => Err(FakeFetchError(message)),
            None => Ok(Vec::new()),
        }
    }
}
