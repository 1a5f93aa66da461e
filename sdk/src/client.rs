//! Root API client.

use crate::config::ClientConfig;
use crate::error::Error;
use crate::http::Http;
use crate::resources::blueprints::Blueprints;
use crate::resources::devboxes::Devboxes;
use crate::resources::executions::Executions;
use crate::resources::scenarios::ScenarioRuns;
use crate::resources::snapshots::Snapshots;

/// Devgrid API client.
///
/// Holds the authenticated transport; resource accessors borrow it, so one
/// client can drive any number of concurrent operations.
pub struct Client {
    http: Http,
}

impl Client {
    /// # Errors
    ///
    /// Returns an error if the config is invalid.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        Ok(Self {
            http: Http::new(config)?,
        })
    }

    /// Build from `DEVGRID_`-prefixed environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `DEVGRID_API_KEY` is unset or the resulting config
    /// is invalid.
    pub fn from_env() -> Result<Self, Error> {
        Self::new(&ClientConfig::from_env()?)
    }

    #[must_use]
    pub fn devboxes(&self) -> Devboxes<'_> {
        Devboxes { http: &self.http }
    }

    #[must_use]
    pub fn blueprints(&self) -> Blueprints<'_> {
        Blueprints { http: &self.http }
    }

    #[must_use]
    pub fn snapshots(&self) -> Snapshots<'_> {
        Snapshots { http: &self.http }
    }

    #[must_use]
    pub fn executions(&self) -> Executions<'_> {
        Executions { http: &self.http }
    }

    #[must_use]
    pub fn scenario_runs(&self) -> ScenarioRuns<'_> {
        ScenarioRuns { http: &self.http }
    }
}
