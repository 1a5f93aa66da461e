//! Scenario runs and the scoring wait.
//!
//! A scenario run executes an agent workload in a devbox and is scored
//! server-side once it finishes. Scoring is itself a long-running transition,
//! so the waiter treats `running` and `scoring` as transition states and
//! requires the run to rest in `scored`.

use devgrid_api_types::{ScenarioRunListView, ScenarioRunStatus, ScenarioRunView, ScoreRunRequest};

use super::classify_poll_error;
use crate::error::{ApiError, Error};
use crate::http::Http;
use crate::polling::{PollOptions, poll};

/// Status operations the scoring waiter needs.
#[allow(async_fn_in_trait)]
pub trait ScenarioRunSource {
    /// Fetch the scenario run.
    async fn retrieve(&self, id: &str) -> Result<ScenarioRunView, ApiError>;
}

/// Scenario run resource methods.
pub struct ScenarioRuns<'a> {
    pub(crate) http: &'a Http,
}

impl ScenarioRuns<'_> {
    /// # Errors
    ///
    /// Returns an error if the request fails or the run does not exist.
    pub async fn retrieve(&self, id: &str) -> Result<ScenarioRunView, ApiError> {
        self.http.get(&format!("/v1/scenarios/runs/{id}")).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list(&self) -> Result<Vec<ScenarioRunView>, ApiError> {
        let view: ScenarioRunListView = self.http.get("/v1/scenarios/runs").await?;
        Ok(view.runs)
    }

    /// Request server-side scoring of a finished run.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the run is still executing.
    pub async fn score(
        &self,
        id: &str,
        request: &ScoreRunRequest,
    ) -> Result<ScenarioRunView, ApiError> {
        self.http.post(&format!("/v1/scenarios/runs/{id}/score"), request).await
    }

    /// Wait for the run to be scored.
    ///
    /// # Errors
    ///
    /// See [`await_scored`].
    pub async fn await_scored(&self, id: &str) -> Result<ScenarioRunView, Error> {
        await_scored(self, id, PollOptions::default()).await
    }

    /// Request scoring and wait for it to land.
    ///
    /// # Errors
    ///
    /// See [`ScenarioRuns::score`] and [`await_scored`].
    pub async fn score_and_await(
        &self,
        id: &str,
        request: &ScoreRunRequest,
    ) -> Result<ScenarioRunView, Error> {
        self.score(id, request).await?;
        await_scored(self, id, PollOptions::default()).await
    }
}

impl ScenarioRunSource for ScenarioRuns<'_> {
    async fn retrieve(&self, id: &str) -> Result<ScenarioRunView, ApiError> {
        ScenarioRuns::retrieve(self, id).await
    }
}

/// Wait until the run leaves `{running, scoring}`, then require `scored`.
///
/// Any other resting state surfaces as [`Error::ScenarioRunNotScored`] with
/// the terminal status and the server-supplied failure reason.
///
/// # Errors
///
/// Returns [`Error::ScenarioRunNotScored`] for a non-scored resting state,
/// the wait-budget errors when polling gives up, and [`Error::Api`] for
/// request failures.
pub async fn await_scored(
    api: &impl ScenarioRunSource,
    id: &str,
    options: PollOptions<ScenarioRunView>,
) -> Result<ScenarioRunView, Error> {
    let options = options.stop_when(|r: &ScenarioRunView| {
        !matches!(
            r.status,
            ScenarioRunStatus::Running | ScenarioRunStatus::Scoring
        )
    });

    let settled = poll(|| api.retrieve(id), || api.retrieve(id), options)
        .await
        .map_err(|e| classify_poll_error("scenario run", id, e, |r| r.status.as_str()))?;

    match settled.status {
        ScenarioRunStatus::Scored => Ok(settled),
        status => Err(Error::ScenarioRunNotScored {
            id: id.to_string(),
            status,
            reason: settled.failure_reason,
        }),
    }
}
