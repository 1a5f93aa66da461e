//! Error types for the SDK.
//!
//! Two layers: [`ApiError`] is what a single request can produce (transport
//! failure, non-2xx response, undecodable body); [`Error`] is the crate-level
//! type the public surface returns, adding configuration failures and the
//! wait-specific outcomes. The three polling failure kinds stay distinguishable
//! so callers can discriminate on the variant.

use std::time::Duration;

use devgrid_api_types::{BlueprintStatus, DevboxStatus, ScenarioRunStatus};
use thiserror::Error;

/// Failure of a single API request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("api error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Machine-readable error code from the response body, if any.
        code: Option<String>,
        message: String,
    },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body could not be decoded into the expected shape.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ApiError {
    /// Build an API-status error.
    #[must_use]
    pub fn api(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code,
            message: message.into(),
        }
    }

    /// Whether this is the server's long-poll request-timeout answer (HTTP
    /// 408). This is the one transient kind the devbox waiter folds into
    /// continued polling; every other error propagates.
    #[must_use]
    pub fn is_request_timeout(&self) -> bool {
        matches!(self, Self::Api { status: 408, .. })
    }
}

/// Crate-level error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Client construction or option validation failed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A wait operation exceeded its wall-clock budget.
    #[error("timed out after {waited:?} waiting on {resource} {id} (last status: {last_status})")]
    WaitTimedOut {
        /// Resource kind, e.g. `"devbox"`.
        resource: &'static str,
        id: String,
        waited: Duration,
        /// Last observed status, or `"unknown"` if no attempt completed.
        last_status: String,
    },

    /// A wait operation exhausted its attempt budget.
    #[error(
        "gave up after {attempts} polling attempts on {resource} {id} (last status: {last_status})"
    )]
    WaitAttemptsExhausted {
        resource: &'static str,
        id: String,
        attempts: u32,
        last_status: String,
    },

    /// A devbox stopped transitioning but rested in the wrong state.
    #[error("devbox {id} settled in status '{}', expected '{}'", .actual.as_str(), .expected.as_str())]
    UnexpectedDevboxStatus {
        id: String,
        expected: DevboxStatus,
        actual: DevboxStatus,
    },

    /// A blueprint build finished in a non-success state.
    #[error("blueprint {id} build ended in status '{}'{}", .status.as_str(), format_reason(.reason))]
    BlueprintBuildFailed {
        id: String,
        status: BlueprintStatus,
        reason: Option<String>,
    },

    /// A disk snapshot finished in the `error` state.
    #[error("disk snapshot {id} failed: {message}")]
    SnapshotFailed { id: String, message: String },

    /// A scenario run stopped transitioning without reaching `scored`.
    #[error("scenario run {id} ended in status '{}' without a score{}", .status.as_str(), format_reason(.reason))]
    ScenarioRunNotScored {
        id: String,
        status: ScenarioRunStatus,
        reason: Option<String>,
    },
}

fn format_reason(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map_or_else(String::new, |r| format!(": {r}"))
}
