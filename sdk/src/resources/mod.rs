//! Resource method tables and the state-wait specializations.
//!
//! Each resource module pairs thin request wrappers over [`crate::http`] with
//! a wait specialization that fixes the stop predicate and error recovery for
//! that resource's status field and reuses [`crate::polling::poll`] unchanged.
//! The engine only detects "no longer transitioning"; each waiter separately
//! validates that the resting state is the desired one.

pub mod blueprints;
pub mod devboxes;
pub mod executions;
pub mod scenarios;
pub mod snapshots;

use std::fmt;

use crate::error::Error;
use crate::polling::PollError;

/// Translate an engine failure into a resource-scoped error so callers see
/// the resource kind, id, and last observed status instead of a bare engine
/// error.
pub(crate) fn classify_poll_error<T, F>(
    resource: &'static str,
    id: &str,
    err: PollError<T>,
    status_of: F,
) -> Error
where
    T: fmt::Debug,
    F: Fn(&T) -> &'static str,
{
    match err {
        PollError::TimedOut { waited, last } => Error::WaitTimedOut {
            resource,
            id: id.to_string(),
            waited,
            last_status: last.as_ref().map_or("unknown", &status_of).to_string(),
        },
        PollError::AttemptsExhausted { attempts, last } => Error::WaitAttemptsExhausted {
            resource,
            id: id.to_string(),
            attempts,
            last_status: last.as_ref().map_or("unknown", &status_of).to_string(),
        },
        PollError::Api(api) => Error::Api(api),
        PollError::InvalidConfig { reason } => Error::Config(reason.to_string()),
    }
}
