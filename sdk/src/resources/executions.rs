//! Asynchronous command executions and the completion wait.
//!
//! Executions are started via
//! [`crate::resources::devboxes::Devboxes::execute_async`]; this module tracks
//! them afterwards. `completed` is the only resting state, so unlike the other
//! waiters there is nothing further to validate once polling stops.

use devgrid_api_types::{ExecutionStatus, ExecutionView};

use super::classify_poll_error;
use crate::error::{ApiError, Error};
use crate::http::Http;
use crate::polling::{PollOptions, poll};

/// Status operations the execution waiter needs.
#[allow(async_fn_in_trait)]
pub trait ExecutionStatusSource {
    /// Fetch the execution.
    async fn retrieve(&self, devbox_id: &str, execution_id: &str)
    -> Result<ExecutionView, ApiError>;
}

/// Execution resource methods.
pub struct Executions<'a> {
    pub(crate) http: &'a Http,
}

impl Executions<'_> {
    /// # Errors
    ///
    /// Returns an error if the request fails or the execution does not exist.
    pub async fn retrieve(
        &self,
        devbox_id: &str,
        execution_id: &str,
    ) -> Result<ExecutionView, ApiError> {
        self.http
            .get(&format!("/v1/devboxes/{devbox_id}/executions/{execution_id}"))
            .await
    }

    /// Wait for an asynchronous execution to finish.
    ///
    /// # Errors
    ///
    /// See [`await_completed`].
    pub async fn await_completed(
        &self,
        devbox_id: &str,
        execution_id: &str,
    ) -> Result<ExecutionView, Error> {
        await_completed(self, devbox_id, execution_id, PollOptions::default()).await
    }
}

impl ExecutionStatusSource for Executions<'_> {
    async fn retrieve(
        &self,
        devbox_id: &str,
        execution_id: &str,
    ) -> Result<ExecutionView, ApiError> {
        Executions::retrieve(self, devbox_id, execution_id).await
    }
}

/// Wait until the execution reaches `completed`.
///
/// # Errors
///
/// Returns the wait-budget errors when polling gives up and [`Error::Api`]
/// for request failures.
pub async fn await_completed(
    api: &impl ExecutionStatusSource,
    devbox_id: &str,
    execution_id: &str,
    options: PollOptions<ExecutionView>,
) -> Result<ExecutionView, Error> {
    let options = options.stop_when(|e: &ExecutionView| e.status == ExecutionStatus::Completed);

    poll(
        || api.retrieve(devbox_id, execution_id),
        || api.retrieve(devbox_id, execution_id),
        options,
    )
    .await
    .map_err(|e| classify_poll_error("execution", execution_id, e, |exec| exec.status.as_str()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use super::*;

    fn view(status: ExecutionStatus, exit_status: Option<i32>) -> ExecutionView {
        ExecutionView {
            execution_id: "exe-1a2b3c".to_string(),
            devbox_id: "dbx-4d5e6f".to_string(),
            status,
            exit_status,
            stdout: None,
            stderr: None,
        }
    }

    fn fast_options() -> PollOptions<ExecutionView> {
        PollOptions::default()
            .with_initial_delay(Duration::ZERO)
            .with_interval(Duration::ZERO)
    }

    /// Stub serving a scripted sequence of statuses; the last entry repeats.
    struct ScriptedExecutionApi {
        script: Vec<ExecutionView>,
        calls: AtomicU32,
    }

    impl ExecutionStatusSource for ScriptedExecutionApi {
        async fn retrieve(
            &self,
            _devbox_id: &str,
            _execution_id: &str,
        ) -> Result<ExecutionView, ApiError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            let idx = n.min(self.script.len() - 1);
            Ok(self.script[idx].clone())
        }
    }

    #[tokio::test]
    async fn completion_wait_returns_the_finished_execution() {
        let api = ScriptedExecutionApi {
            script: vec![
                view(ExecutionStatus::Queued, None),
                view(ExecutionStatus::Running, None),
                view(ExecutionStatus::Completed, Some(0)),
            ],
            calls: AtomicU32::new(0),
        };
        let finished = await_completed(&api, "dbx-4d5e6f", "exe-1a2b3c", fast_options())
            .await
            .unwrap();

        assert_eq!(finished.status, ExecutionStatus::Completed);
        assert_eq!(finished.exit_status, Some(0));
        assert_eq!(api.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn a_nonzero_exit_is_still_a_completed_execution() {
        // A failed command is a successful wait: the execution settled.
        let api = ScriptedExecutionApi {
            script: vec![view(ExecutionStatus::Completed, Some(2))],
            calls: AtomicU32::new(0),
        };
        let finished = await_completed(&api, "dbx-4d5e6f", "exe-1a2b3c", fast_options())
            .await
            .unwrap();

        assert_eq!(finished.exit_status, Some(2));
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stuck_execution_exhausts_the_attempt_budget() {
        let api = ScriptedExecutionApi {
            script: vec![view(ExecutionStatus::Running, None)],
            calls: AtomicU32::new(0),
        };
        let err = await_completed(
            &api,
            "dbx-4d5e6f",
            "exe-1a2b3c",
            fast_options().with_max_attempts(2),
        )
        .await
        .unwrap_err();

        match err {
            Error::WaitAttemptsExhausted {
                resource,
                id,
                attempts,
                last_status,
            } => {
                assert_eq!(resource, "execution");
                assert_eq!(id, "exe-1a2b3c");
                assert_eq!(attempts, 2);
                assert_eq!(last_status, "running");
            }
            other => panic!("expected WaitAttemptsExhausted, got {other:?}"),
        }
    }
}
