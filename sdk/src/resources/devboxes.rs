//! Devbox lifecycle, command execution, file I/O, and the state-wait
//! specialization over the server-side long-poll endpoint.

use devgrid_api_types::{
    AwaitStatusChangeRequest, CreateDevboxRequest, DevboxListView, DevboxStatus, DevboxView,
    DiskSnapshotView, ExecRequest, ExecutionView, FileContentsView, ReadFileRequest,
    WriteFileRequest,
};
use tracing::debug;

use super::classify_poll_error;
use crate::error::{ApiError, Error};
use crate::http::Http;
use crate::polling::{PollOptions, poll};

/// Transition states crossed on the way to `running`, whether booting for
/// the first time or resuming from `suspended`.
pub const RUNNING_TRANSITIONS: &[DevboxStatus] = &[
    DevboxStatus::Provisioning,
    DevboxStatus::Initializing,
    DevboxStatus::Resuming,
];

/// Transition states crossed on the way to `suspended`.
pub const SUSPEND_TRANSITIONS: &[DevboxStatus] = &[DevboxStatus::Suspending];

/// Status operations the devbox waiters need.
#[allow(async_fn_in_trait)]
pub trait DevboxStatusSource {
    /// Fetch the devbox.
    async fn retrieve(&self, id: &str) -> Result<DevboxView, ApiError>;

    /// Long-poll until the devbox status leaves `transitions` or the server's
    /// own long-poll budget elapses, answered with HTTP 408.
    async fn await_status_change(
        &self,
        id: &str,
        transitions: &[DevboxStatus],
    ) -> Result<DevboxView, ApiError>;
}

/// Devbox resource methods.
pub struct Devboxes<'a> {
    pub(crate) http: &'a Http,
}

impl Devboxes<'_> {
    /// Launch a new devbox.
    ///
    /// The returned view is usually still `provisioning`; follow with
    /// [`Devboxes::await_running`].
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    pub async fn create(&self, request: &CreateDevboxRequest) -> Result<DevboxView, ApiError> {
        self.http.post("/v1/devboxes", request).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the devbox does not exist.
    pub async fn retrieve(&self, id: &str) -> Result<DevboxView, ApiError> {
        self.http.get(&format!("/v1/devboxes/{id}")).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list(&self) -> Result<Vec<DevboxView>, ApiError> {
        let view: DevboxListView = self.http.get("/v1/devboxes").await?;
        Ok(view.devboxes)
    }

    /// Suspend a running devbox, preserving its disk and memory state.
    ///
    /// # Errors
    ///
    /// Returns an error if the devbox is not in a suspendable state.
    pub async fn suspend(&self, id: &str) -> Result<DevboxView, ApiError> {
        self.http.post_empty(&format!("/v1/devboxes/{id}/suspend")).await
    }

    /// Resume a suspended devbox.
    ///
    /// # Errors
    ///
    /// Returns an error if the devbox is not suspended.
    pub async fn resume(&self, id: &str) -> Result<DevboxView, ApiError> {
        self.http.post_empty(&format!("/v1/devboxes/{id}/resume")).await
    }

    /// Permanently shut a devbox down.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn shutdown(&self, id: &str) -> Result<DevboxView, ApiError> {
        self.http.post_empty(&format!("/v1/devboxes/{id}/shutdown")).await
    }

    /// Kick off an asynchronous disk snapshot of the devbox.
    ///
    /// Completion is tracked with
    /// [`crate::resources::snapshots::await_complete`].
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn snapshot_disk(&self, id: &str) -> Result<DiskSnapshotView, ApiError> {
        self.http.post_empty(&format!("/v1/devboxes/{id}/snapshot_disk")).await
    }

    /// Run a command and wait server-side for it to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn execute_sync(&self, id: &str, request: &ExecRequest) -> Result<ExecutionView, ApiError> {
        self.http.post(&format!("/v1/devboxes/{id}/execute_sync"), request).await
    }

    /// Start a command without waiting for it; completion is tracked with
    /// [`crate::resources::executions::await_completed`].
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn execute_async(&self, id: &str, request: &ExecRequest) -> Result<ExecutionView, ApiError> {
        self.http.post(&format!("/v1/devboxes/{id}/execute_async"), request).await
    }

    /// Read a file out of the devbox filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the path does not exist.
    pub async fn read_file(&self, id: &str, file_path: &str) -> Result<String, ApiError> {
        let body = ReadFileRequest {
            file_path: file_path.to_string(),
        };
        let view: FileContentsView = self
            .http
            .post(&format!("/v1/devboxes/{id}/read_file_contents"), &body)
            .await?;
        Ok(view.contents)
    }

    /// Write a file into the devbox filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn write_file(&self, id: &str, file_path: &str, contents: &str) -> Result<(), ApiError> {
        let body = WriteFileRequest {
            file_path: file_path.to_string(),
            contents: contents.to_string(),
        };
        let _: serde_json::Value = self
            .http
            .post(&format!("/v1/devboxes/{id}/write_file_contents"), &body)
            .await?;
        Ok(())
    }

    /// Wait for a freshly launched (or resuming) devbox to reach `running`.
    ///
    /// # Errors
    ///
    /// See [`wait_for_status`].
    pub async fn await_running(&self, id: &str) -> Result<DevboxView, Error> {
        wait_for_status(
            self,
            id,
            DevboxStatus::Running,
            RUNNING_TRANSITIONS,
            PollOptions::default(),
        )
        .await
    }

    /// Wait for a suspending devbox to reach `suspended`.
    ///
    /// # Errors
    ///
    /// See [`wait_for_status`].
    pub async fn await_suspended(&self, id: &str) -> Result<DevboxView, Error> {
        wait_for_status(
            self,
            id,
            DevboxStatus::Suspended,
            SUSPEND_TRANSITIONS,
            PollOptions::default(),
        )
        .await
    }
}

impl DevboxStatusSource for Devboxes<'_> {
    async fn retrieve(&self, id: &str) -> Result<DevboxView, ApiError> {
        Devboxes::retrieve(self, id).await
    }

    async fn await_status_change(
        &self,
        id: &str,
        transitions: &[DevboxStatus],
    ) -> Result<DevboxView, ApiError> {
        let body = AwaitStatusChangeRequest {
            transition_statuses: transitions.to_vec(),
        };
        self.http
            .post_long_poll(&format!("/v1/devboxes/{id}/await_status_change"), &body)
            .await
    }
}

/// Wait until the devbox status leaves `transitions`, then require `target`.
///
/// The initial request is a plain status fetch; subsequent attempts hit the
/// server-side long-poll. The server's 408 continuation answer is folded back
/// into a synthetic still-transitioning view so the loop simply retries;
/// every other error propagates. The engine only guarantees "stopped
/// transitioning" — the final comparison against `target` is what makes this
/// a success.
///
/// The stop predicate and error recovery are owned by this function; caller
/// `options` configure pacing and budgets only.
///
/// # Errors
///
/// Returns [`Error::UnexpectedDevboxStatus`] when the devbox rests in a state
/// other than `target`, the wait-budget errors when polling gives up, and
/// [`Error::Api`] for unrecovered request failures.
pub async fn wait_for_status(
    api: &impl DevboxStatusSource,
    id: &str,
    target: DevboxStatus,
    transitions: &[DevboxStatus],
    options: PollOptions<DevboxView>,
) -> Result<DevboxView, Error> {
    let Some(&placeholder) = transitions.first() else {
        return Err(Error::Config("transition set must not be empty".to_string()));
    };

    let stop_set = transitions.to_vec();
    let synthetic_id = id.to_string();
    let options = options
        .stop_when(move |d: &DevboxView| !stop_set.contains(&d.status))
        .on_error(move |err| {
            if err.is_request_timeout() {
                debug!(devbox = %synthetic_id, "long poll expired server-side; continuing");
                Ok(DevboxView {
                    id: synthetic_id.clone(),
                    status: placeholder,
                    name: None,
                    blueprint_id: None,
                    snapshot_id: None,
                    created_at: None,
                    failure_reason: None,
                })
            } else {
                Err(err)
            }
        });

    let settled = poll(
        || api.retrieve(id),
        || api.await_status_change(id, transitions),
        options,
    )
    .await
    .map_err(|e| classify_poll_error("devbox", id, e, |d| d.status.as_str()))?;

    if settled.status == target {
        Ok(settled)
    } else {
        Err(Error::UnexpectedDevboxStatus {
            id: id.to_string(),
            expected: target,
            actual: settled.status,
        })
    }
}
