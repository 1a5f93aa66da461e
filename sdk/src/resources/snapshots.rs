//! Disk snapshot queries and the completion wait.
//!
//! Snapshots are created from a devbox via
//! [`crate::resources::devboxes::Devboxes::snapshot_disk`]; this module tracks
//! them afterwards.

use devgrid_api_types::{DiskSnapshotListView, DiskSnapshotStatus, DiskSnapshotView};

use super::classify_poll_error;
use crate::error::{ApiError, Error};
use crate::http::Http;
use crate::polling::{PollOptions, poll};

/// Status operations the snapshot waiter needs.
#[allow(async_fn_in_trait)]
pub trait SnapshotStatusSource {
    /// Fetch the snapshot.
    async fn retrieve(&self, id: &str) -> Result<DiskSnapshotView, ApiError>;
}

/// Disk snapshot resource methods.
pub struct Snapshots<'a> {
    pub(crate) http: &'a Http,
}

impl Snapshots<'_> {
    /// # Errors
    ///
    /// Returns an error if the request fails or the snapshot does not exist.
    pub async fn retrieve(&self, id: &str) -> Result<DiskSnapshotView, ApiError> {
        self.http.get(&format!("/v1/devboxes/disk_snapshots/{id}")).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list(&self) -> Result<Vec<DiskSnapshotView>, ApiError> {
        let view: DiskSnapshotListView = self.http.get("/v1/devboxes/disk_snapshots").await?;
        Ok(view.snapshots)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete(&self, id: &str) -> Result<DiskSnapshotView, ApiError> {
        self.http.delete(&format!("/v1/devboxes/disk_snapshots/{id}")).await
    }

    /// Wait for the snapshot to finish successfully.
    ///
    /// # Errors
    ///
    /// See [`await_complete`].
    pub async fn await_complete(&self, id: &str) -> Result<DiskSnapshotView, Error> {
        await_complete(self, id, PollOptions::default()).await
    }
}

impl SnapshotStatusSource for Snapshots<'_> {
    async fn retrieve(&self, id: &str) -> Result<DiskSnapshotView, ApiError> {
        Snapshots::retrieve(self, id).await
    }
}

/// Wait until the snapshot reaches `complete` or `error`.
///
/// The `error` resting state is translated into [`Error::SnapshotFailed`]
/// carrying the server-supplied message.
///
/// # Errors
///
/// Returns [`Error::SnapshotFailed`] when the snapshot rests in `error`, the
/// wait-budget errors when polling gives up, and [`Error::Api`] for request
/// failures.
pub async fn await_complete(
    api: &impl SnapshotStatusSource,
    id: &str,
    options: PollOptions<DiskSnapshotView>,
) -> Result<DiskSnapshotView, Error> {
    let options = options.stop_when(|s: &DiskSnapshotView| {
        matches!(
            s.status,
            DiskSnapshotStatus::Complete | DiskSnapshotStatus::Error
        )
    });

    let settled = poll(|| api.retrieve(id), || api.retrieve(id), options)
        .await
        .map_err(|e| classify_poll_error("disk snapshot", id, e, |s| s.status.as_str()))?;

    if settled.status == DiskSnapshotStatus::Complete {
        Ok(settled)
    } else {
        Err(Error::SnapshotFailed {
            id: id.to_string(),
            message: settled
                .failure_reason
                .unwrap_or_else(|| "no failure reason supplied".to_string()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use super::*;

    fn view(status: DiskSnapshotStatus, reason: Option<&str>) -> DiskSnapshotView {
        DiskSnapshotView {
            id: "dsn-1a2b3c".to_string(),
            status,
            source_devbox_id: Some("dbx-4d5e6f".to_string()),
            name: None,
            failure_reason: reason.map(str::to_string),
            created_at: None,
        }
    }

    fn fast_options() -> PollOptions<DiskSnapshotView> {
        PollOptions::default()
            .with_initial_delay(Duration::ZERO)
            .with_interval(Duration::ZERO)
    }

    /// Stub serving a scripted sequence of statuses; the last entry repeats.
    struct ScriptedSnapshotApi {
        script: Vec<DiskSnapshotView>,
        calls: AtomicU32,
    }

    impl SnapshotStatusSource for ScriptedSnapshotApi {
        async fn retrieve(&self, _id: &str) -> Result<DiskSnapshotView, ApiError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            let idx = n.min(self.script.len() - 1);
            Ok(self.script[idx].clone())
        }
    }

    #[tokio::test]
    async fn snapshot_wait_returns_on_complete() {
        let api = ScriptedSnapshotApi {
            script: vec![
                view(DiskSnapshotStatus::Pending, None),
                view(DiskSnapshotStatus::InProgress, None),
                view(DiskSnapshotStatus::Complete, None),
            ],
            calls: AtomicU32::new(0),
        };
        let settled = await_complete(&api, "dsn-1a2b3c", fast_options()).await.unwrap();
        assert_eq!(settled.status, DiskSnapshotStatus::Complete);
        assert_eq!(api.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn error_status_carries_the_server_message() {
        let api = ScriptedSnapshotApi {
            script: vec![
                view(DiskSnapshotStatus::InProgress, None),
                view(DiskSnapshotStatus::Error, Some("volume detached mid-copy")),
            ],
            calls: AtomicU32::new(0),
        };
        let err = await_complete(&api, "dsn-1a2b3c", fast_options()).await.unwrap_err();

        match err {
            Error::SnapshotFailed { id, message } => {
                assert_eq!(id, "dsn-1a2b3c");
                assert_eq!(message, "volume detached mid-copy");
            }
            other => panic!("expected SnapshotFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_status_without_message_still_fails_descriptively() {
        let api = ScriptedSnapshotApi {
            script: vec![view(DiskSnapshotStatus::Error, None)],
            calls: AtomicU32::new(0),
        };
        let err = await_complete(&api, "dsn-1a2b3c", fast_options()).await.unwrap_err();
        assert!(
            err.to_string().contains("no failure reason supplied"),
            "got: {err}"
        );
    }
}
