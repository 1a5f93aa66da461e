use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a devbox.
///
/// `provisioning`, `initializing`, `suspending`, and `resuming` are transition
/// states; the rest are resting states (desirable or not).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DevboxStatus {
    Provisioning,
    Initializing,
    Running,
    Suspending,
    Suspended,
    Resuming,
    Failure,
    Shutdown,
}

impl DevboxStatus {
    /// Wire name of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Provisioning => "provisioning",
            Self::Initializing => "initializing",
            Self::Running => "running",
            Self::Suspending => "suspending",
            Self::Suspended => "suspended",
            Self::Resuming => "resuming",
            Self::Failure => "failure",
            Self::Shutdown => "shutdown",
        }
    }
}

/// A devbox as reported by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DevboxView {
    pub id: String,
    pub status: DevboxStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Blueprint the devbox was launched from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blueprint_id: Option<String>,
    /// Disk snapshot the devbox was launched from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Populated when the devbox landed in `failure`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

/// Parameters for launching a new devbox.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDevboxRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blueprint_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    /// Command run once the devbox reaches `running`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_variables: Option<HashMap<String, String>>,
}

/// Body for the long-poll status-change endpoint.
///
/// The server blocks until the devbox status leaves `transition_statuses` or
/// its own long-poll budget elapses (answered with HTTP 408).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwaitStatusChangeRequest {
    pub transition_statuses: Vec<DevboxStatus>,
}

/// List response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevboxListView {
    pub devboxes: Vec<DevboxView>,
}

/// Body for reading a file out of a devbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadFileRequest {
    pub file_path: String,
}

/// Body for writing a file into a devbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteFileRequest {
    pub file_path: String,
    pub contents: String,
}

/// File contents returned by the read-file endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileContentsView {
    pub contents: String,
}
