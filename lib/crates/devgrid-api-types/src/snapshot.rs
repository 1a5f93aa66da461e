use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a devbox disk snapshot.
///
/// `pending` and `in_progress` are transition states; `complete` and `error`
/// are resting states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiskSnapshotStatus {
    Pending,
    InProgress,
    Complete,
    Error,
}

impl DiskSnapshotStatus {
    /// Wire name of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }
}

/// A disk snapshot as reported by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiskSnapshotView {
    pub id: String,
    pub status: DiskSnapshotStatus,
    /// Devbox the snapshot was taken from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_devbox_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Populated when the snapshot landed in `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// List response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskSnapshotListView {
    pub snapshots: Vec<DiskSnapshotView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_progress_uses_snake_case_on_the_wire() {
        let json = serde_json::to_string(&DiskSnapshotStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn view_tolerates_absent_optional_fields() {
        let json = r#"{"id":"dsn-1a2b3c","status":"complete"}"#;
        let view: DiskSnapshotView = serde_json::from_str(json).unwrap();
        assert_eq!(view.status, DiskSnapshotStatus::Complete);
        assert!(view.source_devbox_id.is_none());
    }
}
