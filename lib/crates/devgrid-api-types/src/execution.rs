use serde::{Deserialize, Serialize};

/// Status of a command execution inside a devbox.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Queued,
    Running,
    Completed,
}

impl ExecutionStatus {
    /// Wire name of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
        }
    }
}

/// Parameters for running a command inside a devbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecRequest {
    pub command: String,
    /// Named shell to run under; the devbox default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell_name: Option<String>,
}

/// A command execution as reported by the API.
///
/// `exit_status`, `stdout`, and `stderr` are populated once the execution
/// reaches `completed`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionView {
    pub execution_id: String,
    pub devbox_id: String,
    pub status: ExecutionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_status: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_execution_has_no_exit_status() {
        let json = r#"{"execution_id":"exe-1a2b3c","devbox_id":"dbx-4d5e6f","status":"running"}"#;
        let view: ExecutionView = serde_json::from_str(json).unwrap();
        assert_eq!(view.status, ExecutionStatus::Running);
        assert!(view.exit_status.is_none());
    }

    #[test]
    fn exec_request_skips_unset_shell() {
        let req = ExecRequest {
            command: "cargo test".to_string(),
            shell_name: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"command":"cargo test"}"#);
    }
}
