use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Build status of a blueprint.
///
/// `provisioning` and `building` are transition states; `build_complete` and
/// `failed` are resting states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BlueprintStatus {
    Provisioning,
    Building,
    BuildComplete,
    Failed,
}

impl BlueprintStatus {
    /// Wire name of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Provisioning => "provisioning",
            Self::Building => "building",
            Self::BuildComplete => "build_complete",
            Self::Failed => "failed",
        }
    }
}

/// A blueprint as reported by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlueprintView {
    pub id: String,
    pub name: String,
    pub status: BlueprintStatus,
    /// Populated when the build landed in `failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Parameters for registering a new blueprint build.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateBlueprintRequest {
    pub name: String,
    /// Dockerfile contents the image is built from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dockerfile: Option<String>,
    /// Commands run on top of the base image when no Dockerfile is given.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub system_setup_commands: Vec<String>,
}

/// List response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueprintListView {
    pub blueprints: Vec<BlueprintView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_complete_uses_snake_case_on_the_wire() {
        let json = serde_json::to_string(&BlueprintStatus::BuildComplete).unwrap();
        assert_eq!(json, "\"build_complete\"");
    }

    #[test]
    fn view_tolerates_absent_failure_reason() {
        let json = r#"{"id":"bpt-1a2b3c","name":"base-ci","status":"building"}"#;
        let view: BlueprintView = serde_json::from_str(json).unwrap();
        assert_eq!(view.status, BlueprintStatus::Building);
        assert!(view.failure_reason.is_none());
    }
}
