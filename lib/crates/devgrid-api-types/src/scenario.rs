use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a scenario run.
///
/// `running` and `scoring` are transition states; `scored`, `failed`, and
/// `canceled` are resting states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioRunStatus {
    Running,
    Scoring,
    Scored,
    Failed,
    Canceled,
}

impl ScenarioRunStatus {
    /// Wire name of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Scoring => "scoring",
            Self::Scored => "scored",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        }
    }
}

/// A scenario run as reported by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioRunView {
    pub id: String,
    pub scenario_id: String,
    pub status: ScenarioRunStatus,
    /// Devbox the run executes in while alive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devbox_id: Option<String>,
    /// Final score in `[0, 1]`, populated once the run reaches `scored`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body for requesting server-side scoring of a finished run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreRunRequest {
    /// Scorer to apply; the scenario default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scorer_name: Option<String>,
}

/// List response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRunListView {
    pub runs: Vec<ScenarioRunView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scored_run_carries_score() {
        let json = r#"{"id":"srn-1a2b3c","scenario_id":"scn-4d5e6f","status":"scored","score":0.85}"#;
        let view: ScenarioRunView = serde_json::from_str(json).unwrap();
        assert_eq!(view.status, ScenarioRunStatus::Scored);
        assert_eq!(view.score, Some(0.85));
    }

    #[test]
    fn scoring_run_has_no_score_yet() {
        let json = r#"{"id":"srn-1a2b3c","scenario_id":"scn-4d5e6f","status":"scoring"}"#;
        let view: ScenarioRunView = serde_json::from_str(json).unwrap();
        assert_eq!(view.status, ScenarioRunStatus::Scoring);
        assert!(view.score.is_none());
    }
}
