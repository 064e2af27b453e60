//! Workflow request/result data model.
//!
//! All types serialize as camelCase to match the wire contract of the
//! surrounding services. A `WorkflowRequest`/`WorkflowResult` pair lives
//! for one inbound submission and is never durably stored.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::workflow::error::WorkflowError;

/// Kind of submission driving the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionType {
    Assignment,
    Project,
    Challenge,
}

/// Inbound request that triggers one saga execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRequest {
    pub submission_id: String,
    pub user_id: String,
    pub submission_type: SubmissionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, Value>>,
}

impl WorkflowRequest {
    /// A submission must carry a repository URL or inline code.
    pub fn has_submission_source(&self) -> bool {
        self.repository_url.is_some() || self.code_content.is_some()
    }
}

/// Outcome of a single stage that actually ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp_ms: u64,
}

impl StepResult {
    pub fn succeeded(data: Option<Value>) -> Self {
        Self {
            success: true,
            data,
            error: None,
            timestamp_ms: epoch_ms(),
        }
    }

    pub fn failed(error: &WorkflowError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            timestamp_ms: epoch_ms(),
        }
    }
}

/// Named per-stage results. Stages that never ran are omitted from JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<StepResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission: Option<StepResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<StepResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamification: Option<StepResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics: Option<StepResult>,
}

/// Aggregated outcome of one saga execution.
///
/// `success` reflects the mandatory stages only; enrichment failures are
/// visible in `steps` but never flip the top-level flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResult {
    pub success: bool,
    pub submission_id: String,
    pub steps: StepResults,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub completed_at_ms: u64,
}

impl WorkflowResult {
    /// Mandatory stages completed; enrichment outcomes are in `steps`.
    pub fn completed(submission_id: String, steps: StepResults) -> Self {
        Self {
            success: true,
            submission_id,
            steps,
            error: None,
            completed_at_ms: epoch_ms(),
        }
    }

    /// A mandatory stage failed; only the stages that ran are present.
    pub fn halted(submission_id: String, steps: StepResults, error: &WorkflowError) -> Self {
        Self {
            success: false,
            submission_id,
            steps,
            error: Some(error.to_string()),
            completed_at_ms: epoch_ms(),
        }
    }
}

pub(crate) fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_deserializes_camel_case() {
        let request: WorkflowRequest = serde_json::from_str(
            r#"{"submissionId":"s1","userId":"u1","submissionType":"assignment","codeContent":"console.log(1)"}"#,
        )
        .unwrap();
        assert_eq!(request.submission_id, "s1");
        assert_eq!(request.submission_type, SubmissionType::Assignment);
        assert!(request.repository_url.is_none());
        assert!(request.has_submission_source());
    }

    #[test]
    fn request_without_source_fails_invariant() {
        let request: WorkflowRequest = serde_json::from_str(
            r#"{"submissionId":"s1","userId":"u1","submissionType":"project"}"#,
        )
        .unwrap();
        assert!(!request.has_submission_source());
    }

    #[test]
    fn absent_steps_are_omitted_from_json() {
        let mut steps = StepResults::default();
        steps.validation = Some(StepResult::failed(&WorkflowError::Validation(
            "missing source".to_string(),
        )));
        let result = WorkflowResult::halted(
            "s1".to_string(),
            steps,
            &WorkflowError::Validation("missing source".to_string()),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["steps"].get("validation").is_some());
        assert!(json["steps"].get("submission").is_none());
        assert!(json["steps"].get("feedback").is_none());
    }
}
