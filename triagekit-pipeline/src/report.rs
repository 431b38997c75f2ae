use serde::Serialize;
use triagekit_core::{Metered, TriageError, Usage};

use crate::merge::{MergeResult, MergeStatus};

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub enum CycleStatus {
    Success,
    Error,
}

/// What a classification cycle hands back to its caller.
///
/// Usage covers every completion call made, including on the error path.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    pub status: CycleStatus,
    pub message: String,
    pub tokens_used: u64,
    #[serde(flatten)]
    pub usage: Usage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge: Option<MergeResult>,
    #[serde(skip)]
    pub error: Option<TriageError>,
}

impl CycleReport {
    pub fn from_outcome(
        reference_id: &str,
        outcome: Metered<Result<MergeResult, TriageError>>,
    ) -> Self {
        let (result, usage) = outcome.into_parts();
        match result {
            Ok(merge) => {
                let message = match merge.status {
                    MergeStatus::Updated => format!(
                        "Updated {} test cases to '{}' for Bug ID {}.",
                        merge.rows_updated,
                        crate::merge::FAIL_RESULT,
                        reference_id
                    ),
                    MergeStatus::NoChanges => "No test cases were updated as 'Fail'.".to_string(),
                };
                Self {
                    status: CycleStatus::Success,
                    message,
                    tokens_used: usage.total_tokens(),
                    usage,
                    merge: Some(merge),
                    error: None,
                }
            }
            Err(err) => Self {
                status: CycleStatus::Error,
                message: err.to_string(),
                tokens_used: usage.total_tokens(),
                usage,
                merge: None,
                error: Some(err),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == CycleStatus::Success
    }

    /// Whether running the same cycle again might succeed.
    pub fn is_retryable(&self) -> bool {
        self.error.as_ref().is_some_and(TriageError::is_retryable)
    }
}
