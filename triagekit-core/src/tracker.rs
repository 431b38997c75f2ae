use serde::{Deserialize, Serialize};

use crate::TriageError;

/// Everything the tracker needs to open a new issue.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct IssueDraft {
    pub component_id: String,
    pub title: String,
    pub body: String,
    pub priority: String,
    pub issue_type: String,
    pub hotlist_ids: Vec<String>,
    pub blocking_ids: Vec<String>,
}

/// The external issue tracker. Implementations own ticket storage; the
/// pipeline only ever annotates and files.
#[async_trait::async_trait]
pub trait IssueTracker: Send + Sync + 'static {
    /// Appends a note to an existing issue and saves it.
    async fn add_note(&self, issue_id: &str, note: &str) -> Result<(), TriageError>;

    /// Files a new issue and returns its id.
    async fn file_issue(&self, draft: IssueDraft) -> Result<String, TriageError>;
}
