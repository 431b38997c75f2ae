#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use triagekit_core::{
    CompletionRequest, CompletionResult, CompletionService, CostRates, IssueDraft, IssueTracker,
    TableRef, TabularDataset, TriageError, Usage,
};

/// Replays canned results in order and records every request.
#[derive(Default)]
pub struct ScriptedCompletion {
    results: Mutex<VecDeque<CompletionResult>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    pub fn new(results: impl IntoIterator<Item = CompletionResult>) -> Self {
        Self {
            results: Mutex::new(results.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn invoke(&self, request: CompletionRequest) -> CompletionResult {
        self.requests.lock().unwrap().push(request);
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(CompletionResult::TransportError {
                cause: "script exhausted".to_string(),
            })
    }
}

#[derive(Default)]
pub struct RecordingTracker {
    pub notes: Mutex<Vec<(String, String)>>,
    pub drafts: Mutex<Vec<IssueDraft>>,
}

#[async_trait]
impl IssueTracker for RecordingTracker {
    async fn add_note(&self, issue_id: &str, note: &str) -> Result<(), TriageError> {
        self.notes
            .lock()
            .unwrap()
            .push((issue_id.to_string(), note.to_string()));
        Ok(())
    }

    async fn file_issue(&self, draft: IssueDraft) -> Result<String, TriageError> {
        self.drafts.lock().unwrap().push(draft);
        Ok("424242".to_string())
    }
}

pub fn usage(prompt_tokens: u64, completion_tokens: u64) -> Usage {
    Usage::metered(prompt_tokens, completion_tokens, &CostRates::default())
}

pub fn success(text: &str, prompt_tokens: u64, completion_tokens: u64) -> CompletionResult {
    CompletionResult::Success {
        text: text.to_string(),
        usage: usage(prompt_tokens, completion_tokens),
    }
}

pub fn rate_limited() -> CompletionResult {
    CompletionResult::ApiError {
        http_status: 429,
        message: "Resource has been exhausted".to_string(),
    }
}

pub fn blocked(prompt_tokens: u64, completion_tokens: u64) -> CompletionResult {
    CompletionResult::ContentBlocked {
        reason: "SAFETY".to_string(),
        safety_detail: None,
        partial_text: None,
        usage: usage(prompt_tokens, completion_tokens),
    }
}

pub fn test_plan() -> TabularDataset {
    TabularDataset::from_rows([
        vec!["TC No", "Result", "Bug Id"],
        vec!["TC-1", "Pass", ""],
        vec!["TC-2", "Pass", "b/100"],
    ])
}

pub fn plan_ref() -> TableRef {
    TableRef::new("sheet-1", "Games Test Plan")
}
