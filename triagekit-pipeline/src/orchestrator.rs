use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::Instrument;
use triagekit_core::{
    ColumnRoles, CompletionService, GenerationConfig, IssueDraft, IssueTracker, Metered, TableRef,
    TableStore, TriageError, Usage,
};

use crate::classify::FailureClassifier;
use crate::describe::{BugReportForm, DescriptionGenerator};
use crate::enforcer::StructuredRecord;
use crate::hotlist::HotlistRegistry;
use crate::merge::{MergeEngine, MergeResult, ReferenceFormat};
use crate::report::{CycleReport, CycleStatus};
use crate::summarize::{Summarizer, SummaryContent};

pub const ISSUE_URL_BASE: &str = "https://issuetracker.google.com/issues/";

/// A note for an existing issue, optionally followed by a classification
/// cycle against a test plan.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRequest {
    pub issue_id: String,
    pub note: String,
    /// Post a generated summary of `note` instead of the note itself.
    #[serde(default)]
    pub summarize: bool,
    pub description: String,
    #[serde(default)]
    pub reproducible: bool,
    pub table: Option<TableRef>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationReport {
    pub status: CycleStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle: Option<CycleReport>,
    pub tokens_used: u64,
    #[serde(flatten)]
    pub usage: Usage,
    #[serde(skip)]
    pub error: Option<TriageError>,
}

impl AnnotationReport {
    fn failed(err: TriageError, usage: Usage) -> Self {
        Self {
            status: CycleStatus::Error,
            message: err.to_string(),
            note: None,
            cycle: None,
            tokens_used: usage.total_tokens(),
            usage,
            error: Some(err),
        }
    }
}

/// A new issue to file.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilingRequest {
    pub title: String,
    pub body: String,
    pub component_id: String,
    pub priority: String,
    pub issue_type: String,
    pub device_type: String,
    pub application_type: String,
    /// Comma-separated ids of the issues this one blocks.
    #[serde(default)]
    pub blocking: String,
    #[serde(default)]
    pub hotlist_names: Vec<String>,
}

impl FilingRequest {
    fn missing_fields(&self) -> Vec<&str> {
        [
            ("title", &self.title),
            ("body", &self.body),
            ("component_id", &self.component_id),
            ("priority", &self.priority),
            ("issue_type", &self.issue_type),
            ("device_type", &self.device_type),
            ("application_type", &self.application_type),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    fn blocking_ids(&self) -> Vec<String> {
        self.blocking
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilingReport {
    pub issue_id: String,
    pub url: String,
    pub hotlist_ids: Vec<String>,
    pub blocking_ids: Vec<String>,
}

/// Sequences the pipeline stages against one completion service, one table
/// store and (optionally) one issue tracker.
pub struct Orchestrator {
    store: Arc<dyn TableStore>,
    tracker: Option<Arc<dyn IssueTracker>>,
    summarizer: Summarizer,
    describer: DescriptionGenerator,
    classifier: FailureClassifier,
    merger: MergeEngine,
    hotlists: HotlistRegistry,
    roles: ColumnRoles,
    issue_url_base: String,
}

impl Orchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }

    pub fn hotlists(&self) -> &HotlistRegistry {
        &self.hotlists
    }

    pub async fn summarize(
        &self,
        content: impl Into<SummaryContent>,
    ) -> Metered<Result<String, TriageError>> {
        self.summarizer.summarize(content).await
    }

    pub async fn describe(
        &self,
        form: &BugReportForm,
    ) -> Metered<Result<StructuredRecord, TriageError>> {
        self.describer.generate(form).await
    }

    /// Classifies the rows of `table` against `description` and marks the
    /// failing ones with `reference_id`.
    ///
    /// The header is checked before the model is called, and the table is
    /// read again just before merging.
    pub async fn run_cycle(
        &self,
        description: &str,
        table: &TableRef,
        reference_id: &str,
    ) -> CycleReport {
        let span = tracing::info_span!(
            "classification_cycle",
            table = %table,
            reference_id = %reference_id
        );
        async {
            let outcome = self
                .classify_and_merge(description, table, reference_id)
                .await;
            let report = CycleReport::from_outcome(reference_id, outcome);
            match &report.error {
                None => tracing::info!(
                    tokens_used = report.tokens_used,
                    cost_usd = report.usage.cost_usd,
                    "{}",
                    report.message
                ),
                Some(err) => tracing::error!(
                    error = %err,
                    retryable = err.is_retryable(),
                    tokens_used = report.tokens_used,
                    "classification cycle failed"
                ),
            }
            report
        }
        .instrument(span)
        .await
    }

    /// Runs the cycle up to `attempts` times, stopping at the first report
    /// that is not a retryable failure. Usage of every attempt is kept in
    /// the returned report.
    pub async fn run_cycle_with_attempts(
        &self,
        description: &str,
        table: &TableRef,
        reference_id: &str,
        attempts: usize,
    ) -> CycleReport {
        let attempts = attempts.max(1);
        let mut spent = Usage::default();
        let mut attempt = 1;
        loop {
            let mut report = self.run_cycle(description, table, reference_id).await;
            spent += report.usage;
            if report.is_retryable() && attempt < attempts {
                tracing::warn!(attempt, attempts, "retrying classification cycle");
                attempt += 1;
                continue;
            }
            report.usage = spent;
            report.tokens_used = spent.total_tokens();
            return report;
        }
    }

    async fn classify_and_merge(
        &self,
        description: &str,
        table: &TableRef,
        reference_id: &str,
    ) -> Metered<Result<MergeResult, TriageError>> {
        if reference_id.trim().is_empty() {
            return Metered::free(Err(TriageError::EmptyInput(
                "reference id is blank".to_string(),
            )));
        }

        let dataset = match self.store.read(table).await {
            Ok(dataset) => dataset,
            Err(err) => return Metered::free(Err(err)),
        };
        if let Err(err) = dataset.resolve(&self.roles) {
            return Metered::free(Err(err));
        }
        tracing::debug!(records = dataset.record_count(), "test plan loaded");

        let (outcome, usage) = self
            .classifier
            .classify(description, &dataset)
            .await
            .into_parts();
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(err) => return Metered::new(Err(err), usage),
        };

        Metered::new(
            self.merger.merge(table, &outcome, reference_id.trim()).await,
            usage,
        )
    }

    /// Adds a note to an existing issue, then runs a classification cycle
    /// when the issue is reproducible and a test plan was given.
    ///
    /// Usage of every completion call made is totalled in the report, also
    /// when a later step failed.
    pub async fn annotate(&self, request: AnnotationRequest) -> AnnotationReport {
        let tracker = match self.tracker() {
            Ok(tracker) => tracker,
            Err(err) => return AnnotationReport::failed(err, Usage::default()),
        };
        if request.issue_id.trim().is_empty() || request.note.trim().is_empty() {
            return AnnotationReport::failed(
                TriageError::EmptyInput("issue id or note is blank".to_string()),
                Usage::default(),
            );
        }
        let issue_id = request.issue_id.trim();

        let mut usage = Usage::default();
        let note = if request.summarize {
            let (summary, spent) = self
                .summarizer
                .summarize(request.note.as_str())
                .await
                .into_parts();
            usage += spent;
            match summary {
                Ok(summary) => summary,
                Err(err) => return AnnotationReport::failed(err, usage),
            }
        } else {
            request.note
        };

        if let Err(err) = tracker.add_note(issue_id, &note).await {
            return AnnotationReport::failed(err, usage);
        }
        tracing::info!(issue_id = %issue_id, "note added");

        let cycle = match (&request.table, request.reproducible) {
            (Some(table), true) => {
                Some(self.run_cycle(&request.description, table, issue_id).await)
            }
            _ => None,
        };
        usage += cycle.iter().map(|report| report.usage).sum::<Usage>();

        let (status, error) = match &cycle {
            Some(report) if !report.is_success() => (CycleStatus::Error, report.error.clone()),
            _ => (CycleStatus::Success, None),
        };
        AnnotationReport {
            status,
            message: format!("Note added to issue {issue_id}."),
            note: Some(note),
            cycle,
            tokens_used: usage.total_tokens(),
            usage,
            error,
        }
    }

    /// Files a new issue with its hotlists and blocking links resolved.
    ///
    /// Unknown hotlist names are dropped; every other field is required.
    pub async fn file_issue(&self, request: FilingRequest) -> Result<FilingReport, TriageError> {
        let tracker = self.tracker()?;
        let missing = request.missing_fields();
        if !missing.is_empty() {
            return Err(TriageError::EmptyInput(format!(
                "missing required fields for filing: {}",
                missing.join(", ")
            )));
        }

        let blocking_ids = request.blocking_ids();
        let hotlist_ids = self.hotlists.resolve(&request.hotlist_names);
        tracing::info!(
            component_id = %request.component_id,
            priority = %request.priority,
            device_type = %request.device_type,
            application_type = %request.application_type,
            hotlists = ?hotlist_ids,
            blocking = ?blocking_ids,
            "filing issue"
        );

        let issue_id = tracker
            .file_issue(IssueDraft {
                component_id: request.component_id,
                title: request.title,
                body: request.body,
                priority: request.priority,
                issue_type: request.issue_type,
                hotlist_ids: hotlist_ids.clone(),
                blocking_ids: blocking_ids.clone(),
            })
            .await?;
        if issue_id.trim().is_empty() {
            return Err(TriageError::Tracker(
                "issue was saved but no id was returned".to_string(),
            ));
        }

        Ok(FilingReport {
            url: format!("{}{}", self.issue_url_base, issue_id),
            issue_id,
            hotlist_ids,
            blocking_ids,
        })
    }

    fn tracker(&self) -> Result<&Arc<dyn IssueTracker>, TriageError> {
        self.tracker
            .as_ref()
            .ok_or_else(|| TriageError::Configuration("no issue tracker configured".to_string()))
    }
}

#[derive(Default)]
pub struct OrchestratorBuilder {
    completion: Option<Arc<dyn CompletionService>>,
    store: Option<Arc<dyn TableStore>>,
    tracker: Option<Arc<dyn IssueTracker>>,
    roles: Option<ColumnRoles>,
    format: Option<ReferenceFormat>,
    hotlists: Option<HotlistRegistry>,
    issue_url_base: Option<String>,
    classifier_config: Option<GenerationConfig>,
}

impl OrchestratorBuilder {
    pub fn completion(mut self, service: Arc<dyn CompletionService>) -> Self {
        self.completion = Some(service);
        self
    }

    pub fn store(mut self, store: Arc<dyn TableStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn tracker(mut self, tracker: Arc<dyn IssueTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn roles(mut self, roles: ColumnRoles) -> Self {
        self.roles = Some(roles);
        self
    }

    pub fn reference_format(mut self, format: ReferenceFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn hotlists(mut self, hotlists: HotlistRegistry) -> Self {
        self.hotlists = Some(hotlists);
        self
    }

    pub fn issue_url_base(mut self, base: impl Into<String>) -> Self {
        self.issue_url_base = Some(base.into());
        self
    }

    pub fn classifier_config(mut self, config: GenerationConfig) -> Self {
        self.classifier_config = Some(config);
        self
    }

    pub fn build(self) -> Result<Orchestrator, TriageError> {
        let completion = self.completion.ok_or_else(|| {
            TriageError::Configuration("completion service is required".to_string())
        })?;
        let store = self
            .store
            .ok_or_else(|| TriageError::Configuration("table store is required".to_string()))?;
        let roles = self.roles.unwrap_or_default();

        let mut classifier = FailureClassifier::new(completion.clone());
        if let Some(config) = self.classifier_config {
            classifier = classifier.with_config(config);
        }

        Ok(Orchestrator {
            merger: MergeEngine::new(store.clone())
                .with_roles(roles.clone())
                .with_format(self.format.unwrap_or_default()),
            store,
            tracker: self.tracker,
            summarizer: Summarizer::new(completion.clone()),
            describer: DescriptionGenerator::new(completion),
            classifier,
            hotlists: self.hotlists.unwrap_or_default(),
            roles,
            issue_url_base: self
                .issue_url_base
                .unwrap_or_else(|| ISSUE_URL_BASE.to_string()),
        })
    }
}
