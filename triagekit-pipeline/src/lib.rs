//! The triage pipeline proper.
//!
//! Each stage takes its collaborators as trait objects from
//! `triagekit-core` and returns its token usage alongside its result, so
//! the [`Orchestrator`] can total telemetry by plain summation even when a
//! later stage fails.

mod classify;
mod describe;
mod enforcer;
mod hotlist;
mod merge;
mod orchestrator;
mod report;
mod summarize;

pub use classify::{parse_classifier_output, ClassificationOutcome, FailureClassifier};
pub use describe::{BugReportForm, DescriptionGenerator};
pub use enforcer::{enforce, StructuredRecord};
pub use hotlist::{Hotlist, HotlistFilter, HotlistRegistry};
pub use merge::{apply_merge, MergeEngine, MergeResult, MergeStatus, ReferenceFormat, FAIL_RESULT};
pub use orchestrator::{
    AnnotationReport, AnnotationRequest, FilingReport, FilingRequest, Orchestrator,
    OrchestratorBuilder, ISSUE_URL_BASE,
};
pub use report::{CycleReport, CycleStatus};
pub use summarize::{Summarizer, SummaryContent};
