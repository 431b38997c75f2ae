//! Shared types for the triagekit pipeline: completion envelopes and token
//! accounting, the tabular dataset model, the error taxonomy and the traits
//! behind which external collaborators (completion service, table storage,
//! issue tracker) live.

mod completion;
mod dataset;
mod error;
mod tracker;

pub use completion::{
    CompletionRequest, CompletionResult, CompletionService, CostRates, GenerationConfig, Metered,
    Usage,
};
pub use dataset::{
    ColumnRoles, ResolvedColumns, TableRef, TableStore, TabularDataset, DEFAULT_TAB,
};
pub use error::{ContractViolation, TriageError};
pub use tracker::{IssueDraft, IssueTracker};
