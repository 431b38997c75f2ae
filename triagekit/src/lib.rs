//! AI-assisted bug triage: draft and summarize bug reports, predict which
//! test cases a bug breaks, and mark them in a shared test plan.
//!
//! This crate re-exports the workspace crates behind cargo features:
//!
//! | feature  | crate               |
//! |----------|---------------------|
//! | `gemini` | `triagekit-llm`     |
//! | `sheets` | `triagekit-sheets`  |
//!
//! `core`, `prompt` and `pipeline` are always available.

pub use triagekit_core as core;
pub use triagekit_pipeline as pipeline;
pub use triagekit_prompt as prompt;

#[cfg(feature = "gemini")]
pub use triagekit_llm as llm;

#[cfg(feature = "sheets")]
pub use triagekit_sheets as sheets;

pub use triagekit_core::{TriageError, Usage};
pub use triagekit_pipeline::{Orchestrator, OrchestratorBuilder};
