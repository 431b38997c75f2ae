use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TriageError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    #[error("Completion API error {http_status}: {message}")]
    Api { http_status: u16, message: String },
    #[error("Content blocked ({reason})")]
    ContentBlocked {
        reason: String,
        safety_detail: Option<String>,
    },
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error(transparent)]
    Contract(#[from] ContractViolation),
    #[error("Required columns not found in table header: {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },
    #[error("Dataset access failed for '{table}': {reason}")]
    Dataset { table: String, reason: String },
    #[error("Empty input: {0}")]
    EmptyInput(String),
    #[error("Issue tracker failed: {0}")]
    Tracker(String),
}

impl TriageError {
    /// Whether re-running the whole cycle could plausibly succeed.
    ///
    /// Configuration and schema problems never fix themselves; rate limits,
    /// server errors and broken connections might.
    pub fn is_retryable(&self) -> bool {
        match self {
            TriageError::Transport(_) => true,
            TriageError::Api { http_status, .. } => {
                *http_status == 429 || (500..600).contains(http_status)
            }
            _ => false,
        }
    }
}

/// Model text that does not honour the `{title, body}` JSON contract.
///
/// Every variant carries the text that was inspected so the caller can show
/// what the model actually produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    #[error("Structured output is not a JSON object envelope: {text}")]
    MalformedEnvelope { text: String },
    #[error("Structured output is not valid JSON ({message}); attempted to parse: {text}")]
    InvalidJson { message: String, text: String },
    #[error("Structured output is missing string field '{field}': {text}")]
    MissingField { field: String, text: String },
}

impl ContractViolation {
    pub fn text(&self) -> &str {
        match self {
            ContractViolation::MalformedEnvelope { text }
            | ContractViolation::InvalidJson { text, .. }
            | ContractViolation::MissingField { text, .. } => text,
        }
    }
}
