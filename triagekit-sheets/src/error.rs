use thiserror::Error;
use triagekit_core::{TableRef, TriageError};

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("sheets api error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl SheetsError {
    pub fn for_table(self, table: &TableRef) -> TriageError {
        match self {
            SheetsError::Config(message) => TriageError::Configuration(message),
            other => TriageError::Dataset {
                table: table.to_string(),
                reason: other.to_string(),
            },
        }
    }
}
