use serde::{Deserialize, Serialize};
use serde_json::Value;
use triagekit_core::ContractViolation;

const FENCE: &str = "```";

/// A `{title, body}` pair pulled out of model text.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct StructuredRecord {
    pub title: String,
    pub body: String,
}

/// Checks that `raw` is a JSON object carrying string `title` and `body`
/// fields and extracts them.
///
/// A surrounding markdown code fence (with or without a language tag) is
/// removed first. Only the shape is checked, never the prose.
pub fn enforce(raw: &str) -> Result<StructuredRecord, ContractViolation> {
    let text = strip_fences(raw);
    if !(text.starts_with('{') && text.ends_with('}')) {
        return Err(ContractViolation::MalformedEnvelope {
            text: text.to_string(),
        });
    }

    let value: Value =
        serde_json::from_str(text).map_err(|err| ContractViolation::InvalidJson {
            message: err.to_string(),
            text: text.to_string(),
        })?;

    Ok(StructuredRecord {
        title: string_field(&value, "title", text)?,
        body: string_field(&value, "body", text)?,
    })
}

fn string_field(value: &Value, field: &str, text: &str) -> Result<String, ContractViolation> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ContractViolation::MissingField {
            field: field.to_string(),
            text: text.to_string(),
        })
}

fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix(FENCE) {
        text = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    }
    if let Some(rest) = text.strip_suffix(FENCE) {
        text = rest;
    }
    text.trim()
}
