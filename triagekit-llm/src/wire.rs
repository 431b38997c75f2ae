use serde::{Deserialize, Serialize};
use serde_json::Value;
use triagekit_core::{CompletionResult, CostRates, GenerationConfig, Usage};

const FINISH_STOP: &str = "STOP";
const UNEXPECTED_SHAPE: &str = "unexpected response shape";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    pub(crate) fn new(prompt: &str, generation_config: GenerationConfig) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
    safety_ratings: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
    safety_ratings: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorResponse {
    error: GoogleErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    message: String,
}

/// Pulls `error.message` out of a JSON error body, falling back to the raw text.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<GoogleErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

/// Maps the body of an HTTP 200 `generateContent` response to a result.
///
/// Usage is priced once here. Absent usage metadata means zero tokens.
pub fn interpret_response(body: &str, rates: &CostRates) -> CompletionResult {
    let response = match serde_json::from_str::<GenerateContentResponse>(body) {
        Ok(response) => response,
        Err(err) => {
            return CompletionResult::TransportError {
                cause: format!("malformed response body: {err}"),
            }
        }
    };

    let usage = response
        .usage_metadata
        .map(|meta| Usage::metered(meta.prompt_token_count, meta.candidates_token_count, rates))
        .unwrap_or_default();

    let prompt_block = response.prompt_feedback.and_then(|feedback| {
        feedback
            .block_reason
            .map(|reason| (reason, feedback.safety_ratings.map(|v| v.to_string())))
    });

    let Some(candidate) = response.candidates.into_iter().next() else {
        return match prompt_block {
            Some((reason, safety_detail)) => CompletionResult::ContentBlocked {
                reason,
                safety_detail,
                partial_text: None,
                usage,
            },
            None => CompletionResult::ApiError {
                http_status: 200,
                message: UNEXPECTED_SHAPE.to_string(),
            },
        };
    };

    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .filter(|text| !text.is_empty());

    match candidate.finish_reason {
        Some(reason) if reason != FINISH_STOP => CompletionResult::ContentBlocked {
            reason,
            safety_detail: candidate.safety_ratings.map(|v| v.to_string()),
            partial_text: text,
            usage,
        },
        _ => match (text, prompt_block) {
            (Some(text), _) => CompletionResult::Success { text, usage },
            (None, Some((reason, safety_detail))) => CompletionResult::ContentBlocked {
                reason,
                safety_detail,
                partial_text: None,
                usage,
            },
            (None, None) => CompletionResult::ApiError {
                http_status: 200,
                message: UNEXPECTED_SHAPE.to_string(),
            },
        },
    }
}
