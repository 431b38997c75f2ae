use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::TriageError;

const MISSING_CREDENTIAL: &str = "missing credential";

/// Sampling parameters sent with every completion call.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl GenerationConfig {
    pub fn new(temperature: f32, max_output_tokens: u32) -> Self {
        Self {
            temperature,
            max_output_tokens,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(0.5, 200)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    prompt: String,
    config: GenerationConfig,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, config: GenerationConfig) -> Self {
        Self {
            prompt: prompt.into(),
            config,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn config(&self) -> GenerationConfig {
        self.config
    }
}

/// Price per million tokens, in USD.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub struct CostRates {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl CostRates {
    pub fn new(input_per_million: f64, output_per_million: f64) -> Self {
        Self {
            input_per_million,
            output_per_million,
        }
    }

    pub fn cost(&self, prompt_tokens: u64, completion_tokens: u64) -> f64 {
        prompt_tokens as f64 / 1e6 * self.input_per_million
            + completion_tokens as f64 / 1e6 * self.output_per_million
    }
}

impl Default for CostRates {
    /// Gemini Flash list prices.
    fn default() -> Self {
        Self::new(0.35, 1.05)
    }
}

/// Token and cost accounting for one or more completion calls.
///
/// Cost is fixed when the usage is metered and only ever summed afterwards.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    #[serde(rename = "costUSD")]
    pub cost_usd: f64,
}

impl Usage {
    pub fn metered(prompt_tokens: u64, completion_tokens: u64, rates: &CostRates) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            cost_usd: rates.cost(prompt_tokens, completion_tokens),
        }
    }

    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

impl Add for Usage {
    type Output = Usage;

    fn add(self, rhs: Usage) -> Usage {
        Usage {
            prompt_tokens: self.prompt_tokens + rhs.prompt_tokens,
            completion_tokens: self.completion_tokens + rhs.completion_tokens,
            cost_usd: self.cost_usd + rhs.cost_usd,
        }
    }
}

impl AddAssign for Usage {
    fn add_assign(&mut self, rhs: Usage) {
        *self = *self + rhs;
    }
}

impl Sum for Usage {
    fn sum<I: Iterator<Item = Usage>>(iter: I) -> Usage {
        iter.fold(Usage::default(), Add::add)
    }
}

/// The envelope every completion call resolves to. Exactly one case applies.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CompletionResult {
    Success {
        text: String,
        usage: Usage,
    },
    #[serde(rename_all = "camelCase")]
    ApiError {
        http_status: u16,
        message: String,
    },
    /// Generation stopped for a non-`STOP` reason, or the prompt was refused
    /// before generation. Tokens consumed are still charged.
    #[serde(rename_all = "camelCase")]
    ContentBlocked {
        reason: String,
        safety_detail: Option<String>,
        partial_text: Option<String>,
        usage: Usage,
    },
    TransportError {
        cause: String,
    },
}

impl CompletionResult {
    pub fn missing_credential() -> Self {
        CompletionResult::ApiError {
            http_status: 0,
            message: MISSING_CREDENTIAL.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CompletionResult::Success { .. })
    }

    pub fn usage(&self) -> Usage {
        match self {
            CompletionResult::Success { usage, .. }
            | CompletionResult::ContentBlocked { usage, .. } => *usage,
            CompletionResult::ApiError { .. } | CompletionResult::TransportError { .. } => {
                Usage::default()
            }
        }
    }

    pub fn into_text(self) -> Result<String, TriageError> {
        match self {
            CompletionResult::Success { text, .. } => Ok(text),
            CompletionResult::ApiError {
                http_status: 0,
                message,
            } => Err(TriageError::Configuration(message)),
            CompletionResult::ApiError {
                http_status,
                message,
            } => Err(TriageError::Api {
                http_status,
                message,
            }),
            CompletionResult::ContentBlocked {
                reason,
                safety_detail,
                ..
            } => Err(TriageError::ContentBlocked {
                reason,
                safety_detail,
            }),
            CompletionResult::TransportError { cause } => Err(TriageError::Transport(cause)),
        }
    }

    /// Splits the envelope into its text (or failure) and the usage it accrued.
    pub fn into_metered(self) -> Metered<Result<String, TriageError>> {
        let usage = self.usage();
        Metered::new(self.into_text(), usage)
    }
}

/// A value paired with the usage spent producing it.
///
/// Failed steps are metered too, so telemetry survives an error path.
#[derive(Clone, Debug, PartialEq)]
pub struct Metered<T> {
    pub value: T,
    pub usage: Usage,
}

impl<T> Metered<T> {
    pub fn new(value: T, usage: Usage) -> Self {
        Self { value, usage }
    }

    pub fn free(value: T) -> Self {
        Self::new(value, Usage::default())
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Metered<U> {
        Metered {
            value: f(self.value),
            usage: self.usage,
        }
    }

    pub fn into_parts(self) -> (T, Usage) {
        (self.value, self.usage)
    }
}

#[async_trait::async_trait]
pub trait CompletionService: Send + Sync + 'static {
    /// Issues a single completion call. Never retries and never panics on
    /// remote failure; every outcome is folded into the returned envelope.
    async fn invoke(&self, request: CompletionRequest) -> CompletionResult;
}
