use std::fmt;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tracing::Instrument;
use triagekit_core::{CompletionRequest, CompletionResult, CompletionService, CostRates, TriageError};

use crate::wire::{error_message, interpret_response, GenerateContentRequest};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

const PROMPT_LOG_CHARS: usize = 200;
const RESPONSE_LOG_CHARS: usize = 500;

#[derive(Clone)]
pub struct GeminiClient {
    base_url: String,
    api_key: Option<SecretString>,
    model: String,
    rates: CostRates,
    http: Client,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &redacted(self.api_key.is_some()))
            .field("rates", &self.rates)
            .finish()
    }
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: GEMINI_BASE_URL.to_string(),
            api_key: non_blank(api_key.into()).map(SecretString::new),
            model: DEFAULT_MODEL.to_string(),
            rates: CostRates::default(),
            http: Client::new(),
        }
    }

    pub fn builder() -> GeminiClientBuilder {
        GeminiClientBuilder::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_rates(mut self, rates: CostRates) -> Self {
        self.rates = rates;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn rates(&self) -> CostRates {
        self.rates
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn model_name(&self) -> &str {
        let model = self.model.trim();
        model.strip_prefix("models/").unwrap_or(model)
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model_name()
        )
    }

    async fn send(&self, api_key: &SecretString, request: &CompletionRequest) -> CompletionResult {
        tracing::debug!(
            prompt = %truncate(request.prompt(), PROMPT_LOG_CHARS),
            "calling completion service"
        );

        let body = GenerateContentRequest::new(request.prompt(), request.config());
        let response = match self
            .http
            .post(self.generate_url())
            .query(&[("key", api_key.expose_secret().as_str())])
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                return CompletionResult::TransportError {
                    cause: err.without_url().to_string(),
                }
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) if status == StatusCode::OK => {
                return CompletionResult::TransportError {
                    cause: err.without_url().to_string(),
                }
            }
            Err(_) => String::new(),
        };

        if status != StatusCode::OK {
            return CompletionResult::ApiError {
                http_status: status.as_u16(),
                message: error_message(&text),
            };
        }

        tracing::debug!(
            response = %truncate(&text, RESPONSE_LOG_CHARS),
            "completion service responded"
        );
        interpret_response(&text, &self.rates)
    }
}

#[async_trait::async_trait]
impl CompletionService for GeminiClient {
    async fn invoke(&self, request: CompletionRequest) -> CompletionResult {
        let Some(api_key) = &self.api_key else {
            tracing::error!("completion service credential is not configured");
            return CompletionResult::missing_credential();
        };

        let config = request.config();
        let span = tracing::info_span!(
            "gemini_generate",
            model = %self.model_name(),
            temperature = config.temperature,
            max_output_tokens = config.max_output_tokens,
        );

        async {
            let result = self.send(api_key, &request).await;
            log_result(&result);
            result
        }
        .instrument(span)
        .await
    }
}

fn log_result(result: &CompletionResult) {
    let usage = result.usage();
    match result {
        CompletionResult::Success { .. } => tracing::info!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            cost_usd = usage.cost_usd,
            "completion succeeded"
        ),
        CompletionResult::ContentBlocked {
            reason,
            safety_detail,
            partial_text,
            ..
        } => tracing::warn!(
            reason = %reason,
            safety_detail = ?safety_detail,
            partial_chars = partial_text.as_deref().map(str::len).unwrap_or(0),
            cost_usd = usage.cost_usd,
            "completion blocked"
        ),
        CompletionResult::ApiError {
            http_status,
            message,
        } => tracing::warn!(
            status = http_status,
            message = %truncate(message, RESPONSE_LOG_CHARS),
            "completion api error"
        ),
        CompletionResult::TransportError { cause } => {
            tracing::warn!(cause = %cause, "completion transport failure")
        }
    }
}

#[derive(Default)]
pub struct GeminiClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    rates: Option<CostRates>,
    timeout: Option<Duration>,
}

impl fmt::Debug for GeminiClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClientBuilder")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &redacted(self.api_key.is_some()))
            .field("rates", &self.rates)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GeminiClientBuilder {
    pub fn api_key(mut self, value: impl Into<String>) -> Self {
        self.api_key = non_blank(value.into());
        self
    }

    pub fn base_url(mut self, value: impl Into<String>) -> Self {
        self.base_url = Some(value.into());
        self
    }

    pub fn model(mut self, value: impl Into<String>) -> Self {
        self.model = Some(value.into());
        self
    }

    pub fn rates(mut self, value: CostRates) -> Self {
        self.rates = Some(value);
        self
    }

    /// Caps each request. Unset by default: the caller's own deadline applies.
    pub fn timeout(mut self, value: Duration) -> Self {
        self.timeout = Some(value);
        self
    }

    pub fn api_key_from_env(mut self, var_name: &str) -> Self {
        if let Ok(value) = std::env::var(var_name) {
            self.api_key = non_blank(value);
        }
        self
    }

    pub fn base_url_from_env(mut self, var_name: &str) -> Self {
        if let Ok(value) = std::env::var(var_name) {
            self.base_url = Some(value);
        }
        self
    }

    /// A missing API key is not an error here: the client still builds and
    /// every call fails fast without touching the network.
    pub fn build(self) -> Result<GeminiClient, TriageError> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| GEMINI_BASE_URL.to_string());
        url::Url::parse(&base_url)
            .map_err(|err| TriageError::Configuration(format!("invalid base_url: {err}")))?;

        let model = self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        if model.trim().is_empty() {
            return Err(TriageError::Configuration(
                "model cannot be empty".to_string(),
            ));
        }

        let mut http = Client::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        let http = http
            .build()
            .map_err(|err| TriageError::Configuration(format!("http client: {err}")))?;

        Ok(GeminiClient {
            base_url,
            api_key: self.api_key.map(SecretString::new),
            model,
            rates: self.rates.unwrap_or_default(),
            http,
        })
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn redacted(present: bool) -> &'static str {
    if present {
        "<redacted>"
    } else {
        "<none>"
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
