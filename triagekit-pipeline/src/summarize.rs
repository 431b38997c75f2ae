use std::sync::Arc;

use triagekit_core::{CompletionRequest, CompletionService, GenerationConfig, Metered, TriageError};
use triagekit_prompt::{templates::SUMMARIZE_REPORT, PromptTemplate};

/// What to summarize: one block of text, or several joined by newlines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SummaryContent {
    Text(String),
    Parts(Vec<String>),
}

impl SummaryContent {
    fn into_text(self) -> Result<String, TriageError> {
        let text = match self {
            SummaryContent::Text(text) => text,
            SummaryContent::Parts(parts) if parts.is_empty() => {
                return Err(TriageError::EmptyInput(
                    "no content parts to summarize".to_string(),
                ))
            }
            SummaryContent::Parts(parts) => parts.join("\n"),
        };
        if text.trim().is_empty() {
            return Err(TriageError::EmptyInput(
                "content to summarize is blank".to_string(),
            ));
        }
        Ok(text)
    }
}

impl From<String> for SummaryContent {
    fn from(value: String) -> Self {
        SummaryContent::Text(value)
    }
}

impl From<&str> for SummaryContent {
    fn from(value: &str) -> Self {
        SummaryContent::Text(value.to_string())
    }
}

impl From<Vec<String>> for SummaryContent {
    fn from(value: Vec<String>) -> Self {
        SummaryContent::Parts(value)
    }
}

impl From<Vec<&str>> for SummaryContent {
    fn from(value: Vec<&str>) -> Self {
        SummaryContent::Parts(value.into_iter().map(str::to_string).collect())
    }
}

pub struct Summarizer {
    service: Arc<dyn CompletionService>,
    template: PromptTemplate,
    config: GenerationConfig,
}

impl Summarizer {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self {
            service,
            template: PromptTemplate::new(SUMMARIZE_REPORT),
            config: GenerationConfig::new(0.5, 200),
        }
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the trimmed model text. Blank input fails before any call is
    /// made and costs nothing.
    pub async fn summarize(
        &self,
        content: impl Into<SummaryContent>,
    ) -> Metered<Result<String, TriageError>> {
        let prompt = match content
            .into()
            .into_text()
            .and_then(|text| self.template.render_pairs([("content", text.as_str())]))
        {
            Ok(prompt) => prompt,
            Err(err) => return Metered::free(Err(err)),
        };

        self.service
            .invoke(CompletionRequest::new(prompt, self.config))
            .await
            .into_metered()
            .map(|text| text.map(|text| text.trim().to_string()))
    }
}
