use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use triagekit_core::{
    CompletionRequest, CompletionService, GenerationConfig, Metered, TabularDataset, TriageError,
};
use triagekit_prompt::templates::{CLASSIFY_FAILURES, NO_FAILURES_TOKEN};
use triagekit_prompt::PromptTemplate;

/// Row keys the model predicts will fail.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "rowKeys", rename_all = "camelCase")]
pub enum ClassificationOutcome {
    NoFailures,
    Failing(BTreeSet<String>),
}

impl ClassificationOutcome {
    /// An empty key set collapses to [`ClassificationOutcome::NoFailures`].
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: BTreeSet<String> = keys.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            ClassificationOutcome::NoFailures
        } else {
            ClassificationOutcome::Failing(keys)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ClassificationOutcome::NoFailures)
    }

    pub fn len(&self) -> usize {
        match self {
            ClassificationOutcome::NoFailures => 0,
            ClassificationOutcome::Failing(keys) => keys.len(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        match self {
            ClassificationOutcome::NoFailures => false,
            ClassificationOutcome::Failing(keys) => keys.contains(key),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        let keys = match self {
            ClassificationOutcome::NoFailures => None,
            ClassificationOutcome::Failing(keys) => Some(keys),
        };
        keys.into_iter().flatten().map(String::as_str)
    }
}

/// Reads the classifier's line-per-key answer.
///
/// `NONE` in any case means no failures. Otherwise every non-blank trimmed
/// line is a row key, taken verbatim.
pub fn parse_classifier_output(text: &str) -> ClassificationOutcome {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case(NO_FAILURES_TOKEN) {
        return ClassificationOutcome::NoFailures;
    }
    ClassificationOutcome::from_keys(
        trimmed
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty()),
    )
}

pub struct FailureClassifier {
    service: Arc<dyn CompletionService>,
    template: PromptTemplate,
    config: GenerationConfig,
}

impl FailureClassifier {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self {
            service,
            template: PromptTemplate::new(CLASSIFY_FAILURES),
            config: GenerationConfig::new(0.5, 200),
        }
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    /// Asks the model which rows of `dataset` the described bug breaks.
    ///
    /// Any completion failure comes back as the error; nothing here touches
    /// the dataset's storage.
    pub async fn classify(
        &self,
        description: &str,
        dataset: &TabularDataset,
    ) -> Metered<Result<ClassificationOutcome, TriageError>> {
        if description.trim().is_empty() {
            return Metered::free(Err(TriageError::EmptyInput(
                "bug description is blank".to_string(),
            )));
        }

        let test_cases = dataset.to_delimited();
        let prompt = match self.template.render_pairs([
            ("bug_description", description),
            ("test_cases", test_cases.as_str()),
        ]) {
            Ok(prompt) => prompt,
            Err(err) => return Metered::free(Err(err)),
        };

        let metered = self
            .service
            .invoke(CompletionRequest::new(prompt, self.config))
            .await
            .into_metered();
        metered.map(|text| {
            text.map(|text| {
                let outcome = parse_classifier_output(&text);
                tracing::info!(failing = outcome.len(), "classified test cases");
                outcome
            })
        })
    }
}
