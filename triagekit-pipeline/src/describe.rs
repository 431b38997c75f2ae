use std::sync::Arc;

use serde::{Deserialize, Serialize};
use triagekit_core::{CompletionRequest, CompletionService, GenerationConfig, Metered, TriageError};
use triagekit_prompt::{templates::DRAFT_REPORT, PromptTemplate};

use crate::enforcer::{enforce, StructuredRecord};

/// The fields a reporter fills in before asking for a drafted bug.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BugReportForm {
    pub component: String,
    pub priority: String,
    pub command: String,
    pub device_type: String,
    pub device_mode: String,
    pub bug_type: String,
    pub device_details: String,
    pub application_type: String,
}

impl BugReportForm {
    fn fields(&self) -> [(&str, &str); 8] {
        [
            ("component", &self.component),
            ("priority", &self.priority),
            ("command", &self.command),
            ("device_type", &self.device_type),
            ("device_mode", &self.device_mode),
            ("bug_type", &self.bug_type),
            ("device_details", &self.device_details),
            ("application_type", &self.application_type),
        ]
    }

    /// Names of every blank field, in form order.
    pub fn missing_fields(&self) -> Vec<&str> {
        self.fields()
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }
}

/// Drafts a `{title, body}` bug report from a [`BugReportForm`].
pub struct DescriptionGenerator {
    service: Arc<dyn CompletionService>,
    template: PromptTemplate,
    config: GenerationConfig,
}

impl DescriptionGenerator {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self {
            service,
            template: PromptTemplate::new(DRAFT_REPORT),
            config: GenerationConfig::new(1.0, 1000),
        }
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    /// Every form field is required. Usage is kept when the model's text
    /// fails the output contract.
    pub async fn generate(
        &self,
        form: &BugReportForm,
    ) -> Metered<Result<StructuredRecord, TriageError>> {
        let missing = form.missing_fields();
        if !missing.is_empty() {
            return Metered::free(Err(TriageError::EmptyInput(format!(
                "bug report form is missing: {}",
                missing.join(", ")
            ))));
        }

        let prompt = match self.template.render_pairs(form.fields()) {
            Ok(prompt) => prompt,
            Err(err) => return Metered::free(Err(err)),
        };

        let metered = self
            .service
            .invoke(CompletionRequest::new(prompt, self.config))
            .await
            .into_metered();
        metered.map(|text| {
            text.and_then(|text| {
                enforce(&text).map_err(|violation| {
                    tracing::warn!(error = %violation, "drafted report broke the output contract");
                    TriageError::from(violation)
                })
            })
        })
    }
}
