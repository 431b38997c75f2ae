use std::collections::HashMap;

use regex::Regex;
use serde_json::Value;
use triagekit_core::TriageError;

pub type PromptVars = HashMap<String, Value>;

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Substitutes every `{{name}}` placeholder. Substituted text is not
    /// rescanned, so values may themselves contain braces.
    pub fn render(&self, vars: &PromptVars) -> Result<String, TriageError> {
        let pattern = Regex::new(r"\{\{\s*(\w+)\s*\}\}")
            .map_err(|e| TriageError::Configuration(e.to_string()))?;
        let mut missing = Vec::new();
        let rendered = pattern.replace_all(&self.template, |caps: &regex::Captures| {
            let key = &caps[1];
            match vars.get(key) {
                Some(value) => value
                    .as_str()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| value.to_string()),
                None => {
                    missing.push(key.to_string());
                    String::new()
                }
            }
        });
        if !missing.is_empty() {
            return Err(TriageError::Configuration(format!(
                "prompt variables not provided: {}",
                missing.join(", ")
            )));
        }
        Ok(rendered.into_owned())
    }

    /// Renders from `(name, text)` pairs.
    pub fn render_pairs<'a, I>(&self, pairs: I) -> Result<String, TriageError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let vars = pairs
            .into_iter()
            .map(|(key, value)| (key.to_string(), Value::from(value)))
            .collect();
        self.render(&vars)
    }
}
