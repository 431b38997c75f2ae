mod template;
pub mod templates;

pub use template::{PromptTemplate, PromptVars};
