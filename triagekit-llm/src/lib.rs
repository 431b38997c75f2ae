//! Completion gateway backed by the Gemini `generateContent` endpoint.
//!
//! The client issues exactly one POST per call and never retries. Every
//! outcome (success, HTTP error, blocked generation, broken transport) comes
//! back as a [`CompletionResult`] with token usage already priced.
//!
//! Environment variables commonly used:
//! - `GEMINI_API_KEY`
//! - `GEMINI_BASE_URL` (optional, for proxies and tests)

mod gemini;
mod wire;

pub use gemini::{GeminiClient, GeminiClientBuilder, DEFAULT_MODEL, GEMINI_BASE_URL};
pub use triagekit_core::{
    CompletionRequest, CompletionResult, CompletionService, CostRates, GenerationConfig, Usage,
};
pub use wire::interpret_response;
