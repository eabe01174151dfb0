//! Structured generation — the abstraction over schema-constrained LLM backends.
//!
//! A generator takes a prompt and a JSON schema and returns a JSON value
//! that is supposed to conform to it. Callers still validate the result:
//! a generator is allowed to be wrong.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Options forwarded to the generation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Backend name (e.g., "openai", "ollama")
    #[serde(default = "default_provider")]
    pub provider: String,

    /// The model to use (e.g., "gpt-4")
    #[serde(default = "default_model")]
    pub model: String,

    /// Stop sequences
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Ask the backend to attach provider metadata to its logs.
    #[serde(default)]
    pub infos: bool,
}

fn default_provider() -> String {
    "openai".into()
}

fn default_model() -> String {
    "gpt-3.5-turbo".into()
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            stop: Vec::new(),
            temperature: None,
            infos: false,
        }
    }
}

/// One structured generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub schema: serde_json::Value,
    pub options: GenerationOptions,
}

/// The core StructuredGenerator trait.
///
/// Every backend (OpenAI-compatible endpoints, fallback chains, test
/// doubles) implements this. The agent loop calls `generate()` without
/// knowing which one it talks to.
#[async_trait]
pub trait StructuredGenerator: Send + Sync {
    /// A human-readable name for this generator (e.g., "openai").
    fn name(&self) -> &str;

    /// Produce a value for the request's schema.
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<serde_json::Value, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_defaults() {
        let opts = GenerationOptions::default();
        assert_eq!(opts.provider, "openai");
        assert_eq!(opts.model, "gpt-3.5-turbo");
        assert!(opts.stop.is_empty());
        assert!(opts.temperature.is_none());
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let opts: GenerationOptions = serde_json::from_str(r#"{"model":"gpt-4"}"#).unwrap();
        assert_eq!(opts.provider, "openai");
        assert_eq!(opts.model, "gpt-4");
    }
}
