//! OpenAI-compatible structured generation.
//!
//! Works with: OpenAI, OpenRouter, Ollama, vLLM, Together AI, Groq, and
//! any endpoint exposing `/v1/chat/completions` with `response_format`
//! support.
//!
//! The prompt is sent as the user message; the schema travels both as a
//! `json_schema` response format and inside the system message, so
//! backends that ignore `response_format` still see it.

use async_trait::async_trait;
use reagent_core::error::GenerationError;
use reagent_core::generation::{GenerationRequest, StructuredGenerator};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// An OpenAI-compatible structured generator.
pub struct OpenAiCompatGenerator {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatGenerator {
    /// Create a new OpenAI-compatible generator.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: build_client(Duration::from_secs(120)),
        }
    }

    /// Create an OpenAI generator (convenience constructor).
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("openai", "https://api.openai.com/v1", api_key)
    }

    /// Create an OpenRouter generator (convenience constructor).
    pub fn openrouter(api_key: impl Into<String>) -> Self {
        Self::new("openrouter", "https://openrouter.ai/api/v1", api_key)
    }

    /// Create an Ollama generator (convenience constructor).
    pub fn ollama(base_url: Option<&str>) -> Self {
        Self::new(
            "ollama",
            base_url.unwrap_or("http://localhost:11434/v1"),
            "ollama", // Ollama doesn't need a real key
        )
    }

    /// Override the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    /// Build the chat completion body for a request.
    fn request_body(request: &GenerationRequest) -> serde_json::Value {
        let system = format!(
            "You are a reasoning agent. Respond only with a JSON object that conforms to this JSON schema:\n{}",
            request.schema
        );

        let messages = vec![
            ApiMessage {
                role: "system".into(),
                content: system,
            },
            ApiMessage {
                role: "user".into(),
                content: request.prompt.clone(),
            },
        ];

        let mut body = serde_json::json!({
            "model": request.options.model,
            "messages": messages,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "decision",
                    "schema": request.schema,
                    "strict": true,
                }
            },
            "stream": false,
        });

        if let Some(temperature) = request.options.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }

        if !request.options.stop.is_empty() {
            body["stop"] = serde_json::json!(request.options.stop);
        }

        body
    }

    /// Parse the assistant content into JSON.
    ///
    /// Some backends wrap JSON in a markdown fence even in JSON mode, so a
    /// single surrounding fence is tolerated.
    fn parse_content(content: &str) -> Result<serde_json::Value, GenerationError> {
        let trimmed = content.trim();
        let unfenced = trimmed
            .strip_prefix("```json")
            .or_else(|| trimmed.strip_prefix("```"))
            .and_then(|rest| rest.strip_suffix("```"))
            .unwrap_or(trimmed)
            .trim();

        serde_json::from_str(unfenced).map_err(|e| GenerationError::InvalidOutput(e.to_string()))
    }
}

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

#[async_trait]
impl StructuredGenerator for OpenAiCompatGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<serde_json::Value, GenerationError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = Self::request_body(&request);

        debug!(generator = %self.name, model = %request.options.model, "Sending generation request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout(e.to_string())
                } else {
                    GenerationError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(GenerationError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(GenerationError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Generator returned error");
            return Err(GenerationError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| GenerationError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        if request.options.infos
            && let Some(usage) = &api_response.usage
        {
            info!(
                generator = %self.name,
                model = %api_response.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Generation usage"
            );
        }

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::InvalidOutput("No choices in response".into()))?;

        let content = choice
            .message
            .content
            .ok_or_else(|| GenerationError::InvalidOutput("Empty message content".into()))?;

        Self::parse_content(&content)
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    model: String,
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use reagent_core::generation::GenerationOptions;
    use reagent_core::DecisionResponse;

    fn request() -> GenerationRequest {
        GenerationRequest {
            prompt: "Initial Question: What is 2+2?".into(),
            schema: DecisionResponse::schema(),
            options: GenerationOptions {
                model: "gpt-4".into(),
                stop: vec!["Observation:".into()],
                temperature: Some(0.2),
                ..GenerationOptions::default()
            },
        }
    }

    #[test]
    fn openrouter_constructor() {
        let generator = OpenAiCompatGenerator::openrouter("sk-test");
        assert_eq!(generator.name(), "openrouter");
        assert!(generator.base_url.contains("openrouter.ai"));
    }

    #[test]
    fn ollama_constructor() {
        let generator = OpenAiCompatGenerator::ollama(None);
        assert_eq!(generator.name(), "ollama");
        assert!(generator.base_url.contains("localhost:11434"));
    }

    #[test]
    fn trailing_slash_trimmed() {
        let generator = OpenAiCompatGenerator::new("custom", "http://localhost:8000/v1/", "");
        assert_eq!(generator.base_url, "http://localhost:8000/v1");
    }

    #[test]
    fn body_carries_prompt_schema_and_options() {
        let body = OpenAiCompatGenerator::request_body(&request());
        assert_eq!(body["model"], "gpt-4");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Initial Question: What is 2+2?");
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(
            body["response_format"]["json_schema"]["schema"],
            DecisionResponse::schema()
        );
        assert_eq!(body["stop"], serde_json::json!(["Observation:"]));
        assert!((body["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn body_omits_unset_options() {
        let mut req = request();
        req.options.stop.clear();
        req.options.temperature = None;
        let body = OpenAiCompatGenerator::request_body(&req);
        assert!(body.get("stop").is_none());
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn parse_plain_json_content() {
        let value = OpenAiCompatGenerator::parse_content(
            r#"{"thought":"t","action":{"type":"Finish","arg":""}}"#,
        )
        .unwrap();
        assert_eq!(value["action"]["type"], "Finish");
    }

    #[test]
    fn parse_fenced_json_content() {
        let value = OpenAiCompatGenerator::parse_content(
            "```json\n{\"thought\":\"t\",\"action\":{\"type\":\"Search\",\"arg\":\"x\"}}\n```",
        )
        .unwrap();
        assert_eq!(value["action"]["arg"], "x");
    }

    #[test]
    fn parse_prose_is_invalid_output() {
        let err = OpenAiCompatGenerator::parse_content("I think I should search.").unwrap_err();
        assert!(matches!(err, GenerationError::InvalidOutput(_)));
    }

    #[test]
    fn parse_api_response() {
        let data = r#"{
            "model": "gpt-4",
            "choices": [{"message": {"role": "assistant", "content": "{}"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.choices.len(), 1);
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("{}"));
        assert_eq!(parsed.usage.unwrap().completion_tokens, 5);
    }
}
