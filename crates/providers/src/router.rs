//! Generator router — selects the structured generator based on config.
//!
//! Handles generator creation, caching, and wrapping the default backend in
//! a fallback chain when the configuration asks for one.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reagent_config::AppConfig;
use reagent_core::generation::StructuredGenerator;

use crate::fallback::FallbackGenerator;
use crate::openai_compat::OpenAiCompatGenerator;

/// Routes generation requests to the correct backend.
pub struct GeneratorRouter {
    generators: HashMap<String, Arc<dyn StructuredGenerator>>,
    default_generator: String,
}

impl GeneratorRouter {
    /// Create a new router with a default generator name.
    pub fn new(default_generator: impl Into<String>) -> Self {
        Self {
            generators: HashMap::new(),
            default_generator: default_generator.into(),
        }
    }

    /// Register a generator.
    pub fn register(&mut self, name: impl Into<String>, generator: Arc<dyn StructuredGenerator>) {
        self.generators.insert(name.into(), generator);
    }

    /// Get the default generator.
    pub fn default(&self) -> Option<Arc<dyn StructuredGenerator>> {
        self.generators.get(&self.default_generator).cloned()
    }

    /// Get a specific generator by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn StructuredGenerator>> {
        self.generators.get(name).cloned()
    }

    /// List all registered generator names.
    pub fn list(&self) -> Vec<&str> {
        self.generators.keys().map(|s| s.as_str()).collect()
    }
}

/// Build generators from configuration.
///
/// Every configured provider becomes an OpenAI-compatible generator. The
/// default provider is always present. When `generation.fallback` names
/// further providers, the default entry is replaced by a chain that tries
/// the default first and then each fallback in order.
pub fn build_from_config(config: &AppConfig) -> GeneratorRouter {
    let mut router = GeneratorRouter::new(&config.default_provider);
    let timeout = Duration::from_secs(config.generation.timeout_secs);

    let make = |name: &str| -> Arc<dyn StructuredGenerator> {
        let provider_config = config.providers.get(name);

        let api_key = provider_config
            .and_then(|p| p.api_key.clone())
            .or_else(|| config.api_key.clone())
            .unwrap_or_default();

        let base_url = provider_config
            .and_then(|p| p.api_url.clone())
            .unwrap_or_else(|| default_base_url(name));

        Arc::new(OpenAiCompatGenerator::new(name, base_url, api_key).with_timeout(timeout))
    };

    for name in config.providers.keys() {
        router.register(name.clone(), make(name));
    }

    // Ensure the default generator exists (even if not explicitly configured)
    if router.get(&config.default_provider).is_none() {
        router.register(config.default_provider.clone(), make(&config.default_provider));
    }

    if !config.generation.fallback.is_empty() {
        let mut chain = FallbackGenerator::new(format!("{}+fallback", config.default_provider));
        for name in std::iter::once(&config.default_provider).chain(&config.generation.fallback) {
            let generator = router.get(name).unwrap_or_else(|| make(name));
            chain = chain.add(generator, timeout);
        }
        router.register(config.default_provider.clone(), Arc::new(chain));
    }

    router
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openai" => "https://api.openai.com/v1".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "deepseek" => "https://api.deepseek.com/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "fireworks" => "https://api.fireworks.ai/inference/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reagent_config::ProviderConfig;

    #[test]
    fn router_register_and_lookup() {
        let mut router = GeneratorRouter::new("openai");
        router.register("openai", Arc::new(OpenAiCompatGenerator::openai("sk-test")));

        assert!(router.get("openai").is_some());
        assert!(router.get("nonexistent").is_none());
        assert!(router.default().is_some());
    }

    #[test]
    fn default_generator_always_built() {
        let router = build_from_config(&AppConfig::default());
        let generator = router.default().unwrap();
        assert_eq!(generator.name(), "openai");
    }

    #[test]
    fn configured_providers_are_registered() {
        let mut config = AppConfig::default();
        config.providers.insert(
            "ollama".into(),
            ProviderConfig {
                api_url: Some("http://gpu-box:11434/v1".into()),
                ..ProviderConfig::default()
            },
        );
        let router = build_from_config(&config);
        let mut names = router.list();
        names.sort();
        assert_eq!(names, vec!["ollama", "openai"]);
    }

    #[test]
    fn fallback_wraps_default() {
        let mut config = AppConfig::default();
        config.generation.fallback = vec!["ollama".into()];
        let router = build_from_config(&config);
        assert_eq!(router.default().unwrap().name(), "openai+fallback");
    }

    #[test]
    fn well_known_base_urls() {
        assert!(default_base_url("openai").contains("api.openai.com"));
        assert!(default_base_url("ollama").contains("11434"));
        assert!(default_base_url("mystery").contains("mystery"));
    }
}
