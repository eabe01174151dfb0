//! Generator fallback — ordered retry chain with per-generator timeouts.
//!
//! The agent loop never retries a failed generation. When retries are
//! wanted they happen here: if a generator fails with a retryable error
//! (timeout, rate limit, network, server error), the next one in the chain
//! is tried. Auth failures, rejected requests and unparsable output end the
//! chain at once and reach the loop unchanged.

use async_trait::async_trait;
use reagent_core::error::GenerationError;
use reagent_core::generation::{GenerationRequest, StructuredGenerator};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// A generator that wraps an ordered list of generators and falls back on failure.
pub struct FallbackGenerator {
    name: String,
    chain: Vec<FallbackEntry>,
}

/// A single entry in the fallback chain.
struct FallbackEntry {
    generator: Arc<dyn StructuredGenerator>,
    timeout: Duration,
}

impl FallbackGenerator {
    /// Create a new fallback generator with no entries.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chain: Vec::new(),
        }
    }

    /// Add a generator to the fallback chain with a custom timeout.
    pub fn add(mut self, generator: Arc<dyn StructuredGenerator>, timeout: Duration) -> Self {
        self.chain.push(FallbackEntry { generator, timeout });
        self
    }

    /// Add a generator with the default timeout (120s).
    pub fn add_default(self, generator: Arc<dyn StructuredGenerator>) -> Self {
        self.add(generator, Duration::from_secs(120))
    }

    /// Number of generators in the chain.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

#[async_trait]
impl StructuredGenerator for FallbackGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<serde_json::Value, GenerationError> {
        let mut last_error =
            GenerationError::NotConfigured("No generators in fallback chain".into());

        for (i, entry) in self.chain.iter().enumerate() {
            let generator_name = entry.generator.name().to_string();

            info!(
                generator = %generator_name,
                attempt = i + 1,
                total = self.chain.len(),
                "Fallback: trying generator"
            );

            match tokio::time::timeout(entry.timeout, entry.generator.generate(request.clone()))
                .await
            {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) if !e.is_retryable() => {
                    warn!(
                        generator = %generator_name,
                        error = %e,
                        "Fallback: generator failed with a non-retryable error"
                    );
                    return Err(e);
                }
                Ok(Err(e)) => {
                    warn!(
                        generator = %generator_name,
                        error = %e,
                        "Fallback: generator failed, trying next"
                    );
                    last_error = e;
                }
                Err(_) => {
                    warn!(
                        generator = %generator_name,
                        timeout_secs = entry.timeout.as_secs(),
                        "Fallback: generator timed out, trying next"
                    );
                    last_error = GenerationError::Timeout(format!(
                        "Generator '{}' timed out after {}s",
                        generator_name,
                        entry.timeout.as_secs()
                    ));
                }
            }
        }

        Err(last_error)
    }
}
