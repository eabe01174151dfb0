//! `Search` action — looks a topic up on Wikipedia.
//!
//! Runs a full-text search through the MediaWiki API and returns the plain
//! text introduction of the best matching page.

use async_trait::async_trait;
use reagent_core::action::{Action, WorkedExample};
use reagent_core::error::ActionError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

const DEFAULT_ENDPOINT: &str = "https://en.wikipedia.org/w/api.php";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Observations longer than this are cut at a character boundary.
const MAX_EXTRACT_CHARS: usize = 1200;

pub struct SearchAction {
    endpoint: String,
    client: reqwest::Client,
    timeout_secs: u64,
    example: WorkedExample,
}

impl SearchAction {
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Point the action at another MediaWiki installation.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: build_client(DEFAULT_TIMEOUT_SECS),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            example: WorkedExample::new("What is the capital of France?")
                .step(
                    "To find out the capital of France, I should search for it.",
                    "Search[capital of France]",
                    "Paris is the capital and largest city of France.",
                )
                .step(
                    "The last observation says Paris is the capital.",
                    "Finish[]",
                    "Paris is the capital and largest city of France.",
                ),
        }
    }

    /// Override the HTTP timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.client = build_client(timeout_secs);
        self.timeout_secs = timeout_secs;
        self
    }

    fn request_error(&self, e: reqwest::Error) -> ActionError {
        if e.is_timeout() {
            ActionError::Timeout {
                action: "Search".into(),
                timeout_secs: self.timeout_secs,
            }
        } else {
            ActionError::ExecutionFailed {
                action: "Search".into(),
                reason: e.to_string(),
            }
        }
    }
}

fn build_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("reagent/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_default()
}

impl Default for SearchAction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Action for SearchAction {
    fn name(&self) -> &str {
        "Search"
    }

    fn description(&self) -> &str {
        "Search Wikipedia for a topic and return the introduction of the best matching article."
    }

    fn example(&self) -> Option<&WorkedExample> {
        Some(&self.example)
    }

    async fn invoke(&self, arg: &str) -> Result<String, ActionError> {
        let query = arg.trim();
        if query.is_empty() {
            return Err(ActionError::InvalidArgument("empty search query".into()));
        }

        debug!(query, "Searching Wikipedia");

        let failed = |reason: String| ActionError::ExecutionFailed {
            action: "Search".into(),
            reason,
        };

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("generator", "search"),
                ("gsrlimit", "1"),
                ("gsrsearch", query),
            ])
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        if !response.status().is_success() {
            return Err(failed(format!("HTTP {}", response.status())));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| self.request_error(e))?;

        best_extract(body).ok_or_else(|| failed(format!("no article found for '{query}'")))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<QueryResult>,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    pages: BTreeMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    index: u32,
    #[serde(default)]
    extract: Option<String>,
}

/// Pick the top-ranked page with a non-empty extract.
fn best_extract(body: SearchResponse) -> Option<String> {
    let page = body
        .query?
        .pages
        .into_values()
        .filter(|p| p.extract.as_deref().is_some_and(|e| !e.trim().is_empty()))
        .min_by_key(|p| p.index)?;

    let extract = page.extract.unwrap_or_default();
    Some(format!("{}: {}", page.title, truncate(extract.trim(), MAX_EXTRACT_CHARS)))
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
