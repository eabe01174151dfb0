//! Shared test utilities for the agent loop.

use async_trait::async_trait;
use reagent_core::{GenerationError, GenerationRequest, StructuredGenerator};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// A generator that replays a fixed script of responses, one per call.
///
/// Records every prompt it receives. Once the script is exhausted it
/// returns `NotConfigured`, so a test that over-calls fails loudly.
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<Value, GenerationError>>>,
    prompts: Mutex<Vec<String>>,
    call_count: AtomicUsize,
    gate: Option<Gate>,
}

/// Parks the first call until the test releases it.
pub struct Gate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl ScriptedGenerator {
    pub fn new(responses: Vec<Value>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    pub fn with_results(responses: Vec<Result<Value, GenerationError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// Block the first `generate` call until `release` is notified.
    pub fn gated(mut self) -> (Self, Arc<Notify>, Arc<Notify>) {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        self.gate = Some(Gate {
            entered: entered.clone(),
            release: release.clone(),
        });
        (self, entered, release)
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl StructuredGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<Value, GenerationError> {
        let call = self.call_count.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt);

        if call == 0
            && let Some(gate) = &self.gate
        {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::NotConfigured("script exhausted".into())))
    }
}

/// A well-formed decision response.
pub fn decision(thought: &str, kind: &str, arg: &str) -> Value {
    json!({
        "thought": thought,
        "action": { "type": kind, "arg": arg }
    })
}
