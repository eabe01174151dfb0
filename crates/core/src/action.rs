//! Action trait — the capabilities the agent can invoke.
//!
//! An action takes a single string argument and produces a string
//! observation. Actions are collected in an [`ActionRegistry`], which
//! also renders the catalog and worked examples the model is shown.

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use crate::decision::FINISH_ACTION;
use crate::error::{ActionError, RegistryError};

/// One step of a worked example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleStep {
    pub thought: String,
    pub action: String,
    pub observation: String,
}

/// An illustrative question/answer transcript shown to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkedExample {
    pub question: String,
    pub steps: Vec<ExampleStep>,
}

impl WorkedExample {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step to the example.
    pub fn step(
        mut self,
        thought: impl Into<String>,
        action: impl Into<String>,
        observation: impl Into<String>,
    ) -> Self {
        self.steps.push(ExampleStep {
            thought: thought.into(),
            action: action.into(),
            observation: observation.into(),
        });
        self
    }

    /// Render as `Question:` followed by one Thought/Action/Observation
    /// triple per step.
    pub fn render(&self) -> String {
        let mut out = format!("Question: {}", self.question);
        for step in &self.steps {
            out.push_str(&format!(
                "\nThought: {}\nAction: {}\nObservation: {}",
                step.thought, step.action, step.observation
            ));
        }
        out
    }
}

/// The core Action trait.
///
/// Host applications either implement this directly or build an
/// [`ActionDefinition`] from a closure.
#[async_trait]
pub trait Action: Send + Sync {
    /// Unique name the model uses to select this action (e.g. "Search").
    fn name(&self) -> &str;

    /// Human-readable description injected into the model instructions.
    fn description(&self) -> &str;

    /// Optional worked example used for in-context instruction.
    fn example(&self) -> Option<&WorkedExample> {
        None
    }

    /// Run the action with the model-supplied argument.
    async fn invoke(&self, arg: &str) -> Result<String, ActionError>;
}

type Handler = Arc<dyn Fn(String) -> BoxFuture<'static, Result<String, ActionError>> + Send + Sync>;

/// A closure-backed action.
#[derive(Clone)]
pub struct ActionDefinition {
    name: String,
    description: String,
    handler: Handler,
    example: Option<WorkedExample>,
}

impl ActionDefinition {
    pub fn new<F, Fut>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, ActionError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            handler: Arc::new(move |arg| handler(arg).boxed()),
            example: None,
        }
    }

    /// Attach a worked example.
    pub fn with_example(mut self, example: WorkedExample) -> Self {
        self.example = Some(example);
        self
    }
}

impl std::fmt::Debug for ActionDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("example", &self.example)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Action for ActionDefinition {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn example(&self) -> Option<&WorkedExample> {
        self.example.as_ref()
    }

    async fn invoke(&self, arg: &str) -> Result<String, ActionError> {
        (self.handler)(arg.to_string()).await
    }
}

/// An ordered registry of actions.
///
/// Registration order is preserved: it is the order of the catalog and the
/// examples shown to the model. The registry is read-only once built and is
/// meant to be shared behind an `Arc` across runs.
#[derive(Default)]
pub struct ActionRegistry {
    actions: Vec<Arc<dyn Action>>,
    index: HashMap<String, usize>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of actions in one step.
    pub fn from_actions(
        actions: impl IntoIterator<Item = Arc<dyn Action>>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register(actions)?;
        Ok(registry)
    }

    /// Register a batch of actions.
    ///
    /// Names are compared exactly. If any name collides with an existing
    /// action or with another entry of the batch, nothing is registered.
    pub fn register(
        &mut self,
        actions: impl IntoIterator<Item = Arc<dyn Action>>,
    ) -> Result<(), RegistryError> {
        let batch: Vec<Arc<dyn Action>> = actions.into_iter().collect();

        let mut seen = std::collections::HashSet::new();
        for action in &batch {
            let name = action.name();
            if name == FINISH_ACTION {
                return Err(RegistryError::ReservedName(name.to_string()));
            }
            if self.index.contains_key(name) || !seen.insert(name) {
                return Err(RegistryError::DuplicateAction(name.to_string()));
            }
        }

        for action in batch {
            self.index
                .insert(action.name().to_string(), self.actions.len());
            self.actions.push(action);
        }
        Ok(())
    }

    /// Look up an action by exact name.
    pub fn resolve(&self, name: &str) -> Option<&dyn Action> {
        self.index.get(name).map(|&i| self.actions[i].as_ref())
    }

    /// `name // description`, one line per action, in registration order.
    pub fn format_catalog(&self) -> String {
        self.actions
            .iter()
            .map(|a| format!("{} // {}", a.name(), a.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Worked examples of every action that has one, in registration order.
    pub fn format_examples(&self) -> String {
        self.actions
            .iter()
            .filter_map(|a| a.example())
            .map(WorkedExample::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Action> {
        self.actions.iter().map(|a| a.as_ref())
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.names())
            .finish()
    }
}
