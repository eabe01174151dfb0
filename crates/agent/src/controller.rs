//! The agent loop controller.
//!
//! Drives one Thought → Action → Observation cycle per iteration until the
//! model chooses `Finish`, the round budget runs out, or `stop()` is
//! observed. Only the generation call and the action handler suspend.

use chrono::{DateTime, Utc};
use reagent_core::{
    ActionRegistry, AgentError, DEFAULT_MAX_ITERATIONS, DecisionResponse, GenerationOptions,
    GenerationRequest, ProgressEvent, StructuredGenerator, Validation,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::prompt;
use crate::state::{FinishReason, LoopState, RunStatus};
use crate::stream_event::AgentStreamEvent;

/// Observation recorded when the model names an unregistered action.
pub const NO_ACTION_FOUND: &str = "No Action found";

/// Observation recorded when an action handler fails.
pub const ACTION_FAILED: &str = "Error while executing action";

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    /// The last observation at the moment the run finished.
    pub answer: String,
    /// Completed action rounds.
    pub iterations: usize,
    pub history: String,
    pub outcome: FinishReason,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Orchestrates structured generation and action dispatch for one question
/// at a time.
pub struct AgentLoop {
    /// Produces decision responses
    generator: Arc<dyn StructuredGenerator>,

    /// Actions the model may call; read-only during a run
    registry: Arc<ActionRegistry>,

    /// Forwarded verbatim with every generation request
    options: GenerationOptions,

    /// Maximum action rounds per run
    max_iterations: usize,

    /// Token of the current run; replaced when a run begins
    cancel: Mutex<CancellationToken>,

    status: Mutex<RunStatus>,
}

impl AgentLoop {
    pub fn new(
        generator: Arc<dyn StructuredGenerator>,
        registry: Arc<ActionRegistry>,
        options: GenerationOptions,
    ) -> Self {
        Self {
            generator,
            registry,
            options,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            cancel: Mutex::new(CancellationToken::new()),
            status: Mutex::new(RunStatus::Idle),
        }
    }

    /// Set the maximum number of action rounds.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn status(&self) -> RunStatus {
        *self.status.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Ask the current run to stop at its next iteration boundary.
    ///
    /// Does not interrupt an in-flight generation call. Calling it again,
    /// or when nothing is running, has no effect.
    pub fn stop(&self) {
        if self.status() != RunStatus::Running {
            return;
        }
        let token = self.cancel.lock().unwrap_or_else(|e| e.into_inner());
        if !token.is_cancelled() {
            info!("Stop requested");
            token.cancel();
        }
    }

    /// Answer `question`, reporting progress through `on_progress`.
    ///
    /// Returns the last observation when the run finishes.
    pub async fn start<F>(&self, question: &str, on_progress: F) -> Result<String, AgentError>
    where
        F: FnMut(&ProgressEvent) + Send,
    {
        self.run(question, on_progress).await.map(|report| report.answer)
    }

    /// Like [`start`](Self::start), but returns the full [`RunReport`].
    pub async fn run<F>(&self, question: &str, mut on_progress: F) -> Result<RunReport, AgentError>
    where
        F: FnMut(&ProgressEvent) + Send,
    {
        let (guard, token) = self.begin()?;
        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();

        info!(
            run_id = %run_id,
            generator = self.generator.name(),
            actions = self.registry.len(),
            max_iterations = self.max_iterations,
            "Agent run started"
        );

        let mut state = LoopState::new(prompt::initial_history(&self.registry, question));

        match self.drive(&mut state, &token, &mut on_progress).await {
            Ok(outcome) => {
                on_progress(&ProgressEvent::finish(state.last_observation.clone()));
                guard.complete(outcome.status());
                info!(
                    run_id = %run_id,
                    iterations = state.iteration,
                    outcome = ?outcome,
                    "Agent run finished"
                );
                Ok(RunReport {
                    run_id,
                    answer: state.last_observation,
                    iterations: state.iteration,
                    history: state.history,
                    outcome,
                    started_at,
                    finished_at: Utc::now(),
                })
            }
            Err(e) => {
                guard.complete(RunStatus::Aborted);
                error!(run_id = %run_id, iterations = state.iteration, "Agent run aborted: {e}");
                Err(e)
            }
        }
    }

    /// Spawn a run and stream its events.
    ///
    /// The channel yields every progress event in loop order followed by
    /// exactly one `done` or `error` event.
    pub fn start_stream(
        self: &Arc<Self>,
        question: impl Into<String>,
    ) -> mpsc::UnboundedReceiver<AgentStreamEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let agent = Arc::clone(self);
        let question = question.into();

        tokio::spawn(async move {
            let progress_tx = tx.clone();
            let result = agent
                .run(&question, move |event| {
                    let _ = progress_tx.send(AgentStreamEvent::from(event));
                })
                .await;

            let terminal = match result {
                Ok(report) => AgentStreamEvent::Done {
                    run_id: report.run_id,
                    answer: report.answer,
                    iterations: report.iterations,
                    reason: report.outcome,
                },
                Err(e) => AgentStreamEvent::Error {
                    message: e.to_string(),
                },
            };
            let _ = tx.send(terminal);
        });

        rx
    }

    /// Claim the controller for a new run and hand out its cancel token.
    fn begin(&self) -> Result<(RunGuard<'_>, CancellationToken), AgentError> {
        let mut status = self.status.lock().unwrap_or_else(|e| e.into_inner());
        if *status == RunStatus::Running {
            return Err(AgentError::AlreadyRunning);
        }
        *status = RunStatus::Running;

        let token = CancellationToken::new();
        *self.cancel.lock().unwrap_or_else(|e| e.into_inner()) = token.clone();
        Ok((
            RunGuard {
                status: &self.status,
                token: token.clone(),
                completed: false,
            },
            token,
        ))
    }

    async fn drive(
        &self,
        state: &mut LoopState,
        token: &CancellationToken,
        on_progress: &mut (dyn FnMut(&ProgressEvent) + Send),
    ) -> Result<FinishReason, AgentError> {
        loop {
            if token.is_cancelled() {
                info!(iteration = state.iteration, "Stop observed, finishing run");
                return Ok(FinishReason::Stopped);
            }

            if state.exhausted(self.max_iterations) {
                warn!(
                    max_iterations = self.max_iterations,
                    "Iteration limit reached, finishing with last observation"
                );
                return Ok(FinishReason::IterationLimit);
            }

            debug!(iteration = state.iteration, "Requesting decision");
            let value = self
                .generator
                .generate(GenerationRequest {
                    prompt: state.history.clone(),
                    schema: DecisionResponse::schema(),
                    options: self.options.clone(),
                })
                .await?;

            let decision = match DecisionResponse::validate(&value) {
                Validation::Valid(decision) => decision,
                Validation::Invalid(reason) => {
                    return Err(AgentError::MalformedResponse { reason });
                }
            };

            on_progress(&ProgressEvent::thought(decision.thought.clone()));

            if !decision.has_action() {
                return Err(AgentError::MissingAction);
            }

            if decision.is_finish() {
                debug!(iteration = state.iteration, "Model chose Finish");
                return Ok(FinishReason::Finished);
            }

            let observation = self.dispatch(&decision).await;
            on_progress(&ProgressEvent::observation(observation.clone()));
            state.record(&decision, observation);
        }
    }

    /// Run the named action. Unknown names and handler failures become
    /// observation text.
    async fn dispatch(&self, decision: &DecisionResponse) -> String {
        let name = decision.action.kind.as_str();

        let Some(action) = self.registry.resolve(name) else {
            warn!(action = name, "Model requested an unknown action");
            return NO_ACTION_FOUND.to_string();
        };

        debug!(action = name, arg = %decision.action.arg, "Invoking action");
        match action.invoke(&decision.action.arg).await {
            Ok(output) => output,
            Err(e) => {
                warn!(action = name, "Action failed: {e}");
                ACTION_FAILED.to_string()
            }
        }
    }
}

/// Holds the controller in `Running` for one run.
///
/// A run future dropped before completion (timeout, `select!`) never reaches
/// `complete`; the drop then cancels the token and marks the run `Aborted`,
/// so the controller accepts the next `start`.
struct RunGuard<'a> {
    status: &'a Mutex<RunStatus>,
    token: CancellationToken,
    completed: bool,
}

impl RunGuard<'_> {
    fn complete(mut self, status: RunStatus) {
        self.set(status);
        self.completed = true;
    }

    fn set(&self, status: RunStatus) {
        *self.status.lock().unwrap_or_else(|e| e.into_inner()) = status;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.completed {
            warn!("Agent run dropped before completion");
            self.token.cancel();
            self.set(RunStatus::Aborted);
        }
    }
}

impl std::fmt::Debug for AgentLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentLoop")
            .field("generator", &self.generator.name())
            .field("actions", &self.registry.names())
            .field("options", &self.options)
            .field("max_iterations", &self.max_iterations)
            .field("status", &self.status())
            .finish()
    }
}
