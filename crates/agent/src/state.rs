//! Loop state — everything a single run owns while it is in flight.
//!
//! A [`LoopState`] is created by one `start` call, mutated only by that
//! call, and dropped when it returns. Nothing in here is shared between
//! runs.

use reagent_core::DecisionResponse;
use serde::{Deserialize, Serialize};

use crate::prompt;

/// The per-run scratchpad.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopState {
    /// Instructions plus every Thought/Action/Observation block so far.
    /// Append-only.
    pub history: String,

    /// Completed action rounds.
    pub iteration: usize,

    /// Observation of the most recent action round; empty before the first.
    pub last_observation: String,
}

impl LoopState {
    /// Seed a fresh state with the initial instruction block.
    pub fn new(initial_history: String) -> Self {
        Self {
            history: initial_history,
            iteration: 0,
            last_observation: String::new(),
        }
    }

    /// Whether the round budget is used up.
    pub fn exhausted(&self, max_iterations: usize) -> bool {
        self.iteration >= max_iterations
    }

    /// Close an action round: store the observation, append the transcript
    /// block, and advance the counter.
    pub fn record(&mut self, decision: &DecisionResponse, observation: String) {
        self.history
            .push_str(&prompt::transcript_block(decision, &observation));
        self.last_observation = observation;
        self.iteration += 1;
    }
}

/// Lifecycle of an [`AgentLoop`](crate::AgentLoop).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// No run has started yet.
    #[default]
    Idle,
    Running,
    /// Ended through `Finish` or the round limit.
    Finished,
    /// Ended through `stop()`.
    Stopped,
    /// Ended with a fatal error.
    Aborted,
}

/// Why a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The model chose `Finish`.
    Finished,
    /// The round limit was reached.
    IterationLimit,
    /// `stop()` was observed at an iteration boundary.
    Stopped,
}

impl FinishReason {
    pub fn status(self) -> RunStatus {
        match self {
            Self::Finished | Self::IterationLimit => RunStatus::Finished,
            Self::Stopped => RunStatus::Stopped,
        }
    }
}
