//! The agent loop — the heart of reagent.
//!
//! The agent follows a **Thought → Action → Observation** cycle:
//!
//! 1. **Seed** the history with worked examples, the action list and the question
//! 2. **Ask** the generator for a decision conforming to the decision schema
//! 3. **If `Finish`**: return the last observation
//! 4. **Otherwise**: run the named action, append the round to the history,
//!    loop back to step 2
//!
//! The loop also ends when the round budget is spent or `stop()` is called.

pub mod controller;
pub mod prompt;
pub mod state;
pub mod stream_event;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use controller::{ACTION_FAILED, AgentLoop, NO_ACTION_FOUND, RunReport};
pub use reagent_core::DEFAULT_MAX_ITERATIONS;
pub use state::{FinishReason, LoopState, RunStatus};
pub use stream_event::AgentStreamEvent;
