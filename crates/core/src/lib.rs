//! # reagent core
//!
//! Domain types, traits, and error definitions for the reagent
//! thought/action loop. This crate has **zero framework dependencies** — it
//! defines the model that every other crate implements against.
//!
//! ## Design Philosophy
//!
//! The two seams of the loop are traits defined here:
//! - [`Action`] — something the agent can do with a string argument
//! - [`StructuredGenerator`] — something that turns a prompt and a schema
//!   into a JSON value
//!
//! Implementations live in their respective crates, which keeps the loop
//! testable with scripted stand-ins.

pub mod action;
pub mod decision;
pub mod error;
pub mod generation;
pub mod progress;

// Re-export key types at crate root for ergonomics
pub use action::{Action, ActionDefinition, ActionRegistry, ExampleStep, WorkedExample};
pub use decision::{
    DEFAULT_MAX_ITERATIONS, DecisionAction, DecisionResponse, FINISH_ACTION, FINISH_DESCRIPTION,
    Validation,
};
pub use error::{ActionError, AgentError, GenerationError, RegistryError};
pub use generation::{GenerationOptions, GenerationRequest, StructuredGenerator};
pub use progress::{ProgressEvent, ProgressStep};
