//! Structured generation backends for reagent.
//!
//! All generators implement the `reagent_core::StructuredGenerator` trait.
//! The router selects the correct one based on configuration.

pub mod fallback;
pub mod openai_compat;
pub mod router;

pub use fallback::FallbackGenerator;
pub use openai_compat::OpenAiCompatGenerator;
pub use router::{GeneratorRouter, build_from_config};
