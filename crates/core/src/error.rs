//! Error types for the reagent domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error type; they meet only where the
//! agent loop folds generation failures into [`AgentError`].

use thiserror::Error;

// --- Bounded context errors ---

/// Raised while building an action registry. Always a configuration bug.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Duplicate action name: {0}")]
    DuplicateAction(String),

    #[error("Action name is reserved: {0}")]
    ReservedName(String),
}

/// Fatal errors that abort an agent run.
///
/// Unknown actions and failing handlers are not represented here: the loop
/// folds them into the observation text and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentError {
    #[error("Malformed decision response: {reason}")]
    MalformedResponse { reason: String },

    #[error("Decision response did not name an action")]
    MissingAction,

    #[error("A run is already in progress on this agent loop")]
    AlreadyRunning,
}

/// Failures surfaced by a structured generation backend.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Generator not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Output is not valid structured data: {0}")]
    InvalidOutput(String),
}

impl GenerationError {
    /// Whether another backend could plausibly succeed where this one failed.
    ///
    /// Bad credentials, requests the backend rejected as invalid, and output
    /// that is not structured data point at configuration or the model, not
    /// at a transient fault.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. }
            | Self::Timeout(_)
            | Self::Network(_)
            | Self::NotConfigured(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500 || *status_code == 408,
            Self::AuthenticationFailed(_) | Self::InvalidOutput(_) => false,
        }
    }
}

impl From<GenerationError> for AgentError {
    /// A backend failure leaves nothing to interpret, so the loop treats it
    /// exactly like a response that failed validation.
    fn from(err: GenerationError) -> Self {
        AgentError::MalformedResponse {
            reason: err.to_string(),
        }
    }
}

/// A handler failure. Never escapes the agent loop.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Action execution failed: {action} — {reason}")]
    ExecutionFailed { action: String, reason: String },

    #[error("Invalid action argument: {0}")]
    InvalidArgument(String),

    #[error("Action timed out: {action} after {timeout_secs}s")]
    Timeout { action: String, timeout_secs: u64 },
}
