//! Agent-level streaming events.
//!
//! `AgentStreamEvent` wraps the loop's progress events plus a terminal
//! `done` / `error` event so a consumer can drive a UI from one channel.

use reagent_core::{ProgressEvent, ProgressStep};
use serde::{Deserialize, Serialize};

use crate::state::FinishReason;

/// Events emitted by [`AgentLoop::start_stream`](crate::AgentLoop::start_stream).
///
/// - `progress` — a Thought, Observation or finish step
/// - `done`     — the run ended normally; always the last event
/// - `error`    — the run aborted; always the last event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentStreamEvent {
    Progress { step: ProgressStep, payload: String },

    Done {
        run_id: String,
        answer: String,
        iterations: usize,
        reason: FinishReason,
    },

    Error { message: String },
}

impl AgentStreamEvent {
    /// Event name, matching the serialized `type` tag.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Progress { .. } => "progress",
            Self::Done { .. } => "done",
            Self::Error { .. } => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }
}

impl From<&ProgressEvent> for AgentStreamEvent {
    fn from(event: &ProgressEvent) -> Self {
        Self::Progress {
            step: event.step,
            payload: event.payload.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serialization_progress() {
        let event = AgentStreamEvent::from(&ProgressEvent::thought("I should search"));
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"progress""#));
        assert!(json.contains(r#""step":"Thought""#));
        assert!(json.contains(r#""payload":"I should search""#));
    }

    #[test]
    fn event_serialization_done() {
        let event = AgentStreamEvent::Done {
            run_id: "run-1".into(),
            answer: "Paris".into(),
            iterations: 1,
            reason: FinishReason::IterationLimit,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"done""#));
        assert!(json.contains(r#""reason":"iteration_limit""#));
        assert!(event.is_terminal());
    }

    #[test]
    fn event_type_names() {
        let error = AgentStreamEvent::Error {
            message: "boom".into(),
        };
        assert_eq!(error.event_type(), "error");
        assert!(error.is_terminal());

        let progress = AgentStreamEvent::from(&ProgressEvent::finish("Paris"));
        assert_eq!(progress.event_type(), "progress");
        assert!(!progress.is_terminal());
    }

    #[test]
    fn deserialize_round_trip_keeps_step() {
        let json = r#"{"type":"progress","step":"finish","payload":"Paris"}"#;
        let event: AgentStreamEvent = serde_json::from_str(json).unwrap();
        match event {
            AgentStreamEvent::Progress { step, payload } => {
                assert_eq!(step, ProgressStep::Finish);
                assert_eq!(payload, "Paris");
            }
            other => panic!("Expected Progress, got {other:?}"),
        }
    }
}
