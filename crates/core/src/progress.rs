//! Progress events reported to the caller while a run is in flight.

use serde::{Deserialize, Serialize};

/// Which part of the loop produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgressStep {
    #[serde(rename = "Thought")]
    Thought,
    #[serde(rename = "Observation")]
    Observation,
    #[serde(rename = "finish")]
    Finish,
}

impl ProgressStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thought => "Thought",
            Self::Observation => "Observation",
            Self::Finish => "finish",
        }
    }
}

impl std::fmt::Display for ProgressStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single progress report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub step: ProgressStep,
    pub payload: String,
}

impl ProgressEvent {
    pub fn thought(payload: impl Into<String>) -> Self {
        Self {
            step: ProgressStep::Thought,
            payload: payload.into(),
        }
    }

    pub fn observation(payload: impl Into<String>) -> Self {
        Self {
            step: ProgressStep::Observation,
            payload: payload.into(),
        }
    }

    pub fn finish(payload: impl Into<String>) -> Self {
        Self {
            step: ProgressStep::Finish,
            payload: payload.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_names_match_wire_format() {
        assert_eq!(ProgressStep::Thought.to_string(), "Thought");
        assert_eq!(ProgressStep::Observation.to_string(), "Observation");
        assert_eq!(ProgressStep::Finish.to_string(), "finish");
    }

    #[test]
    fn event_serialization() {
        let json = serde_json::to_string(&ProgressEvent::finish("Paris")).unwrap();
        assert_eq!(json, r#"{"step":"finish","payload":"Paris"}"#);
    }
}
