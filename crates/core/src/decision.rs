//! The structured decision the model produces on every loop turn.
//!
//! The generation backend is asked for a value matching [`DecisionResponse::schema`].
//! Whatever comes back is checked with [`DecisionResponse::validate`] before the
//! loop interprets it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved action name that ends a run.
pub const FINISH_ACTION: &str = "Finish";

/// Action rounds a run may take unless configured otherwise.
pub const DEFAULT_MAX_ITERATIONS: usize = 4;

/// Catalog line describing the reserved [`FINISH_ACTION`].
pub const FINISH_DESCRIPTION: &str =
    "If you believe you've found that the last observation answered to the question.";

/// The action half of a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionAction {
    /// A registered action name or [`FINISH_ACTION`]. May be empty, which the
    /// loop reports as a missing action.
    #[serde(rename = "type")]
    pub kind: String,
    pub arg: String,
}

/// One `thought + action` decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionResponse {
    pub thought: String,
    pub action: DecisionAction,
}

/// Outcome of checking a raw generation result against the decision shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid(DecisionResponse),
    Invalid(String),
}

impl DecisionResponse {
    pub fn new(thought: impl Into<String>, kind: impl Into<String>, arg: impl Into<String>) -> Self {
        Self {
            thought: thought.into(),
            action: DecisionAction {
                kind: kind.into(),
                arg: arg.into(),
            },
        }
    }

    pub fn is_finish(&self) -> bool {
        self.action.kind == FINISH_ACTION
    }

    /// Whether the decision names an action. Only an empty name counts as
    /// missing; whitespace is left for the registry to reject.
    pub fn has_action(&self) -> bool {
        !self.action.kind.is_empty()
    }

    /// JSON schema sent to the generation backend. The descriptions double
    /// as instructions to the model.
    pub fn schema() -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "thought": {
                    "type": "string",
                    "description": "Provide your reasoning or thought process about the action you plan to undertake from ACTION_LIST to address the user's question and from the last Observation. For example: 'To find out the capital of France, I should search for it.'"
                },
                "action": {
                    "type": "object",
                    "properties": {
                        "type": {
                            "type": "string",
                            "description": "Add here the appropriate action from ACTION_LIST. For instance: 'Search'. If you believe you've found the answer, use the 'Finish' action to conclude the response to the question."
                        },
                        "arg": {
                            "type": "string",
                            "description": "Specify the parameter or key detail for the chosen action that helps in answering the question. For instance: 'France' when trying to find its capital."
                        }
                    },
                    "required": ["type", "arg"],
                    "additionalProperties": false
                }
            },
            "required": ["thought", "action"],
            "additionalProperties": false
        })
    }

    /// Check a raw value against the decision shape.
    ///
    /// `action.type` may be absent or null; that yields a valid decision with
    /// an empty action name so the loop can report it as a missing action.
    /// Every other deviation is invalid.
    pub fn validate(value: &Value) -> Validation {
        match WireDecision::deserialize(value) {
            Ok(wire) => Validation::Valid(DecisionResponse::new(
                wire.thought,
                wire.action.kind.unwrap_or_default(),
                wire.action.arg,
            )),
            Err(e) => Validation::Invalid(e.to_string()),
        }
    }
}

/// Wire shape accepted by [`DecisionResponse::validate`].
#[derive(Deserialize)]
struct WireDecision {
    thought: String,
    action: WireAction,
}

#[derive(Deserialize)]
struct WireAction {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    arg: String,
}
