//! History text — the instruction block and the per-round transcript.

use reagent_core::{ActionRegistry, DecisionResponse, FINISH_ACTION, FINISH_DESCRIPTION};

/// Build the history a run starts from: worked examples, then the action
/// list closed by the reserved `Finish` action, then the question.
pub fn initial_history(registry: &ActionRegistry, question: &str) -> String {
    let mut out = String::new();

    let examples = registry.format_examples();
    if !examples.is_empty() {
        out.push_str("====\nExample:\n");
        out.push_str(&examples);
        out.push_str("\n====\n");
    }

    out.push_str("Here is the ACTION_LIST that you can use to help you to answer the question:\n");
    let catalog = registry.format_catalog();
    if !catalog.is_empty() {
        out.push_str(&catalog);
        out.push('\n');
    }
    out.push_str(&format!("{FINISH_ACTION} // {FINISH_DESCRIPTION}\n"));

    out.push_str(&format!("\nInitial Question: {question}\n"));
    out
}

/// The block appended after each action round.
pub fn transcript_block(decision: &DecisionResponse, observation: &str) -> String {
    format!(
        "\nThought:{}\nAction:{}[{}]\nObservation: {}",
        decision.thought, decision.action.kind, decision.action.arg, observation
    )
}
