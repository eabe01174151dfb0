//! Built-in actions for reagent.
//!
//! Host applications register their own actions; these two give the
//! command line something useful to do out of the box: arithmetic and
//! encyclopedic lookup.

pub mod calculator;
pub mod search;

use reagent_core::action::{Action, ActionRegistry};
use reagent_core::error::RegistryError;
use std::sync::Arc;

pub use calculator::CalculateAction;
pub use search::SearchAction;

/// Create a registry with all built-in actions, `Search` first.
pub fn default_registry() -> Result<ActionRegistry, RegistryError> {
    ActionRegistry::from_actions([
        Arc::new(SearchAction::new()) as Arc<dyn Action>,
        Arc::new(CalculateAction::new()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_lists_builtins_in_order() {
        let registry = default_registry().unwrap();
        assert_eq!(registry.names(), vec!["Search", "Calculate"]);
        assert!(registry.format_catalog().starts_with("Search // "));
        assert!(registry.format_examples().contains("Search[capital of France]"));
    }
}
