//! `reagent actions` — Show what the agent can do.

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let registry = reagent_actions::default_registry()?;

    println!();
    println!("  Actions ({})", registry.len());
    println!();
    for line in registry.format_catalog().lines() {
        println!("    {line}");
    }
    println!(
        "    {} // {}",
        reagent_core::FINISH_ACTION,
        reagent_core::FINISH_DESCRIPTION
    );

    let examples = registry.format_examples();
    if !examples.is_empty() {
        println!();
        println!("  Worked examples");
        println!();
        for line in examples.lines() {
            println!("    {line}");
        }
    }
    println!();

    Ok(())
}
