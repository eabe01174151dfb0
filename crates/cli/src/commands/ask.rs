//! `reagent ask` — Answer a single question.

use reagent_agent::{AgentLoop, AgentStreamEvent};
use reagent_config::AppConfig;
use reagent_core::ProgressStep;
use std::sync::Arc;

pub struct AskArgs {
    pub question: String,
    pub max_iterations: Option<usize>,
    pub model: Option<String>,
    pub provider: Option<String>,
}

pub async fn run(args: AskArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(provider) = args.provider {
        config.default_provider = provider;
    }
    if let Some(model) = args.model {
        config.default_model = model;
    }
    if let Some(max) = args.max_iterations {
        config.agent.max_iterations = max;
    }
    config.validate()?;

    // Local servers such as Ollama accept any key.
    if !config.has_api_key() && config.default_provider != "ollama" {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    REAGENT_API_KEY=sk-...");
        eprintln!("    OPENAI_API_KEY=sk-...");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let router = reagent_providers::build_from_config(&config);
    let generator = router.default().ok_or("No default generator configured")?;
    let registry = Arc::new(reagent_actions::default_registry()?);

    let agent = Arc::new(
        AgentLoop::new(generator, registry, config.generation_options())
            .with_max_iterations(config.agent.max_iterations),
    );

    {
        let agent = agent.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\n  Stopping after the current step...");
                agent.stop();
            }
        });
    }

    println!();
    println!("  Question:  {}", args.question);
    println!("  Model:     {} ({})", config.default_model, config.default_provider);
    println!();

    let mut rx = agent.start_stream(args.question);
    while let Some(event) = rx.recv().await {
        match event {
            AgentStreamEvent::Progress { step, payload } => match step {
                ProgressStep::Thought => println!("  Thought:      {payload}"),
                ProgressStep::Observation => println!("  Observation:  {payload}"),
                ProgressStep::Finish => {}
            },
            AgentStreamEvent::Done {
                answer,
                iterations,
                reason,
                ..
            } => {
                println!();
                println!("  Answer ({iterations} rounds, {reason:?}):");
                println!("  {answer}");
                println!();
            }
            AgentStreamEvent::Error { message } => {
                return Err(message.into());
            }
        }
    }

    Ok(())
}
