//! reagent CLI — the main entry point.
//!
//! Commands:
//! - `ask`      — Answer a question with the agent loop
//! - `actions`  — Show the action catalog and worked examples
//! - `config`   — Show or initialize configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "reagent",
    about = "reagent — Thought/Action/Observation agent loop",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question, printing each step as it happens
    Ask {
        /// The question to answer
        question: String,

        /// Maximum number of action rounds
        #[arg(short = 'n', long)]
        max_iterations: Option<usize>,

        /// Override the model
        #[arg(short, long)]
        model: Option<String>,

        /// Override the generation provider
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// List the built-in actions and their worked examples
    Actions,

    /// Show the effective configuration
    Config {
        /// Write a default config file instead
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for answers.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Ask {
            question,
            max_iterations,
            model,
            provider,
        } => {
            commands::ask::run(commands::ask::AskArgs {
                question,
                max_iterations,
                model,
                provider,
            })
            .await?
        }
        Commands::Actions => commands::actions::run().await?,
        Commands::Config { init } => {
            if init {
                commands::config_cmd::init().await?
            } else {
                commands::config_cmd::show().await?
            }
        }
    }

    Ok(())
}
