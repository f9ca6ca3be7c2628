// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! emcee - a community-management chat agent that learns which replies land.
//!
//! This is the binary entry point for the emcee agent.

mod shell;

use clap::{Parser, Subcommand};
use emcee_config::EmceeConfig;
use tracing_subscriber::EnvFilter;

/// emcee - a community-management chat agent.
#[derive(Parser, Debug)]
#[command(name = "emcee", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Drive the full pipeline from a local interactive session.
    Shell,
    /// Load, validate, and summarize the configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Configuration problems are the only fatal startup class.
    let config = match emcee_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            emcee_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Some(Commands::Shell) => shell::run_shell(config).await,
        Some(Commands::Config) => {
            print_config_summary(&config);
            Ok(())
        }
        None => {
            println!("emcee: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber. `RUST_LOG` overrides the configured level.
fn init_tracing(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Prints a short human-readable summary of the loaded configuration.
fn print_config_summary(config: &EmceeConfig) {
    println!("agent:     {}", config.agent.name);
    println!("models:    generate={} classify={}", config.anthropic.generate_model, config.anthropic.classify_model);
    println!("database:  {}", config.storage.database_path);
    println!(
        "limits:    {}/day per server, {}s channel cooldown",
        config.router.daily_limit, config.router.cooldown_secs
    );
    println!("topics:    {} keyword mappings", config.topics.keywords.len());
    if config.communities.is_empty() {
        println!("community: none configured (the agent will not speak unprompted)");
    }
    for community in &config.communities {
        println!(
            "community: {} ({}) - {} FAQ entries, {} ignored channels{}",
            community.name,
            community.server_id,
            community.faq.len(),
            community.ignored_channels.len(),
            community
                .daily_limit_override
                .map(|l| format!(", {l}/day override"))
                .unwrap_or_default()
        );
    }
}
