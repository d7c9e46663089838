//! toolloop CLI: entry point.
//!
//! # Commands
//!
//! - `toolloop chat [-m MESSAGE] [--max-iterations N]`: single-shot or REPL
//! - `toolloop demo`: weather assistant with three canned queries
//! - `toolloop init`: write the default config file
//! - `toolloop status`: show configuration and provider status

mod demo;
mod helpers;
mod init;
mod repl;
mod status;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use toolloop_agent::{builtin_tools, Agent, AgentOptions, Tool, ToolContext};
use toolloop_core::config::{load_config, Config};
use toolloop_providers::create_provider;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// toolloop: a tool-calling agent loop for the terminal
#[derive(Parser)]
#[command(name = "toolloop", version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.toolloop/config.json)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the agent (single-shot or interactive REPL)
    Chat {
        /// Single message (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        message: Option<String>,

        /// Override the configured iteration cap
        #[arg(long)]
        max_iterations: Option<u32>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Run the weather assistant on three sample questions
    Demo {
        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Write a default config file
    Init,

    /// Show configuration and provider status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref().map(helpers::expand_tilde);

    match cli.command {
        Commands::Chat {
            message,
            max_iterations,
            logs,
        } => {
            init_logging(logs);
            run_chat(config_path, message, max_iterations).await
        }
        Commands::Demo { logs } => {
            init_logging(logs);
            let config = load_config(config_path.as_deref());
            demo::run(&config).await
        }
        Commands::Init => init::run(config_path),
        Commands::Status => status::run(config_path),
    }
}

// ─────────────────────────────────────────────
// Chat command
// ─────────────────────────────────────────────

async fn run_chat(
    config_path: Option<PathBuf>,
    message: Option<String>,
    max_iterations: Option<u32>,
) -> Result<()> {
    let config = load_config(config_path.as_deref());

    let mut options = AgentOptions::from_config(&config.agent);
    if let Some(n) = max_iterations {
        options.max_iterations = n;
    }

    let mut agent = build_agent(&config, builtin_tools(), options)?;
    let mut ctx = session_context(&config);

    match message {
        Some(msg) => {
            info!(session = %ctx.session_id, "processing single message");
            let mark = agent.history().len();
            let outcome = agent
                .run(&msg, &mut ctx)
                .await
                .context("agent run failed")?;
            helpers::print_tool_traces(&agent.history().tool_trace(mark));
            helpers::print_response(outcome.text());
        }
        None => repl::run(agent, ctx).await?,
    }

    Ok(())
}

/// Build an agent for the configured model.
pub fn build_agent(
    config: &Config,
    tools: Vec<Arc<dyn Tool>>,
    options: AgentOptions,
) -> Result<Agent> {
    let provider = create_provider(&config.agent.model, &config.providers.to_map())
        .with_context(|| format!("cannot create provider for '{}'", config.agent.model))?;
    let agent = Agent::new(provider, tools, options)?;
    Ok(agent)
}

/// Fresh tool context seeded from the `session` section of the config.
pub fn session_context(config: &Config) -> ToolContext {
    let session = &config.session;
    ToolContext::new(&session.user_id, &session.session_id)
        .with_state(session.initial_state.clone())
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("toolloop=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
