//! `toolloop status`: show configuration and provider status.

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;

use toolloop_core::config::load_config;
use toolloop_core::utils::get_config_path;
use toolloop_providers::registry::{match_provider, PROVIDERS};

/// Run the status command.
pub fn run(config_path: Option<PathBuf>) -> Result<()> {
    let config_path = config_path.unwrap_or_else(get_config_path);
    let config = load_config(Some(config_path.as_path()));
    let agent = &config.agent;

    println!();
    println!("{}", "toolloop status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );

    println!("  {:<18} {}", "Model:".bold(), agent.model);

    println!(
        "  {:<18} {} | {} | {}",
        "Parameters:".bold(),
        format!("temp: {}", agent.temperature).dimmed(),
        format!("max_tokens: {}", agent.max_tokens).dimmed(),
        format!("max_iterations: {}", agent.max_iterations).dimmed(),
    );

    let history = match agent.history_turns {
        Some(n) => format!("last {n} turns"),
        None => "unbounded".to_string(),
    };
    println!("  {:<18} {}", "History:".bold(), history);

    let providers_map = config.providers.to_map();
    let routed = match match_provider(&agent.model, &providers_map) {
        Some((_, spec)) => spec.display_name.green().to_string(),
        None => "no configured provider".red().to_string(),
    };
    println!("  {:<18} {}", "Routed to:".bold(), routed);

    println!();
    println!("  {}", "Providers:".bold());
    for spec in PROVIDERS {
        let status = match providers_map.get(spec.name) {
            Some(c) if c.is_configured() => format!("{} (key set)", "✓".green()),
            _ => format!("{}", "· not configured".dimmed()),
        };
        println!("    {:<20} {}", spec.display_name, status);
    }
    println!();

    Ok(())
}
