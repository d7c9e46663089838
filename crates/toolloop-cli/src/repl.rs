//! Interactive REPL.
//!
//! Uses `rustyline` for readline-style editing with persistent history.

use anyhow::Result;
use colored::Colorize;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use serde_json::Value;
use tracing::debug;

use toolloop_agent::{Agent, ToolContext};

use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit"];

/// What a line of input asks the REPL to do.
#[derive(Debug, PartialEq)]
enum Command<'a> {
    Exit,
    Info,
    Reset,
    Message(&'a str),
}

fn parse_command(input: &str) -> Command<'_> {
    let lower = input.to_lowercase();
    if EXIT_COMMANDS.contains(&lower.as_str()) {
        Command::Exit
    } else if lower == "info" {
        Command::Info
    } else if lower == "/reset" {
        Command::Reset
    } else {
        Command::Message(input)
    }
}

/// Run the interactive REPL loop.
pub async fn run(mut agent: Agent, mut ctx: ToolContext) -> Result<()> {
    helpers::print_banner(agent.model());

    let mut editor = create_editor()?;

    loop {
        let input = match editor.readline("You: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted)
            | Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }

        let _ = editor.add_history_entry(&input);

        match parse_command(trimmed) {
            Command::Exit => {
                println!("\nGoodbye!");
                break;
            }
            Command::Info => print_info(&ctx),
            Command::Reset => {
                agent.reset();
                println!("{}\n", "Started a new conversation.".dimmed());
            }
            Command::Message(text) => {
                debug!(session = %ctx.session_id, input = text, "processing input");
                let mark = agent.history().len();
                helpers::print_thinking();

                let result = agent.run(text, &mut ctx).await;
                helpers::clear_thinking();
                helpers::print_tool_traces(&agent.history().tool_trace(mark));

                match result {
                    Ok(outcome) => helpers::print_response(outcome.text()),
                    Err(e) => eprintln!("\n{} {e}\n", "Error:".red().bold()),
                }
            }
        }
    }

    save_history(&mut editor);

    Ok(())
}

/// Print the session identity and stored preferences.
fn print_info(ctx: &ToolContext) {
    println!();
    println!("  {:<12} {}", "User:".bold(), ctx.user_id);
    println!("  {:<12} {}", "Session:".bold(), ctx.session_id);

    let prefs = ctx.preferences();
    if prefs.is_empty() {
        println!("  {:<12} {}", "Preferences:".bold(), "(none)".dimmed());
    } else {
        println!("  {}", "Preferences:".bold());
        for (key, value) in &prefs {
            match value {
                Value::String(s) => println!("    {key}: {s}"),
                other => println!("    {key}: {other}"),
            }
        }
    }
    println!();
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// Path to the history file.
fn history_path() -> std::path::PathBuf {
    toolloop_core::utils::get_data_path()
        .join("history")
        .join("cli_history")
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
