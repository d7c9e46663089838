//! Shared CLI helpers: path expansion, response and trace printing, banner.

use std::path::PathBuf;

use colored::Colorize;

use toolloop_agent::ToolTrace;
use toolloop_core::utils::truncate_string;

/// Longest tool output shown in a trace line.
const TRACE_OUTPUT_CHARS: usize = 200;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Print an agent answer to stdout.
pub fn print_response(response: &str) {
    println!();
    println!("{}", "Assistant".cyan().bold());
    if response.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{response}");
    }
    println!();
}

/// Print the tool calls made while answering, dimmed.
pub fn print_tool_traces(traces: &[ToolTrace]) {
    for line in traces.iter().map(format_trace) {
        println!("{}", line.dimmed());
    }
}

fn format_trace(trace: &ToolTrace) -> String {
    let status = if trace.is_error { "error" } else { "ok" };
    format!(
        "  ↳ {}({}) [{status}] {}",
        trace.name,
        trace.input,
        truncate_string(&trace.output, TRACE_OUTPUT_CHARS)
    )
}

/// Print the banner shown at REPL start.
pub fn print_banner(model: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!(
        "{}  v{}  {}",
        "toolloop".cyan().bold(),
        version.dimmed(),
        model.dimmed()
    );
    println!(
        "{}",
        "Type a message, \"info\" for session details, \"/reset\" to start over, or \"exit\" to quit."
            .dimmed()
    );
    println!();
}

/// Print a "thinking" placeholder while the agent runs.
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expand_tilde_home() {
        let result = expand_tilde("~/foo/bar");
        assert!(result.ends_with("foo/bar"));
        assert!(!result.starts_with("~"));
    }

    #[test]
    fn expand_tilde_no_tilde() {
        assert_eq!(expand_tilde("/absolute/path"), PathBuf::from("/absolute/path"));
        assert_eq!(expand_tilde("relative/path"), PathBuf::from("relative/path"));
    }

    #[test]
    fn trace_line_shows_call_and_result() {
        let trace = ToolTrace {
            name: "get_weather".into(),
            input: json!({"city": "Tokyo"}),
            output: r#"{"city":"Tokyo","temperature":18}"#.into(),
            is_error: false,
        };
        let line = format_trace(&trace);
        assert!(line.contains(r#"get_weather({"city":"Tokyo"})"#));
        assert!(line.contains("[ok]"));
        assert!(line.contains("\"temperature\":18"));
    }

    #[test]
    fn trace_line_truncates_long_output() {
        let trace = ToolTrace {
            name: "list_all_preferences".into(),
            input: json!({}),
            output: "x".repeat(500),
            is_error: true,
        };
        let line = format_trace(&trace);
        assert!(line.contains("[error]"));
        assert!(line.ends_with("..."));
        assert!(line.len() < 300);
    }
}
