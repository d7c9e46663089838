//! `toolloop demo`: the weather assistant on three sample questions.
//!
//! All three queries share one conversation, so later answers can refer
//! back to earlier ones.

use anyhow::{Context, Result};
use colored::Colorize;

use toolloop_agent::{weather_tools, AgentOptions, ContextBuilder, WEATHER_SYSTEM_PROMPT};
use toolloop_core::config::Config;

use crate::helpers;
use crate::{build_agent, session_context};

/// Sample questions, with a heading for each.
const QUERIES: &[(&str, &str)] = &[
    ("Simple weather query", "What's the weather like in Tokyo?"),
    (
        "Multi-city comparison",
        "Compare the weather in London and Paris. Which city is warmer?",
    ),
    (
        "Temperature unit preference",
        "What's the temperature in New York in Fahrenheit?",
    ),
];

/// Run the demo command.
pub async fn run(config: &Config) -> Result<()> {
    let options = AgentOptions {
        context: ContextBuilder::new(WEATHER_SYSTEM_PROMPT),
        ..AgentOptions::from_config(&config.agent)
    };
    let mut agent = build_agent(config, weather_tools(), options)?;
    let mut ctx = session_context(config);

    for (i, (title, query)) in QUERIES.iter().enumerate() {
        println!();
        println!("{}", format!("Test {}: {title}", i + 1).cyan().bold());
        println!("{} {query}", "You:".bold());

        let mark = agent.history().len();
        let outcome = agent
            .run(query, &mut ctx)
            .await
            .with_context(|| format!("demo query {} failed", i + 1))?;

        helpers::print_tool_traces(&agent.history().tool_trace(mark));
        helpers::print_response(outcome.text());
        println!(
            "{}",
            format!("({} tool round(s))", outcome.iterations()).dimmed()
        );
    }

    Ok(())
}
