//! Errors raised at the model-call boundary.
//!
//! None of these are retried here; the agent loop propagates them to its caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport failure (DNS, connect, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status (auth, rate limit, bad request).
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The body was not the JSON shape we expected.
    #[error("failed to decode LLM response: {0}")]
    Decode(String),

    #[error(
        "no configured provider found for model '{0}'. \
         Set the appropriate API key (e.g. ANTHROPIC_API_KEY, OPENROUTER_API_KEY)."
    )]
    NoProvider(String),
}
