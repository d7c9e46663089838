//! toolloop core: message/block types, configuration, and shared helpers.
//!
//! This crate has no knowledge of tools or providers; it defines the wire
//! vocabulary the other crates speak:
//! - **types**: conversation messages, content blocks, tool definitions, model responses
//! - **config**: `~/.toolloop/config.json` schema and loader
//! - **utils**: data-dir paths and small string helpers

pub mod config;
pub mod types;
pub mod utils;
