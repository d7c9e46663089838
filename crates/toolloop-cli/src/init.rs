//! `toolloop init`: write the default configuration file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use toolloop_core::config::{save_config, Config};
use toolloop_core::utils::get_config_path;

/// Run the init command.
pub fn run(config_path: Option<PathBuf>) -> Result<()> {
    let config_path = config_path.unwrap_or_else(get_config_path);

    println!();
    println!("{}", "toolloop setup".cyan().bold());
    println!();

    if write_default_config(&config_path)? {
        println!("  {} created config at {}", "✓".green(), config_path.display());
    } else {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    }

    println!();
    println!(
        "{}",
        "  Add an API key under \"providers\", then run `toolloop chat`.".green()
    );
    println!();

    Ok(())
}

/// Write the default config to `path` unless a file is already there.
/// Returns whether a file was written.
fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_config(&Config::default(), Some(path))
        .with_context(|| format!("failed to write config to {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.json");

        assert!(write_default_config(&path).unwrap());
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("maxIterations"));

        std::fs::write(&path, "{}").unwrap();
        assert!(!write_default_config(&path).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}
