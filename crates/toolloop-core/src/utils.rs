//! Small shared helpers: data-dir paths, timestamps, display truncation.

use std::path::PathBuf;

/// Name of the per-user data directory under `$HOME`.
const DATA_DIR: &str = ".toolloop";

/// `~/.toolloop/`, or `./.toolloop/` when no home directory is known.
pub fn get_data_path() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR)
}

/// `~/.toolloop/config.json`.
pub fn get_config_path() -> PathBuf {
    get_data_path().join("config.json")
}

/// Current UTC time, RFC 3339.
pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Cut `s` to at most `max_chars` characters, ending in `...` when cut.
/// Widths of 3 or less have no room for the ellipsis and cut plainly.
pub fn truncate_string(s: &str, max_chars: usize) -> String {
    let byte_end = |n: usize| s.char_indices().nth(n).map_or(s.len(), |(i, _)| i);

    if s.char_indices().nth(max_chars).is_none() {
        s.to_string()
    } else if max_chars <= ELLIPSIS.len() {
        s[..byte_end(max_chars)].to_string()
    } else {
        format!("{}{ELLIPSIS}", &s[..byte_end(max_chars - ELLIPSIS.len())])
    }
}

const ELLIPSIS: &str = "...";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_short_input() {
        assert_eq!(truncate_string("sunny", 10), "sunny");
        assert_eq!(truncate_string("exactly10!", 10), "exactly10!");
    }

    #[test]
    fn test_truncate_cuts_with_ellipsis() {
        let out = truncate_string(r#"{"city":"Tokyo","temperature":28}"#, 12);
        assert_eq!(out, r#"{"city":"..."#);
        assert_eq!(out.chars().count(), 12);
    }

    #[test]
    fn test_truncate_never_exceeds_width() {
        assert_eq!(truncate_string("Tokyo", 0), "");
        assert_eq!(truncate_string("Tokyo", 2), "To");
        assert_eq!(truncate_string("Tokyo", 3), "Tok");
        assert_eq!(truncate_string("Tokyo", 4), "T...");
        assert_eq!(truncate_string("東京都", 2), "東京");
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_string("こんにちは世界です", 5), "こん...");
    }

    #[test]
    fn test_timestamp_is_rfc3339() {
        chrono::DateTime::parse_from_rfc3339(&timestamp()).unwrap();
    }

    #[test]
    fn test_config_path_under_data_dir() {
        let path = get_config_path();
        assert!(path.ends_with("config.json"));
        assert!(path.parent().unwrap().ends_with(".toolloop"));
    }
}
