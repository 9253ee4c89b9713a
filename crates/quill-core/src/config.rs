//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/quill/config.toml)
//! 3. Environment variables (QUILL_* prefix)
//!
//! Environment variables take precedence over config file values.
//! The core only consumes this configuration; it never writes it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::loader::{LoadOptions, DEFAULT_NOTE_FILENAME};
use crate::parse::ParseOptions;

/// Environment variable prefix
const ENV_PREFIX: &str = "QUILL";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory holding the notes tree
    #[serde(default = "default_notes_dir")]
    pub notes_dir: PathBuf,

    /// Sentinel filename that marks a folder as a note
    #[serde(default = "default_note_filename")]
    pub note_filename: String,

    /// chrono format string for front-matter dates
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Prefix marker for builtin inline tags
    #[serde(default = "default_builtin_tag_prefix")]
    pub builtin_tag_prefix: String,

    /// Prefix marker for custom inline tags
    #[serde(default = "default_custom_tag_prefix")]
    pub custom_tag_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notes_dir: default_notes_dir(),
            note_filename: default_note_filename(),
            date_format: default_date_format(),
            builtin_tag_prefix: default_builtin_tag_prefix(),
            custom_tag_prefix: default_custom_tag_prefix(),
        }
    }
}

impl Config {
    /// Load configuration from the default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (QUILL_NOTES_DIR, QUILL_NOTE_FILENAME,
    ///    QUILL_DATE_FORMAT, QUILL_BUILTIN_TAG_PREFIX,
    ///    QUILL_CUSTOM_TAG_PREFIX)
    /// 2. Config file (~/.config/quill/config.toml or QUILL_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_NOTES_DIR", ENV_PREFIX)) {
            self.notes_dir = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var(format!("{}_NOTE_FILENAME", ENV_PREFIX)) {
            if !val.is_empty() {
                self.note_filename = val;
            }
        }
        if let Ok(val) = std::env::var(format!("{}_DATE_FORMAT", ENV_PREFIX)) {
            if !val.is_empty() {
                self.date_format = val;
            }
        }
        if let Ok(val) = std::env::var(format!("{}_BUILTIN_TAG_PREFIX", ENV_PREFIX)) {
            if !val.is_empty() {
                self.builtin_tag_prefix = val;
            }
        }
        if let Ok(val) = std::env::var(format!("{}_CUSTOM_TAG_PREFIX", ENV_PREFIX)) {
            if !val.is_empty() {
                self.custom_tag_prefix = val;
            }
        }
    }

    /// Get the config file path
    ///
    /// Can be overridden with the QUILL_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quill")
            .join("config.toml")
    }

    /// Parser configuration derived from this config
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            date_format: self.date_format.clone(),
            builtin_tag_prefix: self.builtin_tag_prefix.clone(),
            custom_tag_prefix: self.custom_tag_prefix.clone(),
        }
    }

    /// Loader configuration derived from this config
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            note_filename: self.note_filename.clone(),
            parse: self.parse_options(),
        }
    }
}

/// Get the default notes directory
fn default_notes_dir() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("notes")
}

fn default_note_filename() -> String {
    DEFAULT_NOTE_FILENAME.to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d %H:%M".to_string()
}

fn default_builtin_tag_prefix() -> String {
    "@?".to_string()
}

fn default_custom_tag_prefix() -> String {
    "@!".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap();
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            // Clear all the vars
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "QUILL_NOTES_DIR",
        "QUILL_NOTE_FILENAME",
        "QUILL_DATE_FORMAT",
        "QUILL_BUILTIN_TAG_PREFIX",
        "QUILL_CUSTOM_TAG_PREFIX",
    ];

    #[test]
    fn test_default_config() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config::default();
        assert_eq!(config.note_filename, "entry.md");
        assert_eq!(config.date_format, "%Y-%m-%d %H:%M");
        assert_eq!(config.builtin_tag_prefix, "@?");
        assert_eq!(config.custom_tag_prefix, "@!");
        assert!(config.notes_dir.ends_with("notes"));
    }

    #[test]
    fn test_env_override_notes_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("QUILL_NOTES_DIR", "/tmp/quill-test");
        config.apply_env_overrides();

        assert_eq!(config.notes_dir, PathBuf::from("/tmp/quill-test"));
    }

    #[test]
    fn test_env_override_tag_prefixes() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("QUILL_BUILTIN_TAG_PREFIX", "#");
        env::set_var("QUILL_CUSTOM_TAG_PREFIX", "+");
        config.apply_env_overrides();

        assert_eq!(config.builtin_tag_prefix, "#");
        assert_eq!(config.custom_tag_prefix, "+");

        // Empty values do not clobber the defaults.
        env::set_var("QUILL_BUILTIN_TAG_PREFIX", "");
        config.apply_env_overrides();
        assert_eq!(config.builtin_tag_prefix, "#");
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            notes_dir = "/custom/notes"
            note_filename = "note.md"
            date_format = "%Y-%m-%d"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.notes_dir, PathBuf::from("/custom/notes"));
        assert_eq!(config.note_filename, "note.md");
        assert_eq!(config.date_format, "%Y-%m-%d");
        // Unset keys fall back to defaults.
        assert_eq!(config.builtin_tag_prefix, "@?");
    }

    #[test]
    fn test_env_wins_over_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        env::set_var("QUILL_NOTE_FILENAME", "env.md");
        let config = Config::load_from_str("note_filename = \"file.md\"").unwrap();
        assert_eq!(config.note_filename, "env.md");
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        // Should return defaults when file doesn't exist
        assert_eq!(config.note_filename, "entry.md");
    }

    #[test]
    fn test_serialization_round_trip() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            notes_dir: PathBuf::from("/data/notes"),
            note_filename: "entry.md".to_string(),
            date_format: "%Y-%m-%d %H:%M".to_string(),
            builtin_tag_prefix: "@?".to_string(),
            custom_tag_prefix: "@!".to_string(),
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.notes_dir, config.notes_dir);
        assert_eq!(parsed.note_filename, config.note_filename);
        assert_eq!(parsed.date_format, config.date_format);
    }

    #[test]
    fn test_parse_and_load_options() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config::default();
        let popts = config.parse_options();
        assert_eq!(popts.date_format, config.date_format);
        assert_eq!(popts.builtin_tag_prefix, config.builtin_tag_prefix);

        let lopts = config.load_options();
        assert_eq!(lopts.note_filename, config.note_filename);
        assert_eq!(lopts.parse.custom_tag_prefix, config.custom_tag_prefix);
    }
}
