//! Engine configuration management for `threadcast.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── feed       # [feed]
//! │   └── clients    # [clients]
//! ├── error          # ConfigError
//! └── mod.rs         # Config (this file)
//! ```
//!
//! # Sections
//!
//! | Section     | Purpose                                               |
//! |-------------|-------------------------------------------------------|
//! | `[feed]`    | Tick period, bump limit, recent window, snapshot size |
//! | `[clients]` | Per-IP connection limit                               |
//!
//! Every section is optional; missing fields fall back to their defaults.

mod error;
pub mod section;

pub use error::ConfigError;
pub use section::{ClientsConfig, FeedConfig};

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::log;

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing threadcast.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Per-thread feed settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// Connected client settings
    #[serde(default)]
    pub clients: ClientsConfig,
}

impl Config {
    /// Load and validate configuration from a file.
    ///
    /// Unknown fields are reported and ignored.
    pub fn load(path: &Path) -> Result<Self> {
        let config = Self::from_path(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from file path, warning about unknown fields.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse TOML content, ignoring unknown fields silently.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Reject values the feed loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed.tick_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "feed.tick_interval_ms must be greater than 0".into(),
            ));
        }
        if self.feed.inbox_capacity == 0 {
            return Err(ConfigError::Validation(
                "feed.inbox_capacity must be greater than 0".into(),
            ));
        }
        if self.feed.snapshot_replies == 0 {
            return Err(ConfigError::Validation(
                "feed.snapshot_replies must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Parse a config snippet in tests, failing on unknown fields.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> Config {
    let (parsed, ignored) = Config::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
