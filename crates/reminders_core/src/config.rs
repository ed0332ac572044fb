//! Core configuration.
//!
//! # Responsibility
//! - Describe storage keys, first-run seeding, the derived birthday event
//!   template and logging settings.
//! - Parse TOML configuration files.
//!
//! # Invariants
//! - Every field has a default; an empty document is a valid configuration.

use crate::logging::default_log_level;
use crate::repo::contact_repo::DEFAULT_CONTACTS_KEY;
use crate::repo::event_repo::DEFAULT_EVENTS_KEY;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Configuration loading failure.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Top-level configuration for the reminders core.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub storage: StorageConfig,
    /// Seed sample contacts/events when a store is empty after first load.
    pub seed_sample_data: bool,
    pub birthday: BirthdayConfig,
    pub logging: LoggingConfig,
}

impl CoreConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

/// Document keys of the two collections.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub contacts_key: String,
    pub events_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            contacts_key: DEFAULT_CONTACTS_KEY.to_string(),
            events_key: DEFAULT_EVENTS_KEY.to_string(),
        }
    }
}

/// Template applied to newly derived birthday events.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BirthdayConfig {
    pub category: String,
    pub color: String,
    pub reminder_days: Vec<u32>,
}

impl Default for BirthdayConfig {
    fn default() -> Self {
        Self {
            category: "Birthday".to_string(),
            color: "#ff6b9d".to_string(),
            reminder_days: vec![7, 1],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute log directory. File logging stays off when unset.
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};

    #[test]
    fn empty_document_yields_defaults() {
        let config = CoreConfig::from_toml_str("").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.storage.contacts_key, "sg_contacts_v1");
        assert_eq!(config.storage.events_key, "sg_events_v1");
        assert_eq!(config.birthday.reminder_days, vec![7, 1]);
        assert!(!config.seed_sample_data);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = CoreConfig::from_toml_str(
            r##"
            seed_sample_data = true

            [birthday]
            color = "#00aaff"

            [logging]
            level = "warn"
            dir = "/var/log/reminders"
            "##,
        )
        .unwrap();

        assert!(config.seed_sample_data);
        assert_eq!(config.birthday.color, "#00aaff");
        assert_eq!(config.birthday.category, "Birthday");
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.dir.as_deref(), Some("/var/log/reminders"));
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let err = CoreConfig::from_toml_str("seed_sample_data = \"yes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = CoreConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }
}
