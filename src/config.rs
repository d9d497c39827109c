//! Application configuration.
//! Optional `securecheck.toml`, every section falls back to defaults.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "securecheck.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid feature thresholds: {0}")]
    InvalidThresholds(String),
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub database: DatabaseConfig,
    pub cleaning: CleaningConfig,
    pub features: FeatureThresholds,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    pub csv_path: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("traffic_stops.csv"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("police_logs.db"),
        }
    }
}

/// What to do with a row whose date or time cannot be parsed.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimestampPolicy {
    /// Skip the row and report it
    #[default]
    Drop,
    /// Fill with the most frequent parsed value
    Impute,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct CleaningConfig {
    pub timestamp_policy: TimestampPolicy,
}

/// Hour and age cut-offs used by the feature deriver.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FeatureThresholds {
    /// First hour counted as day
    pub day_start_hour: u32,
    /// First hour counted as night
    pub night_start_hour: u32,
    /// Oldest age still counted as young
    pub young_max_age: u32,
    /// Youngest age counted as senior
    pub senior_min_age: u32,
}

impl Default for FeatureThresholds {
    fn default() -> Self {
        Self {
            day_start_hour: 6,
            night_start_hour: 18,
            young_max_age: 25,
            senior_min_age: 60,
        }
    }
}

impl FeatureThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.night_start_hour > 23 || self.day_start_hour >= self.night_start_hour {
            return Err(ConfigError::InvalidThresholds(format!(
                "day_start_hour ({}) must be below night_start_hour ({}) and both within 0..=23",
                self.day_start_hour, self.night_start_hour
            )));
        }
        if self.young_max_age >= self.senior_min_age {
            return Err(ConfigError::InvalidThresholds(format!(
                "young_max_age ({}) must be below senior_min_age ({})",
                self.young_max_age, self.senior_min_age
            )));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load from an explicit path, or from `securecheck.toml` if present.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file just yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(text)?;
        config.features.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.database.path, PathBuf::from("police_logs.db"));
        assert_eq!(config.cleaning.timestamp_policy, TimestampPolicy::Drop);
    }

    #[test]
    fn partial_sections_override_only_named_keys() {
        let config = AppConfig::from_toml(
            r#"
            [cleaning]
            timestamp_policy = "impute"

            [features]
            night_start_hour = 20
            "#,
        )
        .unwrap();
        assert_eq!(config.cleaning.timestamp_policy, TimestampPolicy::Impute);
        assert_eq!(config.features.night_start_hour, 20);
        assert_eq!(config.features.day_start_hour, 6);
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let err = AppConfig::from_toml(
            r#"
            [features]
            young_max_age = 70
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidThresholds(_)));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/securecheck.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
