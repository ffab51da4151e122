use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Configuration for loading and validating GEDCOM documents.
///
/// This struct holds settings that control how documents are loaded and the
/// thresholds used by the validation checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Whether malformed lines are skipped (and reported) instead of
    /// aborting the load.
    pub skip_malformed: bool,

    /// The date used as "today" for ages of living people and for the
    /// date-in-the-future check.
    ///
    /// When `None`, today's local date is used.
    pub reference_date: Option<NaiveDate>,

    /// Ages at or above this many years are flagged.
    pub max_age: u64,

    /// Marriages before either spouse reaches this many years are flagged.
    pub min_marriage_age: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            skip_malformed: false,
            reference_date: None,
            max_age: default_max_age(),
            min_marriage_age: default_min_marriage_age(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }
}

const fn default_max_age() -> u64 {
    150
}

const fn default_min_marriage_age() -> u64 {
    14
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        skip_malformed: bool,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        reference_date: Option<NaiveDate>,

        #[serde(default = "default_max_age")]
        max_age: u64,

        #[serde(default = "default_min_marriage_age")]
        min_marriage_age: u64,
    },
}

impl From<Versions> for super::Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                skip_malformed,
                reference_date,
                max_age,
                min_marriage_age,
            } => Self {
                skip_malformed,
                reference_date,
                max_age,
                min_marriage_age,
            },
        }
    }
}

impl From<super::Config> for Versions {
    fn from(config: super::Config) -> Self {
        Self::V1 {
            skip_malformed: config.skip_malformed,
            reference_date: config.reference_date,
            max_age: config.max_age,
            min_marriage_age: config.min_marriage_age,
        }
    }
}
