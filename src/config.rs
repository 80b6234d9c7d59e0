//! Configuration types for pwsearch

use crate::error::{Error, Result};
use crate::search::alphabet::Alphabet;
use crate::types::StageId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Dictionary stage configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryConfig {
    /// Run the dictionary stage (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Try the built-in list of common passwords first (default: true)
    #[serde(default = "default_true")]
    pub include_builtin: bool,

    /// Extra wordlist file, one password per line, tried after the built-in list
    #[serde(default)]
    pub wordlist: Option<PathBuf>,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            include_builtin: true,
            wordlist: None,
        }
    }
}

/// Brute-force stage configuration
///
/// Inside a [`SearchConfig`] every field is optional: a partial stage object
/// such as `{ "max_length": 4 }` is merged onto that stage's defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BruteForceConfig {
    /// Run this stage
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Characters to draw candidates from, in enumeration order
    pub alphabet: Alphabet,

    /// Longest candidate to try, inclusive. Must be at least 1 when enabled.
    ///
    /// Not capped: large values make the search run for a very long time.
    pub max_length: usize,
}

impl BruteForceConfig {
    /// Numeric stage defaults: digits `0-9`, up to 6 characters
    pub fn numeric() -> Self {
        Self {
            enabled: true,
            alphabet: Alphabet::numeric(),
            max_length: default_numeric_max_length(),
        }
    }

    /// Alphanumeric stage defaults: `a-z0-9`, up to 4 characters
    pub fn alphanumeric() -> Self {
        Self {
            enabled: true,
            alphabet: Alphabet::lower_alphanumeric(),
            max_length: default_alphanumeric_max_length(),
        }
    }

    /// Same stage, switched off
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Top-level search configuration
///
/// Stages always run in the fixed order dictionary, numeric, alphanumeric; the
/// flags here only switch them on and off.
///
/// # Example
///
/// ```
/// use pwsearch::config::SearchConfig;
///
/// let config = SearchConfig::from_json_str(
///     r#"{ "numeric": { "max_length": 4 }, "alphanumeric": { "enabled": false } }"#,
/// ).unwrap();
/// assert!(config.dictionary.enabled);
/// assert_eq!(config.numeric.max_length, 4);
/// assert_eq!(config.numeric.alphabet.to_string(), "0123456789");
/// assert!(!config.alphanumeric.enabled);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Dictionary stage
    #[serde(default)]
    pub dictionary: DictionaryConfig,

    /// Numeric brute-force stage
    #[serde(
        default = "BruteForceConfig::numeric",
        deserialize_with = "brute_force_serde::numeric"
    )]
    pub numeric: BruteForceConfig,

    /// Alphanumeric brute-force stage
    #[serde(
        default = "BruteForceConfig::alphanumeric",
        deserialize_with = "brute_force_serde::alphanumeric"
    )]
    pub alphanumeric: BruteForceConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            dictionary: DictionaryConfig::default(),
            numeric: BruteForceConfig::numeric(),
            alphanumeric: BruteForceConfig::alphanumeric(),
        }
    }
}

impl SearchConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read config file {}: {}", path.display(), e),
            key: None,
        })?;
        Self::from_json_str(&json)
    }

    /// Stages that will run, in priority order
    pub fn enabled_stages(&self) -> Vec<StageId> {
        let mut stages = Vec::with_capacity(3);
        if self.dictionary.enabled {
            stages.push(StageId::Dictionary);
        }
        if self.numeric.enabled {
            stages.push(StageId::Numeric);
        }
        if self.alphanumeric.enabled {
            stages.push(StageId::Alphanumeric);
        }
        stages
    }

    /// Check the configuration before a session starts
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no stage is enabled, or if an enabled
    /// brute-force stage has a `max_length` of 0.
    pub fn validate(&self) -> Result<()> {
        if self.enabled_stages().is_empty() {
            return Err(Error::Config {
                message: "no search stage is enabled".into(),
                key: None,
            });
        }

        for (key, stage) in [("numeric", &self.numeric), ("alphanumeric", &self.alphanumeric)] {
            if stage.enabled && stage.max_length == 0 {
                return Err(Error::config(
                    format!("{key}.max_length"),
                    format!("{key} stage is enabled but max_length is 0"),
                ));
            }
        }

        Ok(())
    }
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_numeric_max_length() -> usize {
    6
}

fn default_alphanumeric_max_length() -> usize {
    4
}

// Partial brute-force stage objects, merged onto the stage's defaults
mod brute_force_serde {
    use super::BruteForceConfig;
    use crate::search::alphabet::Alphabet;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Partial {
        enabled: Option<bool>,
        alphabet: Option<Alphabet>,
        max_length: Option<usize>,
    }

    impl Partial {
        fn merge_onto(self, mut base: BruteForceConfig) -> BruteForceConfig {
            if let Some(enabled) = self.enabled {
                base.enabled = enabled;
            }
            if let Some(alphabet) = self.alphabet {
                base.alphabet = alphabet;
            }
            if let Some(max_length) = self.max_length {
                base.max_length = max_length;
            }
            base
        }
    }

    pub fn numeric<'de, D>(deserializer: D) -> Result<BruteForceConfig, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Partial::deserialize(deserializer)?.merge_onto(BruteForceConfig::numeric()))
    }

    pub fn alphanumeric<'de, D>(deserializer: D) -> Result<BruteForceConfig, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Partial::deserialize(deserializer)?.merge_onto(BruteForceConfig::alphanumeric()))
    }
}
