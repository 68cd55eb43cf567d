use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::category::CategoryRules;
use crate::dictionary::DictionaryOptions;
use crate::error::ConfigError;
use crate::oracle::LexiconConfig;
use crate::types::ExpandOptions;

// Conjunction-like words that are never merged into a compound with a neighbour.
const STOP_WORDS: &[&str] = &["med", "mens"];

/// Analyzer settings, read from TOML. Every field has a default, so an empty
/// file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub stop_words: Vec<String>,
    /// Compute every dictionary item's variants while loading.
    pub eager: bool,
    /// Defaults for expansion calls that do not pass their own options.
    pub expand: ExpandOptions,
    pub dictionary: DictionaryOptions,
    pub lexicon: LexiconConfig,
    pub categories: CategoryRules,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            stop_words: STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            eager: false,
            expand: ExpandOptions::default(),
            dictionary: DictionaryOptions::default(),
            lexicon: LexiconConfig::default(),
            categories: CategoryRules::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Parse TOML text; missing fields keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, Flag};

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(AnalyzerConfig::from_toml_str("").unwrap(), AnalyzerConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config = AnalyzerConfig::from_toml_str(
            r#"
stop_words = ["og"]
eager = true

[expand]
max_edit_distance = 2

[dictionary]
linking_element_flag = 12

[[categories.flags]]
category = "verb"
flags = [1, 2]
"#,
        )
        .unwrap();
        assert_eq!(config.stop_words, vec!["og"]);
        assert!(config.eager);
        assert_eq!(config.expand.max_edit_distance, 2);
        assert!(config.expand.case_insensitive);
        assert_eq!(config.dictionary.linking_element_flag, Flag(12));
        assert_eq!(config.lexicon, LexiconConfig::default());
        assert_eq!(config.categories.flags.len(), 1);
        assert_eq!(config.categories.flags[0].category, Category::Verb);
        // Missing tables keep their defaults.
        assert_eq!(config.categories.tags, CategoryRules::default().tags);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            AnalyzerConfig::from_toml_str("eager = \"yes\""),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            AnalyzerConfig::load("/nonexistent/qexpand.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
