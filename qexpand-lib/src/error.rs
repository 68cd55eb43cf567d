//! Error types for loading, configuration, expansion and oracle calls.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Flag;

/// Failure while loading an affix table or a dictionary. Any load error
/// invalidates the whole table or dictionary.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("affix line {line}: {reason}: `{content}`")]
    AffixLine {
        line: usize,
        content: String,
        reason: String,
    },

    #[error("affix line {line}: rule set {flag} declares {declared} rules but only {available} lines follow")]
    TruncatedRuleSet {
        line: usize,
        flag: Flag,
        declared: usize,
        available: usize,
    },

    #[error("affix line {line}: rule set {flag} is defined twice")]
    DuplicateRuleSet { line: usize, flag: Flag },

    #[error("dictionary line {line}: {reason}: `{content}`")]
    DictionaryLine {
        line: usize,
        content: String,
        reason: String,
    },
}

/// Caller-input errors rejected before any expansion work.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpandError {
    #[error("phrase is empty or whitespace only")]
    EmptyPhrase,
}

/// A single-word failure reported by a spell-check oracle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OracleError {
    #[error("cannot look up an empty word")]
    EmptyInput,

    #[error("oracle rejected `{word}`: {reason}")]
    Rejected { word: String, reason: String },
}

/// Failure while reading analyzer configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Failure while parsing the textual form of a query tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryParseError {
    #[error("malformed query near `{0}`")]
    Syntax(String),

    #[error("unexpected trailing text `{0}`")]
    Trailing(String),
}
