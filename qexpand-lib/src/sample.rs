//! Sample Danish word list embedded at compile time.

/// Affix file with the noun, proper-noun and verb rule sets of the sample.
pub const AFFIX: &str = include_str!("../data/sample.aff");

/// Word list matching [`AFFIX`].
pub const DICTIONARY: &str = include_str!("../data/sample.dic");

/// Analyzer configuration for the sample word list.
pub const CONFIG: &str = include_str!("../data/qexpand.toml");
