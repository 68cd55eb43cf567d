pub mod types;
pub mod error;
pub mod condition;
pub mod affix;
pub mod category;
pub mod dictionary;
pub mod oracle;
pub mod query;
pub mod expand;
pub mod output;
pub mod config;
pub mod sample;

pub use affix::AffixTable;
pub use config::AnalyzerConfig;
pub use dictionary::{DictionaryOptions, MorphDictionary};
pub use error::{ConfigError, ExpandError, LoadError, OracleError, QueryParseError};
pub use expand::{edit_distance, Analyzer};
pub use oracle::{LexiconConfig, LexiconOracle, SpellOracle};
pub use output::{parse_query, render};
pub use query::{Operator, QueryItem, QueryNode};
pub use types::{
    Category, ExpandOptions, ExpandResult, ExpandWord, ExpandWordType, Flag, StemResult, Variant,
};
