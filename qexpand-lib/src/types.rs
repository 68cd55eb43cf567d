use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::query::QueryNode;

/// Word-list annotation marking a sub-concept; everything from it onwards is
/// dropped from expand-word values.
const SUB_CONCEPT_MARKER: &str = "(underbegreb)";

/// Numeric affix flag attached to dictionary entries and rule sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Flag(pub u32);

impl FromStr for Flag {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(Flag)
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Grammatical category inferred for a dictionary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Unknown,
    Noun,
    Verb,
    ProperNoun,
}

/// One surface form of a stem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub value: String,
    /// Normalised text of the rule that produced the value; empty for the
    /// stem itself.
    pub provenance: String,
}

impl Variant {
    pub fn new(value: impl Into<String>, provenance: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            provenance: provenance.into(),
        }
    }

    /// The grammatical tag at the end of the provenance (text after the last `+`).
    pub fn tag(&self) -> &str {
        self.provenance.rsplit('+').next().unwrap_or("").trim()
    }
}

/// A word split into the part the oracle resolved (`stem`) and a leading
/// part it could not resolve further (`prefix`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemResult {
    pub stem: String,
    pub prefix: String,
    /// `prefix + stem`.
    pub value: String,
}

impl StemResult {
    pub fn new(stem: impl Into<String>, prefix: impl Into<String>) -> Self {
        let stem = stem.into();
        let prefix = prefix.into();
        let value = format!("{prefix}{stem}");
        Self { stem, prefix, value }
    }

    /// A stem result without a compound prefix.
    pub fn plain(stem: impl Into<String>) -> Self {
        Self::new(stem, "")
    }

    pub fn is_compound(&self) -> bool {
        !self.prefix.is_empty()
    }
}

/// Why a word appears in an expand-word row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpandWordType {
    Input,
    Stem,
    Suggestion,
    /// Reserved for synonym sources; the expansion algorithm never emits it.
    Synonym,
}

/// A word recorded while expanding one token of a phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandWord {
    #[serde(rename = "type")]
    pub word_type: ExpandWordType,
    pub value: String,
    pub is_misspelled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ExpandWord {
    pub fn new(word_type: ExpandWordType, value: &str, comment: Option<String>) -> Self {
        let value = value
            .split(SUB_CONCEPT_MARKER)
            .find(|part| !part.is_empty())
            .unwrap_or(value);
        Self {
            word_type,
            value: value.to_string(),
            is_misspelled: false,
            comment,
        }
    }

    pub fn input(value: &str) -> Self {
        Self::new(ExpandWordType::Input, value, None)
    }

    /// A stem derived from `from`.
    pub fn stem(value: &str, from: &str) -> Self {
        Self::new(ExpandWordType::Stem, value, Some(format!("via {from}")))
    }

    /// A suggestion derived from `from`.
    pub fn suggestion(value: &str, from: &str) -> Self {
        Self::new(ExpandWordType::Suggestion, value, Some(format!("via {from}")))
    }
}

/// Options for a single expansion call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpandOptions {
    /// Suggestions further than this from the input are dropped; 0 keeps all.
    pub max_edit_distance: usize,
    /// Prefer a suggestion equal to the input ignoring case over all others.
    pub case_insensitive: bool,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            max_edit_distance: 0,
            case_insensitive: true,
        }
    }
}

/// The outcome of expanding a phrase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpandResult {
    pub original_phrase: String,
    /// One row per input token: its Input word followed by derived words.
    pub words: Vec<Vec<ExpandWord>>,
    pub query: QueryNode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_result_value() {
        let s = StemResult::new("redaktør", "web");
        assert_eq!(s.value, "webredaktør");
        assert!(s.is_compound());
        assert!(!StemResult::plain("hest").is_compound());
    }

    #[test]
    fn test_variant_tag() {
        let v = Variant::new("hestens", "SFX 73 0 ens . +BESTEMT_ENTAL+GENITIV");
        assert_eq!(v.tag(), "GENITIV");
        assert_eq!(Variant::new("hest", "").tag(), "");
    }

    #[test]
    fn test_expand_word_drops_sub_concept_marker() {
        let w = ExpandWord::input("bil(underbegreb) af noget");
        assert_eq!(w.value, "bil");
        assert_eq!(ExpandWord::input("hest").value, "hest");
    }

    #[test]
    fn test_flag_parse() {
        assert_eq!("941".parse::<Flag>(), Ok(Flag(941)));
        assert!("A".parse::<Flag>().is_err());
    }
}
