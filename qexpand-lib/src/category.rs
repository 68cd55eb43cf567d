//! Grammatical category classification for dictionary entries.
//!
//! Classification is data: an ordered list of flag rules where a later match
//! overrides an earlier one, followed by provenance tags that force a category
//! whenever a variant carrying them is produced.

use serde::{Deserialize, Serialize};

use crate::types::{Category, Flag};

// Danish word-list flags.
const PROPER_NOUN_FLAGS: &[u32] = &[55];
const VERB_FLAGS: &[u32] = &[6, 140, 143, 148];
const NOUN_FLAGS: &[u32] = &[46, 73, 193, 194, 252, 254, 736, 737, 815];
// Case/number tags only produced by noun inflection.
const NOUN_TAGS: &[&str] = &["GENITIV", "PLUR_BEK", "PLUR_UBEK", "BESTEMT_ENTAL"];

/// Category assigned when an entry carries any of `flags`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagRule {
    pub category: Category,
    pub flags: Vec<Flag>,
}

/// Category forced by a variant whose provenance ends in `tag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRule {
    pub tag: String,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryRules {
    pub flags: Vec<FlagRule>,
    pub tags: Vec<TagRule>,
}

impl Default for CategoryRules {
    fn default() -> Self {
        let rule = |category, flags: &[u32]| FlagRule {
            category,
            flags: flags.iter().copied().map(Flag).collect(),
        };
        Self {
            flags: vec![
                rule(Category::ProperNoun, PROPER_NOUN_FLAGS),
                rule(Category::Verb, VERB_FLAGS),
                rule(Category::Noun, NOUN_FLAGS),
            ],
            tags: NOUN_TAGS
                .iter()
                .map(|tag| TagRule {
                    tag: tag.to_string(),
                    category: Category::Noun,
                })
                .collect(),
        }
    }
}

impl CategoryRules {
    /// Category from flag membership alone; the last matching rule wins.
    pub fn classify(&self, flags: &[Flag]) -> Category {
        self.flags
            .iter()
            .filter(|rule| rule.flags.iter().any(|f| flags.contains(f)))
            .last()
            .map_or(Category::Unknown, |rule| rule.category)
    }

    /// Category forced by a variant's provenance tag, if any.
    pub fn for_tag(&self, tag: &str) -> Option<Category> {
        self.tags
            .iter()
            .find(|rule| rule.tag == tag)
            .map(|rule| rule.category)
    }
}
