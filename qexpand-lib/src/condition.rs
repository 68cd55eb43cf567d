//! Affix rule conditions over the trailing characters of a stem.
//!
//! A raw condition compiles into exactly one of five forms, tried in this order:
//!
//! ```text
//! .        any stem
//! abc      stem ends with "abc"
//! [abc]    last character is one of a, b, c
//! [^abc]   last character is none of a, b, c
//! [^abc]de stem ends with "de" and the character before it is none of a, b, c
//! ```
//!
//! Anything else is malformed and never matches.

use serde::Serialize;

/// Which of the condition forms a raw condition compiled into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    Any,
    EndsWith,
    LastIn,
    LastNotIn,
    EndsWithAfterNot,
    Malformed,
}

/// A compiled affix condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Any,
    EndsWith(String),
    LastIn(Vec<char>),
    LastNotIn(Vec<char>),
    EndsWithAfterNot { excluded: Vec<char>, ending: String },
    Malformed(String),
}

/// Outcome of evaluating a raw condition against a stem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub kind: ConditionKind,
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_set: Option<Vec<char>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_literal: Option<String>,
}

/// Compile `condition` and evaluate it against `stem`.
pub fn match_condition(stem: &str, condition: &str) -> MatchResult {
    let compiled = Condition::parse(condition);
    let matched = compiled.matches(stem);
    let (captured_set, captured_literal) = match &compiled {
        Condition::Any | Condition::Malformed(_) => (None, None),
        Condition::EndsWith(literal) => (None, Some(literal.clone())),
        Condition::LastIn(set) | Condition::LastNotIn(set) => (Some(set.clone()), None),
        Condition::EndsWithAfterNot { excluded, ending } => {
            (Some(excluded.clone()), Some(ending.clone()))
        }
    };
    MatchResult {
        kind: compiled.kind(),
        matched,
        captured_set,
        captured_literal,
    }
}

impl Condition {
    /// Compile a raw condition. Unrecognised text becomes [`Condition::Malformed`].
    pub fn parse(raw: &str) -> Self {
        if raw == "." {
            return Condition::Any;
        }
        if is_alnum_run(raw) {
            return Condition::EndsWith(raw.to_string());
        }

        let Some(body) = raw.strip_prefix('[') else {
            return Condition::Malformed(raw.to_string());
        };
        let Some(close) = body.find(']') else {
            return Condition::Malformed(raw.to_string());
        };
        let inner = &body[..close];
        let rest = &body[close + 1..];

        match inner.strip_prefix('^') {
            None if rest.is_empty() && is_alnum_run(inner) => {
                Condition::LastIn(inner.chars().collect())
            }
            Some(set) if is_alnum_run(set) => {
                if rest.is_empty() {
                    Condition::LastNotIn(set.chars().collect())
                } else if rest.chars().all(|c| c.is_alphabetic() && c.is_lowercase()) {
                    Condition::EndsWithAfterNot {
                        excluded: set.chars().collect(),
                        ending: rest.to_string(),
                    }
                } else {
                    Condition::Malformed(raw.to_string())
                }
            }
            _ => Condition::Malformed(raw.to_string()),
        }
    }

    pub fn kind(&self) -> ConditionKind {
        match self {
            Condition::Any => ConditionKind::Any,
            Condition::EndsWith(_) => ConditionKind::EndsWith,
            Condition::LastIn(_) => ConditionKind::LastIn,
            Condition::LastNotIn(_) => ConditionKind::LastNotIn,
            Condition::EndsWithAfterNot { .. } => ConditionKind::EndsWithAfterNot,
            Condition::Malformed(_) => ConditionKind::Malformed,
        }
    }

    /// Only the negated-set-plus-suffix form strips characters before appending.
    pub fn strips(&self) -> bool {
        matches!(self, Condition::EndsWithAfterNot { .. })
    }

    /// Whether a rule with this condition fires for `stem`.
    pub fn matches(&self, stem: &str) -> bool {
        match self {
            Condition::Any => true,
            Condition::EndsWith(literal) => stem.ends_with(literal.as_str()),
            Condition::LastIn(set) => stem.chars().last().is_some_and(|c| set.contains(&c)),
            Condition::LastNotIn(set) => stem.chars().last().is_some_and(|c| !set.contains(&c)),
            Condition::EndsWithAfterNot { excluded, ending } => stem
                .strip_suffix(ending.as_str())
                .and_then(|head| head.chars().last())
                .is_some_and(|c| !excluded.contains(&c)),
            Condition::Malformed(_) => false,
        }
    }
}

fn is_alnum_run(s: &str) -> bool {
    !s.is_empty() && s.chars().all(char::is_alphanumeric)
}
