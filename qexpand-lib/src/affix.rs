//! Suffix rule sets parsed from a Hunspell-style affix file.

use std::collections::HashMap;

use crate::condition::Condition;
use crate::error::LoadError;
use crate::types::{Flag, Variant};

const SUFFIX_DIRECTIVE: &str = "SFX";
const COMMENT_MARKER: char = '#';
/// Strip/append value meaning "nothing".
const EMPTY_AFFIX: &str = "0";

/// One `SFX <flag> <strip> <append>[/<flags>] <condition> [comment]` line.
#[derive(Debug, Clone)]
pub struct SuffixRule {
    pub flag: Flag,
    pub strip: String,
    pub append: String,
    /// Continuation flags after `/` in the append field. Kept, never applied.
    pub continuation: Vec<Flag>,
    pub condition: Condition,
    pub comment: Option<String>,
    /// Normalised rule text, used as variant provenance.
    pub text: String,
}

impl SuffixRule {
    /// Parse a rule line. Returns the reason on failure; the caller adds the
    /// line number.
    pub fn parse(line: &str) -> Result<Self, String> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 5 {
            return Err(format!("expected at least 5 fields, found {}", fields.len()));
        }
        if fields[0] != SUFFIX_DIRECTIVE {
            return Err(format!("expected `{SUFFIX_DIRECTIVE}`, found `{}`", fields[0]));
        }
        let flag = parse_flag(fields[1])?;
        let (append, continuation) = match fields[3].split_once('/') {
            Some((append, flags)) => (append, parse_flag_list(flags)?),
            None => (fields[3], Vec::new()),
        };
        let comment = (fields.len() > 5).then(|| fields[5..].join(" "));

        Ok(Self {
            flag,
            strip: fields[2].to_string(),
            append: append.to_string(),
            continuation,
            condition: Condition::parse(fields[4]),
            comment,
            text: fields.join(" "),
        })
    }

    /// The surface form this rule produces for `stem`, if it fires.
    pub fn apply(&self, stem: &str) -> Option<String> {
        if self.append == EMPTY_AFFIX || !self.condition.matches(stem) {
            return None;
        }
        let base = if self.condition.strips() && self.strip != EMPTY_AFFIX {
            let keep = stem.chars().count().checked_sub(self.strip.chars().count())?;
            stem.chars().take(keep).collect::<String>()
        } else {
            stem.to_string()
        };
        Some(base + &self.append)
    }
}

/// All suffix rules declared under one flag.
#[derive(Debug, Clone)]
pub struct AffixRuleSet {
    pub flag: Flag,
    pub cross_product: bool,
    pub comment: Option<String>,
    pub rules: Vec<SuffixRule>,
}

impl AffixRuleSet {
    /// Every variant the rules produce for `stem`, in rule order.
    pub fn apply(&self, stem: &str) -> Vec<Variant> {
        self.rules
            .iter()
            .filter_map(|rule| rule.apply(stem).map(|v| Variant::new(v, rule.text.clone())))
            .collect()
    }
}

/// Suffix rule sets keyed by flag.
#[derive(Debug, Clone, Default)]
pub struct AffixTable {
    sets: HashMap<Flag, AffixRuleSet>,
}

impl AffixTable {
    /// Parse the text of an affix file. Only suffix rule sets are read; every
    /// other directive is ignored.
    pub fn parse(raw: &str) -> Result<Self, LoadError> {
        let lines: Vec<&str> = raw.lines().collect();
        let mut sets = HashMap::new();
        let mut previous: Option<&str> = None;
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i].trim();
            let line_no = i + 1;
            i += 1;

            if line.is_empty() {
                continue;
            }
            if !is_header(line) {
                previous = Some(line);
                continue;
            }

            let (flag, cross_product, count) =
                parse_header(line).map_err(|reason| LoadError::AffixLine {
                    line: line_no,
                    content: line.to_string(),
                    reason,
                })?;
            let comment = previous
                .and_then(|p| p.strip_prefix(COMMENT_MARKER))
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty());

            let available = lines.len() - i;
            if count > available {
                return Err(LoadError::TruncatedRuleSet {
                    line: line_no,
                    flag,
                    declared: count,
                    available,
                });
            }

            let mut rules = Vec::with_capacity(count);
            for (offset, body) in lines[i..i + count].iter().enumerate() {
                let rule_line = i + offset + 1;
                let rule = SuffixRule::parse(body).map_err(|reason| LoadError::AffixLine {
                    line: rule_line,
                    content: body.to_string(),
                    reason,
                })?;
                if rule.flag != flag {
                    return Err(LoadError::AffixLine {
                        line: rule_line,
                        content: body.to_string(),
                        reason: format!("rule belongs to flag {} inside rule set {flag}", rule.flag),
                    });
                }
                rules.push(rule);
            }
            i += count;
            previous = None;

            let set = AffixRuleSet {
                flag,
                cross_product,
                comment,
                rules,
            };
            if sets.insert(flag, set).is_some() {
                return Err(LoadError::DuplicateRuleSet {
                    line: line_no,
                    flag,
                });
            }
        }

        tracing::info!(rule_sets = sets.len(), "loaded affix table");
        Ok(Self { sets })
    }

    /// The rule set declared for `flag`.
    pub fn get(&self, flag: Flag) -> Option<&AffixRuleSet> {
        self.sets.get(&flag)
    }

    /// Every rule set, ordered by flag.
    pub fn rule_sets(&self) -> Vec<&AffixRuleSet> {
        let mut sets: Vec<&AffixRuleSet> = self.sets.values().collect();
        sets.sort_by_key(|set| set.flag);
        sets
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

fn is_header(line: &str) -> bool {
    line.split_whitespace().next() == Some(SUFFIX_DIRECTIVE)
}

/// `SFX <flag> <Y|N> <count>`
fn parse_header(line: &str) -> Result<(Flag, bool, usize), String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(format!("expected 4 header fields, found {}", fields.len()));
    }
    let flag = parse_flag(fields[1])?;
    let cross_product = match fields[2] {
        "Y" => true,
        "N" => false,
        other => return Err(format!("invalid cross-product marker `{other}`")),
    };
    let count = fields[3]
        .parse::<usize>()
        .map_err(|_| format!("invalid rule count `{}`", fields[3]))?;
    Ok((flag, cross_product, count))
}

fn parse_flag(raw: &str) -> Result<Flag, String> {
    raw.parse::<Flag>().map_err(|_| format!("invalid flag `{raw}`"))
}

/// Parse a comma separated flag list such as `46,73`.
pub(crate) fn parse_flag_list(raw: &str) -> Result<Vec<Flag>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(parse_flag)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const AFFIX: &str = "\
SET UTF-8
TRY esianrtolcdugmphbyfvkwzxqæøå

# Substantiv, fælleskøn
SFX 73 Y 3
SFX 73 0 en . +BESTEMT_ENTAL
SFX 73 0 ens . +BESTEMT_ENTAL+GENITIV
SFX 73 0 s [^s] +GENITIV

PFX 5 Y 1
PFX 5 0 u .

SFX 6 Y 3
SFX 6 0 r e +NUTID
SFX 6 e te [^u]se +DATID
SFX 6 0 0/12 .
";

    #[test]
    fn test_parse_rule_sets() {
        let table = AffixTable::parse(AFFIX).unwrap();
        assert_eq!(table.len(), 2);

        let nouns = table.get(Flag(73)).unwrap();
        assert_eq!(nouns.comment.as_deref(), Some("Substantiv, fælleskøn"));
        assert!(nouns.cross_product);
        assert_eq!(nouns.rules.len(), 3);
        assert_eq!(nouns.rules[1].comment.as_deref(), Some("+BESTEMT_ENTAL+GENITIV"));

        // Preceded by a blank line and a PFX rule, not a comment.
        assert_eq!(table.get(Flag(6)).unwrap().comment, None);
        assert!(table.get(Flag(5)).is_none());
    }

    #[test]
    fn test_apply_in_rule_order() {
        let table = AffixTable::parse(AFFIX).unwrap();
        let values: Vec<String> = table
            .get(Flag(73))
            .unwrap()
            .apply("hest")
            .into_iter()
            .map(|v| v.value)
            .collect();
        assert_eq!(values, vec!["hesten", "hestens", "hests"]);
    }

    #[test]
    fn test_strip_only_for_negated_suffix_form() {
        let table = AffixTable::parse(AFFIX).unwrap();
        let verbs = table.get(Flag(6)).unwrap();
        let values: Vec<String> = verbs.apply("spise").into_iter().map(|v| v.value).collect();
        assert_eq!(values, vec!["spiser", "spiste"]);
    }

    #[test]
    fn test_empty_append_never_fires() {
        let table = AffixTable::parse(AFFIX).unwrap();
        let rule = &table.get(Flag(6)).unwrap().rules[2];
        assert_eq!(rule.append, "0");
        assert_eq!(rule.continuation, vec![Flag(12)]);
        assert_eq!(rule.apply("spise"), None);
        assert_eq!(rule.apply(""), None);
    }

    #[test]
    fn test_rule_sets_ordered_by_flag() {
        let table = AffixTable::parse(AFFIX).unwrap();
        let flags: Vec<Flag> = table.rule_sets().iter().map(|set| set.flag).collect();
        assert_eq!(flags, vec![Flag(6), Flag(73)]);
    }

    #[test]
    fn test_truncated_rule_set_fails() {
        let err = AffixTable::parse("SFX 73 Y 3\nSFX 73 0 en .\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::TruncatedRuleSet {
                line: 1,
                declared: 3,
                available: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_bad_rule_line_reports_line_number() {
        let err = AffixTable::parse("# x\nSFX 73 Y 1\nSFX 73 0 en\n").unwrap_err();
        match err {
            LoadError::AffixLine { line, content, .. } => {
                assert_eq!(line, 3);
                assert_eq!(content, "SFX 73 0 en");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rule_flag_must_match_header() {
        let err = AffixTable::parse("SFX 73 Y 1\nSFX 74 0 en .\n").unwrap_err();
        assert!(matches!(err, LoadError::AffixLine { line: 2, .. }));
    }

    #[test]
    fn test_duplicate_rule_set_fails() {
        let err = AffixTable::parse("SFX 1 Y 0\nSFX 1 Y 0\n").unwrap_err();
        assert!(matches!(err, LoadError::DuplicateRuleSet { line: 2, .. }));
    }
}
