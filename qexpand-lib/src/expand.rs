//! Query expansion: turn a phrase into a tree of alternative spellings.
//!
//! Each token is classified against the oracle and expanded into an OR-group:
//!
//! - Non-alphabetic tokens pass through literally.
//! - A token that forms a known compound with its right neighbour consumes
//!   both tokens and contributes the parts and the compound.
//! - A correctly spelled token contributes its stems and their variants.
//! - A misspelled token contributes oracle suggestions and their variants.
//!
//! The OR-groups are joined by a top-level AND.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use crate::affix::AffixTable;
use crate::config::AnalyzerConfig;
use crate::dictionary::MorphDictionary;
use crate::error::{ExpandError, LoadError};
use crate::oracle::{LexiconOracle, SpellOracle};
use crate::query::QueryNode;
use crate::sample;
use crate::types::{ExpandOptions, ExpandResult, ExpandWord, ExpandWordType, StemResult};

/// Spell-check oracle, word list and settings bundled for expansion. Read-only
/// after construction, so one analyzer can serve concurrent callers.
#[derive(Debug)]
pub struct Analyzer<O> {
    oracle: O,
    dictionary: MorphDictionary,
    stop_words: HashSet<String>,
    defaults: ExpandOptions,
}

impl Analyzer<LexiconOracle> {
    /// Build an analyzer from affix and dictionary text, answering oracle
    /// calls from the dictionary itself.
    pub fn from_sources(
        affix: &str,
        dictionary: &str,
        config: &AnalyzerConfig,
    ) -> Result<Self, LoadError> {
        let affix = Arc::new(AffixTable::parse(affix)?);
        let dictionary = MorphDictionary::parse(
            dictionary,
            affix,
            Arc::new(config.categories.clone()),
            &config.dictionary,
        )?;
        let oracle = LexiconOracle::new(&dictionary, config.lexicon.clone());
        Ok(Self::new(oracle, dictionary, config))
    }

    /// Like [`Analyzer::from_sources`], reading both files from disk.
    pub fn from_files(
        affix_path: impl AsRef<Path>,
        dictionary_path: impl AsRef<Path>,
        config: &AnalyzerConfig,
    ) -> Result<Self, LoadError> {
        let affix = read(affix_path.as_ref())?;
        let dictionary = read(dictionary_path.as_ref())?;
        Self::from_sources(&affix, &dictionary, config)
    }

    /// The analyzer for the bundled sample word list.
    pub fn sample() -> Result<Self, LoadError> {
        let config = AnalyzerConfig::from_toml_str(sample::CONFIG).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "bundled config is invalid; using defaults");
            AnalyzerConfig::default()
        });
        Self::from_sources(sample::AFFIX, sample::DICTIONARY, &config)
    }
}

fn read(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl<O: SpellOracle> Analyzer<O> {
    /// Bundle an oracle with a loaded dictionary. Materializes every item's
    /// variants when `config.eager` is set.
    pub fn new(oracle: O, dictionary: MorphDictionary, config: &AnalyzerConfig) -> Self {
        if config.eager {
            dictionary.materialize();
        }
        Self {
            oracle,
            dictionary,
            stop_words: config.stop_words.iter().map(|w| w.to_lowercase()).collect(),
            defaults: config.expand.clone(),
        }
    }

    pub fn dictionary(&self) -> &MorphDictionary {
        &self.dictionary
    }

    /// The configured default expansion options.
    pub fn default_options(&self) -> &ExpandOptions {
        &self.defaults
    }

    /// Whether the oracle accepts `word`.
    pub fn spell(&self, word: &str) -> bool {
        self.oracle.spell(word)
    }

    /// Oracle stems of `word`, each with its unresolved compound prefix.
    pub fn stem(&self, word: &str) -> Vec<StemResult> {
        self.oracle.stem(word)
    }

    /// Every surface form of a stem result (see [`MorphDictionary::morph`]).
    pub fn morph(&self, stem: &StemResult) -> Vec<String> {
        self.dictionary.morph(stem)
    }

    /// Oracle suggestions. A failing oracle call yields no suggestions.
    pub fn suggest(&self, word: &str) -> Vec<String> {
        match self.oracle.suggest(word) {
            Ok(suggestions) => suggestions,
            Err(e) => {
                tracing::warn!(word, error = %e, "oracle failed to suggest; using none");
                Vec::new()
            }
        }
    }

    /// Expand `phrase` with the configured default options.
    pub fn expand_default(&self, phrase: &str) -> Result<ExpandResult, ExpandError> {
        self.expand(phrase, &self.defaults)
    }

    /// Expand every whitespace-separated token of `phrase` into its known
    /// variants and join them into a query tree.
    pub fn expand(&self, phrase: &str, options: &ExpandOptions) -> Result<ExpandResult, ExpandError> {
        if phrase.trim().is_empty() {
            return Err(ExpandError::EmptyPhrase);
        }
        let tokens: Vec<&str> = phrase.split_whitespace().collect();
        let mut query = QueryNode::and();
        let mut words = Vec::with_capacity(tokens.len());
        let mut i = 0;

        while i < tokens.len() {
            let token = tokens[i];
            let mut row = vec![ExpandWord::input(token)];
            let mut group = QueryNode::or().named("token");
            let mut partner = None;

            if !is_alphabetic(token) {
                tracing::debug!(token, "passing through non-alphabetic token");
                group.append(token);
            } else {
                let correct = self.spell(token);
                row[0].is_misspelled = !correct;
                let compound = tokens
                    .get(i + 1)
                    .and_then(|next| self.compound_with(token, next).map(|z| (*next, z)));

                match compound {
                    Some((next, merged)) => {
                        tracing::debug!(token, next, merged = %merged, "expanding compound");
                        self.expand_compound(token, correct, next, &merged, &mut row, &mut group);
                        partner = Some(next);
                    }
                    None if correct => self.expand_correct(token, &mut row, &mut group),
                    None => self.expand_misspelled(token, options, &mut row, &mut group),
                }
            }

            query.push(group);
            words.push(row);
            i += 1;
            if let Some(next) = partner {
                let mut second = ExpandWord::input(next);
                second.is_misspelled = !self.spell(next);
                words.push(vec![second]);
                i += 1;
            }
        }

        Ok(ExpandResult {
            original_phrase: phrase.to_string(),
            words,
            query,
        })
    }

    /// `x + y` when it is a known word and neither part is a stop word.
    fn compound_with(&self, x: &str, y: &str) -> Option<String> {
        if !is_alphabetic(y) || self.is_stop_word(x) || self.is_stop_word(y) {
            return None;
        }
        let merged = format!("{x}{y}");
        self.spell(&merged).then_some(merged)
    }

    fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(&word.to_lowercase())
    }

    /// OR-group of every variant of every stem of `word`; the literal word
    /// when the oracle knows no stems.
    fn variants_group(&self, word: &str, name: &str) -> QueryNode {
        let mut group = QueryNode::or().named(name);
        for stem in self.stem(word) {
            group.extend_terms(self.morph(&stem));
        }
        if group.is_empty() {
            group.append(word);
        }
        group.dedup();
        group
    }

    fn expand_compound(
        &self,
        x: &str,
        x_correct: bool,
        y: &str,
        merged: &str,
        row: &mut Vec<ExpandWord>,
        group: &mut QueryNode,
    ) {
        let mut parts = QueryNode::and().named("compound-parts");
        if x_correct {
            parts.push(self.variants_group(x, "first-part"));
        } else {
            parts.append(x);
        }
        if self.spell(y) {
            parts.push(self.variants_group(y, "second-part"));
        } else {
            parts.append(y);
        }
        group.push(parts);

        for stem in self.stem(merged) {
            row.push(ExpandWord::suggestion(&stem.value, merged));
            let mut joined = QueryNode::or().named("compound");
            joined.extend_terms(self.morph(&stem));
            joined.dedup();
            if !joined.is_empty() {
                group.push(joined);
            }
        }
    }

    fn expand_correct(&self, token: &str, row: &mut Vec<ExpandWord>, group: &mut QueryNode) {
        let mut alternatives = QueryNode::or().named("stems");
        alternatives.append(token);
        for stem in self.stem(token) {
            if stem.value != token {
                row.push(ExpandWord::stem(&stem.value, token));
            }
            alternatives.extend_terms(self.morph(&stem));
            alternatives.append(stem.value.clone());
        }
        alternatives.dedup();
        if !alternatives.is_empty() {
            group.push(alternatives);
        }
    }

    fn expand_misspelled(
        &self,
        token: &str,
        options: &ExpandOptions,
        row: &mut Vec<ExpandWord>,
        group: &mut QueryNode,
    ) {
        let suggestions = self.suggest(token);

        // A suggestion differing only in case (a name or abbreviation typed in
        // the wrong case) replaces every other suggestion.
        if options.case_insensitive {
            let folded = token.to_lowercase();
            if let Some(exact) = suggestions.iter().find(|s| s.to_lowercase() == folded) {
                tracing::debug!(token, suggestion = %exact, "using case-insensitive match");
                row.push(ExpandWord::new(
                    ExpandWordType::Suggestion,
                    exact,
                    Some("case-insensitive match".to_string()),
                ));
                group.append(exact.clone());
                for stem in self.stem(exact) {
                    group.extend_terms(self.morph(&stem));
                }
                group.dedup();
                return;
            }
        }

        group.append(token);
        for suggestion in &suggestions {
            let distance = edit_distance(token, suggestion);
            if options.max_edit_distance > 0 && distance > options.max_edit_distance {
                continue;
            }
            row.push(ExpandWord::new(
                ExpandWordType::Suggestion,
                suggestion,
                Some(format!("Levenshtein: {distance}")),
            ));
            group.append(suggestion.clone());
            for stem in self.stem(suggestion) {
                group.extend_terms(self.morph(&stem));
            }
        }
    }
}

/// Levenshtein distance over Unicode scalar values.
pub fn edit_distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

fn is_alphabetic(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_alphabetic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OracleError;
    use crate::query::QueryItem;

    fn analyzer() -> Analyzer<LexiconOracle> {
        Analyzer::sample().expect("sample data loads")
    }

    fn first_group(result: &ExpandResult) -> &QueryNode {
        match &result.query.items()[0] {
            QueryItem::Node(n) => n,
            QueryItem::Term(t) => panic!("expected a group, found term {t}"),
        }
    }

    #[test]
    fn test_empty_phrase_rejected() {
        let a = analyzer();
        assert_eq!(
            a.expand("   ", &ExpandOptions::default()).unwrap_err(),
            ExpandError::EmptyPhrase
        );
        assert!(a.expand("", &ExpandOptions::default()).is_err());
    }

    #[test]
    fn test_non_alphabetic_passthrough() {
        let a = analyzer();
        let result = a.expand_default("2024").unwrap();
        assert_eq!(first_group(&result).terms(), vec!["2024"]);
        assert_eq!(result.words, vec![vec![ExpandWord::input("2024")]]);
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("hest", "hest"), 0);
        assert_eq!(edit_distance("", "hest"), 4);
        assert_eq!(edit_distance("hesteen", "hesten"), 1);
        assert_eq!(edit_distance("sø", "so"), 1);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_stop_words_case_insensitive() {
        let a = analyzer();
        assert!(a.is_stop_word("med"));
        assert!(a.is_stop_word("Mens"));
        assert!(!a.is_stop_word("hest"));
    }

    /// Oracle knowing a fixed word list and suggesting a fixed list.
    struct MockOracle {
        known: &'static [&'static str],
        suggestions: &'static [&'static str],
        fail: bool,
    }

    impl SpellOracle for MockOracle {
        fn spell(&self, word: &str) -> bool {
            self.known.contains(&word)
        }

        fn suggest(&self, word: &str) -> Result<Vec<String>, OracleError> {
            if self.fail {
                return Err(OracleError::Rejected {
                    word: word.to_string(),
                    reason: "all upper case".to_string(),
                });
            }
            Ok(self.suggestions.iter().map(|s| s.to_string()).collect())
        }

        fn stem(&self, word: &str) -> Vec<StemResult> {
            if self.spell(word) {
                vec![StemResult::plain(word)]
            } else {
                Vec::new()
            }
        }
    }

    fn mock(oracle: MockOracle) -> Analyzer<MockOracle> {
        let config = AnalyzerConfig::default();
        let affix = Arc::new(AffixTable::parse(sample::AFFIX).unwrap());
        let dictionary = MorphDictionary::parse(
            sample::DICTIONARY,
            affix,
            Arc::new(config.categories.clone()),
            &config.dictionary,
        )
        .unwrap();
        Analyzer::new(oracle, dictionary, &config)
    }

    #[test]
    fn test_failing_oracle_yields_literal_only() {
        let a = mock(MockOracle {
            known: &["hest"],
            suggestions: &[],
            fail: true,
        });
        let result = a.expand("HSET hest", &ExpandOptions::default()).unwrap();
        assert_eq!(first_group(&result).terms(), vec!["HSET"]);
        assert_eq!(result.words[0].len(), 1);
        assert!(result.words[0][0].is_misspelled);
        assert_eq!(result.words.len(), 2);
        assert!(!result.words[1][0].is_misspelled);
    }

    #[test]
    fn test_degenerate_suggestion_not_in_query() {
        let a = mock(MockOracle {
            known: &["hest"],
            suggestions: &["s'", "hest"],
            fail: false,
        });
        let result = a.expand("hset", &ExpandOptions::default()).unwrap();
        let terms = first_group(&result).terms();
        assert_eq!(terms[..3], ["hset", "hest", "hest"]);
        assert!(!terms.contains(&"s'"));
        assert!(terms.contains(&"hestenes"));
    }

    #[test]
    fn test_eager_config_materializes() {
        let config = AnalyzerConfig {
            eager: true,
            ..AnalyzerConfig::default()
        };
        let a = Analyzer::from_sources(sample::AFFIX, sample::DICTIONARY, &config).unwrap();
        assert!(a.dictionary().contains("hest"));
        assert!(a.spell("hestene"));
    }

    #[test]
    fn test_alphabetic() {
        assert!(is_alphabetic("hest"));
        assert!(is_alphabetic("Æble"));
        assert!(!is_alphabetic("1/2"));
        assert!(!is_alphabetic("e-mail"));
        assert!(!is_alphabetic(""));
    }
}
