//! Spell-check oracle seam and a lexicon-backed implementation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::dictionary::MorphDictionary;
use crate::error::OracleError;
use crate::types::StemResult;

/// Raw single-word primitives the expansion algorithm relies on.
pub trait SpellOracle {
    fn spell(&self, word: &str) -> bool;

    /// Suggestions for a misspelled word. May fail for individual words.
    fn suggest(&self, word: &str) -> Result<Vec<String>, OracleError>;

    /// Stems of a correctly spelled word, each with the compound prefix the
    /// oracle could not decompose.
    fn stem(&self, word: &str) -> Vec<StemResult>;
}

impl<T: SpellOracle + ?Sized> SpellOracle for &T {
    fn spell(&self, word: &str) -> bool {
        (**self).spell(word)
    }

    fn suggest(&self, word: &str) -> Result<Vec<String>, OracleError> {
        (**self).suggest(word)
    }

    fn stem(&self, word: &str) -> Vec<StemResult> {
        (**self).stem(word)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    /// Minimum length in characters of each part of a compound.
    pub min_compound_part: usize,
    pub max_suggestions: usize,
    /// Known forms further than this from the input are not suggested, unless
    /// they differ from it only in case.
    pub max_suggestion_distance: usize,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            min_compound_part: 3,
            max_suggestions: 10,
            max_suggestion_distance: 2,
        }
    }
}

/// An oracle answering from the surface forms of a loaded dictionary.
///
/// Words are known if they are a surface form of some entry, possibly after
/// Hunspell-style case folding (`Hest`, `HEST`), or if they split into a known
/// head and a known tail, optionally joined by a linking element.
#[derive(Debug, Clone)]
pub struct LexiconOracle {
    /// Surface form to the sorted stems producing it.
    forms: HashMap<String, Vec<String>>,
    linking_elements: Vec<String>,
    config: LexiconConfig,
}

impl LexiconOracle {
    /// Index every surface form of `dictionary`.
    pub fn new(dictionary: &MorphDictionary, config: LexiconConfig) -> Self {
        let mut forms: HashMap<String, Vec<String>> = HashMap::new();
        for item in dictionary.items() {
            for variant in item.variants() {
                let stems = forms.entry(variant.value.clone()).or_default();
                if !stems.iter().any(|s| s == item.stem()) {
                    stems.push(item.stem().to_string());
                }
            }
        }
        // HashMap iteration order is arbitrary; keep stems deterministic.
        for stems in forms.values_mut() {
            stems.sort();
        }
        let mut linking_elements: Vec<String> =
            dictionary.linking_elements().map(str::to_string).collect();
        linking_elements.sort();

        tracing::info!(forms = forms.len(), "built lexicon oracle");
        Self {
            forms,
            linking_elements,
            config,
        }
    }

    /// The first casing variant of `word` that is a known form.
    fn known_form(&self, word: &str) -> Option<String> {
        casings(word).into_iter().find(|w| self.forms.contains_key(w))
    }

    /// Split `word` into a head and a known tail form, preferring the longest tail.
    ///
    /// Every prefix of `word` is classified once, shortest first, so the search
    /// is quadratic in the word length however many splits fail.
    fn split_compound(&self, word: &str) -> Option<(String, String)> {
        let min = self.config.min_compound_part.max(1);
        // Byte offset of every char boundary, indexed by char count.
        let bounds: Vec<usize> = word
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(word.len()))
            .collect();
        // spellable[n]: the first n chars are a known form or a compound.
        let mut spellable = vec![false; bounds.len()];
        for end in 1..bounds.len() - 1 {
            spellable[end] = self.known_form(&word[..bounds[end]]).is_some()
                || self.tail_split(word, &bounds, &spellable, end, min).is_some();
        }

        let at = self.tail_split(word, &bounds, &spellable, bounds.len() - 1, min)?;
        let (head, tail) = word.split_at(bounds[at]);
        Some((head.to_string(), tail.to_string()))
    }

    /// Smallest char count `at` where chars `at..end` are a known form and chars
    /// `..at` are a compound head. Only reads `spellable` below `end`.
    fn tail_split(
        &self,
        word: &str,
        bounds: &[usize],
        spellable: &[bool],
        end: usize,
        min: usize,
    ) -> Option<usize> {
        let last = end.checked_sub(min)?;
        (min..=last).find(|&at| {
            self.forms.contains_key(&word[bounds[at]..bounds[end]])
                && self.is_compound_head(&word[..bounds[at]], at, spellable, min)
        })
    }

    /// A head is a spellable prefix, optionally followed by a linking element.
    fn is_compound_head(&self, head: &str, chars: usize, spellable: &[bool], min: usize) -> bool {
        if chars >= min && spellable[chars] {
            return true;
        }
        self.linking_elements.iter().any(|link| {
            head.strip_suffix(link.as_str()).is_some_and(|rest| {
                let n = rest.chars().count();
                n >= min && spellable[n]
            })
        })
    }
}

impl SpellOracle for LexiconOracle {
    fn spell(&self, word: &str) -> bool {
        self.known_form(word).is_some()
            || casings(word)
                .iter()
                .any(|w| self.split_compound(w).is_some())
    }

    fn suggest(&self, word: &str) -> Result<Vec<String>, OracleError> {
        if word.trim().is_empty() {
            return Err(OracleError::EmptyInput);
        }
        let folded = word.to_lowercase();
        let mut ranked: Vec<(bool, usize, &str)> = self
            .forms
            .keys()
            .filter(|form| form.as_str() != word)
            .filter_map(|form| {
                let case_match = form.to_lowercase() == folded;
                let distance = strsim::levenshtein(word, form);
                (case_match || distance <= self.config.max_suggestion_distance)
                    .then(|| (!case_match, distance, form.as_str()))
            })
            .collect();
        ranked.sort();
        Ok(ranked
            .into_iter()
            .take(self.config.max_suggestions)
            .map(|(_, _, form)| form.to_string())
            .collect())
    }

    fn stem(&self, word: &str) -> Vec<StemResult> {
        if let Some(form) = self.known_form(word) {
            return self.forms[&form].iter().map(StemResult::plain).collect();
        }
        for casing in casings(word) {
            if let Some((head, tail)) = self.split_compound(&casing) {
                return self.forms[&tail]
                    .iter()
                    .map(|stem| StemResult::new(stem.clone(), head.clone()))
                    .collect();
            }
        }
        Vec::new()
    }
}

/// `word`, then its lower-cased form when capitalised, then capitalised and
/// lower-cased forms when all upper case.
fn casings(word: &str) -> Vec<String> {
    let mut out = vec![word.to_string()];
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return out;
    };
    let rest: String = chars.collect();
    let has_lower = word.chars().any(char::is_lowercase);

    if first.is_uppercase() && has_lower && !rest.chars().any(char::is_uppercase) {
        out.push(word.to_lowercase());
    } else if !has_lower && word.chars().any(char::is_uppercase) && !rest.is_empty() {
        out.push(format!("{first}{}", rest.to_lowercase()));
        out.push(word.to_lowercase());
    }
    out
}
