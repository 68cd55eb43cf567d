use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::affix::{parse_flag_list, AffixTable};
use crate::category::CategoryRules;
use crate::error::LoadError;
use crate::types::{Category, Flag, StemResult, Variant};

/// Flag marking a compounding infix ("fugeelement") rather than a word.
const LINKING_ELEMENT_FLAG: Flag = Flag(941);

/// Settings for reading a word list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryOptions {
    /// Entries whose first flag is this code are linking elements.
    pub linking_element_flag: Flag,
    /// Exact lines to ignore (known-bad lines in third-party word lists).
    pub skip_lines: Vec<String>,
}

impl Default for DictionaryOptions {
    fn default() -> Self {
        Self {
            linking_element_flag: LINKING_ELEMENT_FLAG,
            skip_lines: Vec::new(),
        }
    }
}

/// One word-list entry. Variants and category are computed on first access
/// and cached.
#[derive(Debug)]
pub struct DictionaryItem {
    stem: String,
    flags: Vec<Flag>,
    affix: Arc<AffixTable>,
    categories: Arc<CategoryRules>,
    expansion: OnceCell<Expansion>,
}

#[derive(Debug)]
struct Expansion {
    variants: Vec<Variant>,
    category: Category,
}

impl DictionaryItem {
    pub fn new(
        stem: impl Into<String>,
        flags: Vec<Flag>,
        affix: Arc<AffixTable>,
        categories: Arc<CategoryRules>,
    ) -> Self {
        Self {
            stem: stem.into(),
            flags,
            affix,
            categories,
            expansion: OnceCell::new(),
        }
    }

    /// The headword as written in the word list.
    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    /// The stem itself followed by every form its flags' rule sets produce.
    pub fn variants(&self) -> &[Variant] {
        &self.expansion().variants
    }

    /// Category from the flags, overridden by any variant tag that forces one.
    pub fn category(&self) -> Category {
        self.expansion().category
    }

    fn expansion(&self) -> &Expansion {
        self.expansion.get_or_init(|| {
            let mut variants = vec![Variant::new(self.stem.clone(), "")];
            let mut category = self.categories.classify(&self.flags);
            for set in self.flags.iter().filter_map(|f| self.affix.get(*f)) {
                for variant in set.apply(&self.stem) {
                    if let Some(forced) = self.categories.for_tag(variant.tag()) {
                        category = forced;
                    }
                    variants.push(variant);
                }
            }
            Expansion { variants, category }
        })
    }
}

/// Word list keyed by stem. Homographs share a key and keep file order.
#[derive(Debug)]
pub struct MorphDictionary {
    entries: HashMap<String, Vec<DictionaryItem>>,
    linking_elements: HashSet<String>,
}

impl MorphDictionary {
    /// Parse a word list: a header line (entry count, ignored) followed by
    /// `word[/flag,flag,...] [xx:metadata ...]` lines. Any malformed line fails
    /// the whole load.
    pub fn parse(
        raw: &str,
        affix: Arc<AffixTable>,
        categories: Arc<CategoryRules>,
        options: &DictionaryOptions,
    ) -> Result<Self, LoadError> {
        let mut entries: HashMap<String, Vec<DictionaryItem>> = HashMap::new();
        let mut linking_elements = HashSet::new();

        for (index, line) in raw.lines().enumerate().skip(1) {
            let line = line.trim_end();
            if line.trim().is_empty() || options.skip_lines.iter().any(|s| s == line) {
                continue;
            }
            let (word, flags) = parse_entry(line).map_err(|reason| LoadError::DictionaryLine {
                line: index + 1,
                content: line.to_string(),
                reason,
            })?;

            if flags.first() == Some(&options.linking_element_flag) {
                linking_elements.insert(word);
                continue;
            }

            let item = DictionaryItem::new(word, flags, affix.clone(), categories.clone());
            entries
                .entry(item.stem.clone())
                .or_default()
                .push(item);
        }

        tracing::info!(
            stems = entries.len(),
            linking_elements = linking_elements.len(),
            "loaded dictionary"
        );
        Ok(Self {
            entries,
            linking_elements,
        })
    }

    /// All entries for a stem.
    pub fn lookup(&self, stem: &str) -> Option<&[DictionaryItem]> {
        self.entries.get(stem).map(|v| v.as_slice())
    }

    pub fn contains(&self, stem: &str) -> bool {
        self.entries.contains_key(stem)
    }

    pub fn is_linking_element(&self, word: &str) -> bool {
        self.linking_elements.contains(word)
    }

    pub fn linking_elements(&self) -> impl Iterator<Item = &str> {
        self.linking_elements.iter().map(String::as_str)
    }

    pub fn items(&self) -> impl Iterator<Item = &DictionaryItem> {
        self.entries.values().flatten()
    }

    /// Number of distinct stems.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compute every item's variants now instead of on first access.
    pub fn materialize(&self) {
        for item in self.items() {
            item.variants();
        }
    }

    /// Every surface form of `stem`, with its compound prefix re-attached. The
    /// stem's own value is always included; duplicates keep their first position.
    pub fn morph(&self, stem: &StemResult) -> Vec<String> {
        let mut forms: Vec<String> = self
            .lookup(&stem.stem)
            .into_iter()
            .flatten()
            .flat_map(|item| item.variants())
            .map(|v| format!("{}{}", stem.prefix, v.value))
            .collect();
        forms.push(stem.value.clone());

        let mut seen = HashSet::new();
        forms.retain(|f| seen.insert(f.clone()));
        forms
    }
}

/// Split a data line into its word and flags, dropping metadata fields.
fn parse_entry(line: &str) -> Result<(String, Vec<Flag>), String> {
    let (word, rest) = match line.strip_prefix('"') {
        Some(quoted) => {
            let close = quoted
                .find('"')
                .ok_or_else(|| "unterminated quoted word".to_string())?;
            (&quoted[..close], &quoted[close + 1..])
        }
        None => {
            let end = line
                .find(|c: char| c == '/' || c.is_whitespace())
                .unwrap_or(line.len());
            (&line[..end], &line[end..])
        }
    };
    if word.is_empty() {
        return Err("empty word".to_string());
    }

    let (flag_field, metadata) = match rest.strip_prefix('/') {
        Some(after) => {
            let end = after.find(char::is_whitespace).unwrap_or(after.len());
            (&after[..end], &after[end..])
        }
        None => ("", rest),
    };
    if let Some(token) = metadata.split_whitespace().find(|t| !is_metadata_tag(t)) {
        return Err(format!("unexpected text `{token}`"));
    }

    let flags = parse_flag_list(&flag_field.replace('/', ","))?;
    Ok((word.to_string(), flags))
}

/// Morphological fields like `po:noun` or `st:hest`.
fn is_metadata_tag(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() > 3
        && bytes[0].is_ascii_lowercase()
        && bytes[1].is_ascii_lowercase()
        && bytes[2] == b':'
}

#[cfg(test)]
mod tests {
    use super::*;

    const AFFIX: &str = "\
SFX 73 Y 3
SFX 73 0 en . +BESTEMT_ENTAL
SFX 73 0 ens . +BESTEMT_ENTAL+GENITIV
SFX 73 0 s [^s] +GENITIV
SFX 120 Y 1
SFX 120 0 s [^s] +GENITIV
";

    fn load(dic: &str) -> Result<MorphDictionary, LoadError> {
        let affix = Arc::new(AffixTable::parse(AFFIX).unwrap());
        MorphDictionary::parse(
            dic,
            affix,
            Arc::new(CategoryRules::default()),
            &DictionaryOptions::default(),
        )
    }

    #[test]
    fn test_parse_entries() {
        let dict = load("4\nhest/73\nog\nbil/73 po:noun st:bil\n\"1/2\"/73\n").unwrap();
        assert_eq!(dict.len(), 4);
        assert_eq!(dict.lookup("hest").unwrap()[0].flags(), &[Flag(73)]);
        assert!(dict.lookup("og").unwrap()[0].flags().is_empty());
        assert!(dict.contains("bil"));
        assert!(dict.contains("1/2"));
        assert!(dict.lookup("zzzz").is_none());
    }

    #[test]
    fn test_homographs_keep_file_order() {
        let dict = load("2\nfly/73\nfly/120\n").unwrap();
        let items = dict.lookup("fly").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].flags(), &[Flag(73)]);
        assert_eq!(items[1].flags(), &[Flag(120)]);
    }

    #[test]
    fn test_linking_element_excluded() {
        let dict = load("2\ns/941\nhest/73\n").unwrap();
        assert!(!dict.contains("s"));
        assert!(dict.is_linking_element("s"));
        // Only the first flag marks a linking element.
        let dict = load("1\ns/73,941\n").unwrap();
        assert!(dict.contains("s"));
    }

    #[test]
    fn test_bad_line_fails_whole_load() {
        let err = load("3\nhest/73\nbil/7x\nog\n").unwrap_err();
        match err {
            LoadError::DictionaryLine { line, content, .. } => {
                assert_eq!(line, 3);
                assert_eq!(content, "bil/7x");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(load("1\nlægge, lægger, lægges\n").is_err());
    }

    #[test]
    fn test_skip_lines() {
        let affix = Arc::new(AffixTable::parse(AFFIX).unwrap());
        let options = DictionaryOptions {
            skip_lines: vec!["lægge, lægger, lægges".to_string()],
            ..DictionaryOptions::default()
        };
        let dict = MorphDictionary::parse(
            "2\nlægge, lægger, lægges\nhest/73\n",
            affix,
            Arc::new(CategoryRules::default()),
            &options,
        )
        .unwrap();
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn test_variants_start_with_stem() {
        let dict = load("1\nhest/73\n").unwrap();
        let item = &dict.lookup("hest").unwrap()[0];
        let variants = item.variants();
        assert_eq!(variants[0], Variant::new("hest", ""));
        let values: Vec<&str> = variants.iter().map(|v| v.value.as_str()).collect();
        assert_eq!(values, vec!["hest", "hesten", "hestens", "hests"]);
        // Cached: a second read returns the same slice.
        assert!(std::ptr::eq(item.variants(), variants));
    }

    #[test]
    fn test_category_from_tag() {
        let dict = load("2\nhest/73\nlærer/120\nog\n").unwrap();
        assert_eq!(dict.lookup("hest").unwrap()[0].category(), Category::Noun);
        // 120 is not a noun flag, but its genitive rule forces Noun.
        assert_eq!(dict.lookup("lærer").unwrap()[0].category(), Category::Noun);
        assert_eq!(dict.lookup("og").unwrap()[0].category(), Category::Unknown);
    }

    #[test]
    fn test_morph_with_prefix() {
        let dict = load("1\nhest/73\n").unwrap();
        let forms = dict.morph(&StemResult::new("hest", "ride"));
        assert_eq!(
            forms,
            vec!["ridehest", "ridehesten", "ridehestens", "ridehests"]
        );
        // Unknown stems fall back to the stem value.
        assert_eq!(dict.morph(&StemResult::plain("zzzz")), vec!["zzzz"]);
    }
}
