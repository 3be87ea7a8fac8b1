//! Word lists and suffix tables consulted by the classifier and by the
//! confirmation rules downstream.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const FUNCTION_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "if", "because", "although", "however", "to", "of",
    "in", "on", "at", "for", "from", "with", "by", "about", "under", "over", "between",
    "through", "during", "without", "before", "after", "into", "upon", "as", "that", "this",
    "these", "those", "which", "who", "whom", "whose", "what", "when", "where", "why", "how",
    // pronouns, determiners and quantifiers
    "i", "me", "my", "mine", "myself", "you", "your", "yours", "yourself", "yourselves", "he",
    "him", "his", "himself", "she", "her", "hers", "herself", "it", "its", "itself", "we", "us",
    "our", "ours", "ourselves", "they", "them", "their", "theirs", "themselves", "any", "some",
    "many", "much", "all", "another", "either", "neither", "both", "each", "few", "more", "most",
    "less",
];

const ADVERB_HEADWORDS: &[&str] = &[
    "almost", "already", "also", "always", "away", "ever", "hardly", "here", "however", "just",
    "maybe", "never", "often", "once", "perhaps", "quite", "rather", "really", "simply",
    "sometimes", "soon", "still", "there", "therefore", "thus", "together", "tomorrow", "too",
    "twice", "usually", "very", "well", "yesterday", "yet",
];

const ADJECTIVE_HEADWORDS: &[&str] = &[
    "afraid", "alive", "asleep", "awake", "glad", "likely", "unable", "available", "responsible",
];

const NOUN_SUFFIXES: &[&str] = &[
    "tion", "sion", "ment", "ness", "ity", "ence", "ance", "ship", "hood", "ism", "ist", "er",
    "or", "age",
];

const ADJECTIVE_SUFFIXES: &[&str] = &[
    "ous", "ful", "ive", "al", "able", "ible", "ic", "ical", "less", "ish",
];

const BARE_ADJECTIVE_SUFFIXES: &[&str] = &["y"];

const VERB_SUFFIXES: &[&str] = &["ate", "ify", "ise", "ize", "en"];

const ADVERB_EXCEPTIONS: &[&str] = &[
    "friendly", "likely", "lively", "lonely", "lovely", "silly", "ugly", "early", "costly",
];

const VERB_SUFFIX_EXCEPTIONS: &[&str] = &[
    "date", "state", "rate", "late", "plate", "mate", "private", "climate",
];

const ADJECTIVE_I_EXCEPTIONS: &[&str] = &["祝い", "思い", "違い", "戦い", "争い", "願い", "祈り"];

const NOUN_GLOSS_MARKERS: &[&str] = &["人", "物", "こと", "状態", "行為", "性", "力"];

/// Injectable classification vocabulary. `Default` carries the production
/// tables; [`Lexicon::load`] overlays word lists found in a directory.
#[derive(Clone, Debug)]
pub struct Lexicon {
    pub function_words: HashSet<String>,
    pub adverb_headwords: HashSet<String>,
    pub adjective_headwords: HashSet<String>,
    pub noun_suffixes: Vec<String>,
    pub adjective_suffixes: Vec<String>,
    /// Adjective suffixes trusted only when the gloss has no first segment;
    /// `-y` nouns with a plain gloss stay nouns.
    pub bare_adjective_suffixes: Vec<String>,
    pub verb_suffixes: Vec<String>,
    pub adverb_exceptions: HashSet<String>,
    pub verb_suffix_exceptions: HashSet<String>,
    /// Minimum headword length (in characters) before the verb-suffix rule applies.
    pub verb_suffix_min_len: usize,
    /// `…い` glosses that are nouns rather than i-adjectives.
    pub adjective_i_exceptions: Vec<String>,
    pub noun_gloss_markers: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            function_words: to_set(FUNCTION_WORDS),
            adverb_headwords: to_set(ADVERB_HEADWORDS),
            adjective_headwords: to_set(ADJECTIVE_HEADWORDS),
            noun_suffixes: to_vec(NOUN_SUFFIXES),
            adjective_suffixes: to_vec(ADJECTIVE_SUFFIXES),
            bare_adjective_suffixes: to_vec(BARE_ADJECTIVE_SUFFIXES),
            verb_suffixes: to_vec(VERB_SUFFIXES),
            adverb_exceptions: to_set(ADVERB_EXCEPTIONS),
            verb_suffix_exceptions: to_set(VERB_SUFFIX_EXCEPTIONS),
            verb_suffix_min_len: 6,
            adjective_i_exceptions: to_vec(ADJECTIVE_I_EXCEPTIONS),
            noun_gloss_markers: to_vec(NOUN_GLOSS_MARKERS),
        }
    }
}

impl Lexicon {
    /// Start from the defaults and replace any list that has a file in `dir`:
    /// `function_words.txt`, `adverb_headwords.txt`, `adjective_headwords.txt`,
    /// `adverb_exceptions.txt`, `verb_suffix_exceptions.txt`.
    ///
    /// Files are optional; missing ones keep the built-in table. One word per
    /// line, blank lines and `#` comments ignored.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut lexicon = Self::default();
        if let Some(words) = load_word_list(dir.join("function_words.txt"))? {
            lexicon.function_words = words;
        }
        if let Some(words) = load_word_list(dir.join("adverb_headwords.txt"))? {
            lexicon.adverb_headwords = words;
        }
        if let Some(words) = load_word_list(dir.join("adjective_headwords.txt"))? {
            lexicon.adjective_headwords = words;
        }
        if let Some(words) = load_word_list(dir.join("adverb_exceptions.txt"))? {
            lexicon.adverb_exceptions = words;
        }
        if let Some(words) = load_word_list(dir.join("verb_suffix_exceptions.txt"))? {
            lexicon.verb_suffix_exceptions = words;
        }
        Ok(lexicon)
    }

    pub fn is_function_word(&self, word: &str) -> bool {
        self.function_words.contains(word)
    }

    pub fn is_adverb_headword(&self, word: &str) -> bool {
        self.adverb_headwords.contains(word)
    }

    pub fn is_adjective_headword(&self, word: &str) -> bool {
        self.adjective_headwords.contains(word)
    }
}

fn load_word_list(path: PathBuf) -> Result<Option<HashSet<String>>> {
    if !path.exists() {
        return Ok(None);
    }
    let file = File::open(&path).with_context(|| format!("open word list {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut words = HashSet::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line =
            line.with_context(|| format!("read line {} in {}", lineno + 1, path.display()))?;
        let word = line.trim();
        if word.is_empty() || word.starts_with('#') {
            continue;
        }
        words.insert(word.to_lowercase());
    }
    Ok(Some(words))
}

fn to_set(words: &[&str]) -> HashSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn to_vec(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_production_tables() {
        let lex = Lexicon::default();
        assert!(lex.is_function_word("the"));
        assert!(lex.is_function_word("themselves"));
        assert!(lex.is_adverb_headword("however"));
        assert!(lex.is_adjective_headword("likely"));
        assert!(lex.adverb_exceptions.contains("friendly"));
        assert!(lex.verb_suffix_exceptions.contains("climate"));
        assert_eq!(lex.verb_suffix_min_len, 6);
    }

    #[test]
    fn missing_dir_keeps_defaults() {
        let lex = Lexicon::load("/nonexistent/lexicon/dir").unwrap();
        assert_eq!(lex.function_words, to_set(FUNCTION_WORDS));
    }
}
