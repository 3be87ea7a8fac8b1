//! Rule-cascade part-of-speech classifier.
//!
//! Rules are tried in a fixed priority order and the first match wins, so
//! the classifier is total: every `(headword, gloss)` pair gets a result.
//!
//! | order | signal | POS | confidence |
//! |-------|--------|-----|------------|
//! | 1 | empty headword | other | 0 |
//! | 2 | multi-word / `~` / `/` headword | phrase | 95 |
//! | 3 | function-word list | function | 95 |
//! | 4-5 | explicit gloss tags | tagged | 94 / 90 |
//! | 6 | adverb / adjective headword list | adverb / adjective | 92 / 90 |
//! | 7-10 | dictionary-form ending of the first gloss | varies | 86-78 |
//! | 11-14 | markers anywhere in the gloss | varies | 88-82 |
//! | 15-18 | English suffixes | varies | 80-70 |
//! | 19 | noun-ish gloss markers | noun | 65 |
//! | 20 | fallback | noun | 45 |

use wordbank_types::{ClassificationResult, Evidence, Pos};

use crate::gloss::{
    ends_with_i, ends_with_na, ends_with_ni, ends_with_verb_form, extract_first_gloss,
    has_adjective_marker, has_adverb_marker, has_gerund_marker, has_verbalizer,
    normalize_gloss, parse_explicit_pos_tags,
};
use crate::lexicon::Lexicon;
use crate::normalize::clean_text;

#[derive(Clone, Debug, Default)]
pub struct Classifier {
    lexicon: Lexicon,
}

impl Classifier {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Classify one headword with its gloss. Never fails.
    pub fn infer_pos(&self, headword: &str, gloss: &str) -> ClassificationResult {
        let word = clean_text(headword).to_lowercase();
        let meaning = normalize_gloss(gloss);
        let first = extract_first_gloss(&meaning);
        let lex = &self.lexicon;

        if word.is_empty() {
            return result(Pos::Other, 0, Evidence::EmptyWord);
        }
        if is_phrase_headword(&word) {
            return result(Pos::Phrase, 95, Evidence::PhrasePattern);
        }
        if lex.is_function_word(&word) {
            return result(Pos::Function, 95, Evidence::FunctionWordList);
        }

        // A leading noun tag among several is ambiguous; fall through.
        let tags = parse_explicit_pos_tags(&meaning);
        match tags.as_slice() {
            [only] => return result(*only, 94, Evidence::ExplicitTag(*only)),
            [lead, _, ..] if *lead != Pos::Noun => {
                return result(*lead, 90, Evidence::ExplicitPrimaryTag(*lead));
            }
            _ => {}
        }

        if lex.is_adverb_headword(&word) {
            return result(Pos::Adverb, 92, Evidence::HeadwordAdverbList);
        }
        if lex.is_adjective_headword(&word) {
            return result(Pos::Adjective, 90, Evidence::HeadwordAdjectiveList);
        }

        if !first.is_empty() {
            if ends_with_na(&first) {
                return result(Pos::Adjective, 86, Evidence::MeaningDictFormAdjective);
            }
            if ends_with_ni(&first) {
                return result(Pos::Adverb, 83, Evidence::MeaningDictFormAdverb);
            }
            if ends_with_verb_form(&first) {
                return result(Pos::Verb, 84, Evidence::MeaningDictFormVerb);
            }
            if ends_with_i(&first)
                && !lex
                    .adjective_i_exceptions
                    .iter()
                    .any(|noun| first.ends_with(noun.as_str()))
            {
                return result(Pos::Adjective, 78, Evidence::MeaningDictFormAdjective);
            }
        }

        if has_gerund_marker(&meaning) {
            return result(Pos::Noun, 82, Evidence::MeaningGerundNoun);
        }
        if has_verbalizer(&meaning) {
            return result(Pos::Verb, 88, Evidence::MeaningContainsSuru);
        }
        if has_adjective_marker(&meaning) {
            return result(Pos::Adjective, 84, Evidence::MeaningAdjectiveMarker);
        }
        if has_adverb_marker(&meaning) {
            return result(Pos::Adverb, 82, Evidence::MeaningAdverbMarker);
        }

        if word.ends_with("ly") && !lex.adverb_exceptions.contains(&word) {
            return result(Pos::Adverb, 80, Evidence::SuffixLy);
        }
        if ends_with_any(&word, &lex.noun_suffixes) {
            return result(Pos::Noun, 76, Evidence::NounSuffix);
        }
        if ends_with_any(&word, &lex.adjective_suffixes)
            || (first.is_empty() && ends_with_any(&word, &lex.bare_adjective_suffixes))
        {
            return result(Pos::Adjective, 74, Evidence::AdjectiveSuffix);
        }
        if word.chars().count() >= lex.verb_suffix_min_len
            && !lex.verb_suffix_exceptions.contains(&word)
            && ends_with_any(&word, &lex.verb_suffixes)
        {
            return result(Pos::Verb, 70, Evidence::VerbSuffix);
        }

        if lex
            .noun_gloss_markers
            .iter()
            .any(|marker| meaning.contains(marker.as_str()))
        {
            return result(Pos::Noun, 65, Evidence::MeaningNounMarker);
        }

        result(Pos::Noun, 45, Evidence::FallbackNoun)
    }
}

/// Multi-word, `~`-templated or slash-separated headwords are phrases.
pub fn is_phrase_headword(word: &str) -> bool {
    let normalized = clean_text(word);
    !normalized.is_empty() && normalized.contains([' ', '~', '/'])
}

fn ends_with_any(word: &str, suffixes: &[String]) -> bool {
    suffixes.iter().any(|suffix| word.ends_with(suffix.as_str()))
}

fn result(pos: Pos, confidence: u8, evidence: Evidence) -> ClassificationResult {
    ClassificationResult {
        pos,
        confidence,
        evidence,
    }
}
