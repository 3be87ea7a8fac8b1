//! Heuristic part-of-speech classification for wordbank entries.
//!
//! The crate has three layers:
//! 1. [`normalize`]: canonical headword / book keys and small text helpers.
//! 2. [`gloss`]: first-gloss extraction, explicit `【名】`-style tags and the
//!    Japanese inflection markers.
//! 3. [`Classifier`]: a first-match-wins rule cascade over an injectable
//!    [`Lexicon`].
//!
//! # Example
//! ```rust
//! use wordbank_pos::{Classifier, normalize_headword};
//! use wordbank_types::Pos;
//!
//! let classifier = Classifier::default();
//! let r = classifier.infer_pos("quickly", "");
//! assert_eq!((r.pos, r.confidence), (Pos::Adverb, 80));
//! assert_eq!(normalize_headword("Look  After!"), "look after");
//! ```
//!
//! For a runnable demo, see `cargo run -p wordbank-pos --example classify -- <headword> [gloss]`.

pub mod classify;
pub mod gloss;
pub mod lexicon;
pub mod normalize;

pub use classify::{Classifier, is_phrase_headword};
pub use gloss::{
    extract_first_gloss, gloss_marker_pos, normalize_gloss, parse_explicit_pos_tags,
    surface_pos_hints,
};
pub use lexicon::Lexicon;
pub use normalize::{
    MISSING_TOKENS, clean_text, derive_word_family, has_ascii_letter, has_japanese,
    is_missing_token, normalize_book_name, normalize_headword, parse_slot_number, sanitize_short,
};
