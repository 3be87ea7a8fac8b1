use std::fs;

use tempfile::tempdir;
use wordbank_pos::{Classifier, Lexicon};
use wordbank_types::Pos;

#[test]
fn override_files_replace_only_their_list() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("adverb_headwords.txt"),
        "# house adverbs\nAnyway\n\nsomewhat\n",
    )
    .expect("write adverbs");
    fs::write(dir.path().join("verb_suffix_exceptions.txt"), "listen\n").expect("write exceptions");

    let lexicon = Lexicon::load(dir.path()).expect("load lexicon");
    assert!(lexicon.is_adverb_headword("anyway"));
    assert!(lexicon.is_adverb_headword("somewhat"));
    assert!(!lexicon.is_adverb_headword("often"));
    assert_eq!(lexicon.adverb_headwords.len(), 2);
    // Lists without a file keep their defaults.
    assert!(lexicon.is_function_word("the"));
    assert!(lexicon.is_adjective_headword("afraid"));

    let classifier = Classifier::new(lexicon);
    let anyway = classifier.infer_pos("anyway", "とにかく");
    assert_eq!((anyway.pos, anyway.confidence), (Pos::Adverb, 92));

    let listen = classifier.infer_pos("listen", "");
    assert_eq!(listen.pos, Pos::Noun);
    let default_listen = Classifier::default().infer_pos("listen", "");
    assert_eq!((default_listen.pos, default_listen.confidence), (Pos::Verb, 70));
}

#[test]
fn unreadable_word_list_is_an_error() {
    let dir = tempdir().expect("tempdir");
    // A directory where a file is expected cannot be read line by line.
    fs::create_dir(dir.path().join("function_words.txt")).expect("mkdir");
    let err = Lexicon::load(dir.path()).expect_err("directory is not a word list");
    assert!(format!("{err:#}").contains("function_words.txt"));
}

#[test]
fn documented_priority_examples_hold_with_default_lexicon() {
    let classifier = Classifier::default();
    let cases = [
        ("look after", "", Pos::Phrase, 95),
        ("quickly", "", Pos::Adverb, 80),
        ("happy", "", Pos::Adjective, 74),
    ];
    for (headword, gloss, pos, confidence) in cases {
        let r = classifier.infer_pos(headword, gloss);
        assert_eq!((r.pos, r.confidence), (pos, confidence), "{headword}");
    }
}
