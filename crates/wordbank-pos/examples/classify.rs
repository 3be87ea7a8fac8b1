use std::env;

use anyhow::{Result, bail};
use wordbank_pos::{Classifier, Lexicon, extract_first_gloss, normalize_headword};

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let Some(headword) = args.next() else {
        bail!("usage: cargo run -p wordbank-pos --example classify -- <headword> [gloss] [lexicon-dir]");
    };
    let gloss = args.next().unwrap_or_default();
    let lexicon = match args.next() {
        Some(dir) => Lexicon::load(&dir)?,
        None => Lexicon::default(),
    };
    if args.next().is_some() {
        bail!("too many arguments");
    }

    let classifier = Classifier::new(lexicon);
    let result = classifier.infer_pos(&headword, &gloss);

    println!("headword:    {headword}");
    println!("normalized:  {}", normalize_headword(&headword));
    println!("first gloss: {}", extract_first_gloss(&gloss));
    println!(
        "pos:         {} ({}) confidence {} via {}",
        result.pos,
        result.pos.label_ja(),
        result.confidence,
        result.evidence
    );
    Ok(())
}
