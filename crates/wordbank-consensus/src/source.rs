//! Source rows as they arrive from extraction, and their conversion into
//! scored [`SourceRecord`]s.

use serde::{Deserialize, Serialize};
use wordbank_pos::{
    clean_text, has_ascii_letter, has_japanese, is_missing_token, normalize_book_name,
    parse_slot_number,
};
use wordbank_types::SourceRecord;

/// Slot number as found in the wild: `12`, `12.0` or `"12"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotValue {
    Int(u64),
    Float(f64),
    Text(String),
}

impl SlotValue {
    pub fn parse(&self) -> Option<u32> {
        match self {
            SlotValue::Int(n) => u32::try_from(*n).ok(),
            SlotValue::Float(f) if f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64 => {
                Some(*f as u32)
            }
            SlotValue::Float(_) => None,
            SlotValue::Text(text) => parse_slot_number(text),
        }
    }
}

/// One extracted `(book, number) -> (headword, gloss)` row before scoring.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceRow {
    pub book: String,
    pub number: SlotValue,
    pub headword: String,
    pub gloss: String,
    #[serde(default)]
    pub source_path: String,
    #[serde(default)]
    pub source_label: String,
    #[serde(default)]
    pub source_priority: u8,
    #[serde(default)]
    pub method: String,
}

impl SourceRow {
    /// Score the row; `None` when the slot number does not parse.
    pub fn into_record(self) -> Option<SourceRecord> {
        let number = self.number.parse()?;
        let book = clean_text(&self.book);
        let headword = clean_text(&self.headword);
        let gloss = clean_text(&self.gloss);
        let quality = quality_score(&book, &headword, &gloss, self.source_priority);
        Some(SourceRecord {
            book_norm: normalize_book_name(&book),
            book,
            number,
            headword,
            gloss,
            source_path: self.source_path,
            source_label: self.source_label,
            source_priority: self.source_priority,
            method: self.method,
            quality,
        })
    }
}

/// Classical-Japanese books carry Japanese headwords and never enter the
/// English wordbank.
pub fn is_classical_book(book: &str) -> bool {
    book.contains("古文") || book.contains("古典")
}

/// Heuristic trust score for one candidate row; higher is better.
pub fn quality_score(book: &str, headword: &str, gloss: &str, source_priority: u8) -> i32 {
    let headword_missing = is_missing_token(headword);
    let gloss_missing = is_missing_token(gloss);
    let mut score = 100 - 4 * i32::from(source_priority);

    if !headword_missing {
        score += 8;
    }
    if !gloss_missing {
        score += 8;
    }
    if has_japanese(gloss) {
        score += 10;
    }

    if is_classical_book(book) {
        if has_japanese(headword) {
            score += 8;
        } else if has_ascii_letter(headword) {
            score -= 12;
        }
    } else if has_ascii_letter(headword) {
        score += 12;
    } else {
        score -= 20;
    }

    if headword.chars().count() > 80 {
        score -= 8;
    }
    if gloss.chars().count() > 160 {
        score -= 6;
    }
    if headword_missing || gloss_missing {
        score -= 40;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(number: SlotValue) -> SourceRow {
        SourceRow {
            book: "DUO3.0".into(),
            number,
            headword: " run ".into(),
            gloss: "走る".into(),
            source_path: "duo.jsonl".into(),
            source_label: "duo".into(),
            source_priority: 1,
            method: "pdf_line".into(),
        }
    }

    #[test]
    fn slot_values_parse_like_integers() {
        assert_eq!(SlotValue::Int(12).parse(), Some(12));
        assert_eq!(SlotValue::Float(12.0).parse(), Some(12));
        assert_eq!(SlotValue::Float(12.5).parse(), None);
        assert_eq!(SlotValue::Text("12.0".into()).parse(), Some(12));
        assert_eq!(SlotValue::Text("twelve".into()).parse(), None);
    }

    #[test]
    fn rows_without_slot_numbers_are_dropped() {
        assert!(row(SlotValue::Text("".into())).into_record().is_none());
        let rec = row(SlotValue::Int(7)).into_record().unwrap();
        assert_eq!(rec.number, 7);
        assert_eq!(rec.headword, "run");
        assert_eq!(rec.book_norm, "duo30");
        assert_eq!(rec.quality, 100 - 4 + 8 + 8 + 10 + 12);
    }

    #[test]
    fn quality_penalizes_missing_and_wrong_script() {
        assert_eq!(quality_score("DUO", "走る", "走る", 0), 100 + 8 + 8 + 10 - 20);
        assert_eq!(quality_score("DUO", "run", "nan", 0), 100 + 8 + 12 - 40);
        assert_eq!(quality_score("古文単語315", "あはれ", "しみじみとした趣", 0), 100 + 8 + 8 + 10 + 8);
        assert_eq!(quality_score("古文単語315", "aware", "趣", 0), 100 + 8 + 8 + 10 - 12);
        let long = "a".repeat(81);
        assert_eq!(quality_score("DUO", &long, "x", 0), 100 + 8 + 8 + 12 - 8);
    }
}
