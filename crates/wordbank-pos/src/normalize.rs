//! Text canonicalization shared by every join key in the engine.

use unicode_normalization::UnicodeNormalization;

/// Cell values that mean "nothing was extracted here".
pub const MISSING_TOKENS: [&str; 5] = ["", "[未抽出]", "nan", "NaN", "None"];

const BOOK_STRIP_CHARS: &str = "-‐‑‒–—―_・･/\\()[]{}「」『』【】〈〉《》:：;；,，.．!！?？\"“”'’`＠@";

/// Drop BOMs, turn ideographic spaces and line breaks into spaces, collapse runs
/// of whitespace and trim.
pub fn clean_text(value: &str) -> String {
    let mapped: String = value
        .chars()
        .filter(|c| *c != '\u{feff}')
        .map(|c| match c {
            '\u{3000}' | '\r' | '\n' => ' ',
            other => other,
        })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn is_missing_token(text: &str) -> bool {
    let cleaned = clean_text(text);
    MISSING_TOKENS.contains(&cleaned.as_str())
}

/// Canonical headword key: NFKC, lowercase, `[a-z0-9' -]` only, single spaces,
/// no leading/trailing spaces, hyphens or apostrophes.
pub fn normalize_headword(word: &str) -> String {
    let lowered = clean_text(word).nfkc().collect::<String>().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut in_gap = false;
    for c in lowered.chars() {
        let c = match c {
            '’' | '`' => '\'',
            other => other,
        };
        if c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '\'' | '-' | ' ') {
            out.push(c);
            in_gap = false;
        } else if !in_gap {
            out.push(' ');
            in_gap = true;
        }
    }
    let collapsed = out.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c| matches!(c, ' ' | '-' | '\''))
        .to_string()
}

/// Canonical book key: NFKC, lowercase, small-kana `ヶ`/`ヵ` unified, all
/// whitespace, punctuation and brackets removed.
pub fn normalize_book_name(name: &str) -> String {
    let lowered = clean_text(name).nfkc().collect::<String>().to_lowercase();
    lowered
        .nfkc()
        .map(|c| match c {
            'ヶ' => 'ケ',
            'ヵ' => 'カ',
            other => other,
        })
        .filter(|c| !c.is_whitespace() && !BOOK_STRIP_CHARS.contains(*c))
        .collect()
}

pub fn has_japanese(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c,
            '\u{3040}'..='\u{30ff}' | '\u{3400}'..='\u{4dbf}' | '\u{4e00}'..='\u{9fff}')
    })
}

pub fn has_ascii_letter(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_alphabetic())
}

/// Parse a slot number written as `12` or `12.0`; anything else is `None`.
pub fn parse_slot_number(value: &str) -> Option<u32> {
    let text = clean_text(value);
    if text.is_empty() {
        return None;
    }
    let (int_part, frac) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };
    if int_part.is_empty() || !int_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if let Some(frac) = frac
        && (frac.is_empty() || !frac.chars().all(|c| c == '0'))
    {
        return None;
    }
    int_part.parse().ok()
}

/// Truncate to `limit` characters, marking the cut with `...`.
pub fn sanitize_short(text: &str, limit: usize) -> String {
    let cleaned = clean_text(text);
    if cleaned.chars().count() <= limit {
        return cleaned;
    }
    let kept: String = cleaned.chars().take(limit.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

const FAMILY_SUFFIXES: [&str; 27] = [
    "ization", "isation", "ation", "ition", "ingly", "edly", "ment", "ness", "ship", "able",
    "ible", "tion", "sion", "ance", "ence", "ally", "fully", "lessly", "ously", "ive", "ous",
    "ing", "ed", "ly", "er", "est", "s",
];

/// Rough word-family stem: first token with the first listed suffix removed,
/// provided at least three characters remain.
pub fn derive_word_family(headword_norm: &str) -> String {
    let Some(first) = headword_norm.split(' ').next() else {
        return String::new();
    };
    let base = first.trim_matches(|c| matches!(c, ' ' | '-' | '\''));
    for suffix in FAMILY_SUFFIXES {
        if let Some(stem) = base.strip_suffix(suffix)
            && stem.len() >= 3
        {
            return stem.to_string();
        }
    }
    base.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_collapses_whitespace() {
        assert_eq!(clean_text("\u{feff}  a\u{3000}b\r\nc  "), "a b c");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn missing_tokens_are_detected() {
        assert!(is_missing_token(" nan "));
        assert!(is_missing_token("[未抽出]"));
        assert!(is_missing_token(""));
        assert!(!is_missing_token("none"));
    }

    #[test]
    fn headword_normalization_strips_noise() {
        assert_eq!(normalize_headword("  Look   After! "), "look after");
        assert_eq!(normalize_headword("don’t"), "don't");
        assert_eq!(normalize_headword("-well-being-"), "well-being");
        assert_eq!(normalize_headword("result from ~"), "result from");
        assert_eq!(normalize_headword("走る"), "");
    }

    #[test]
    fn headword_normalization_is_idempotent_and_width_blind() {
        for raw in ["Ｒｕｎ", "ＬＯＯＫ　ａｆｔｅｒ", "'Tis'", "a--b", "  x ~ y / z "] {
            let once = normalize_headword(raw);
            assert_eq!(normalize_headword(&once), once, "input {raw:?}");
        }
        assert_eq!(normalize_headword("Ｒｕｎ"), normalize_headword("run"));
    }

    #[test]
    fn book_normalization_unifies_variants() {
        assert_eq!(
            normalize_book_name("英検_準2級_でる順パス単_5訂版"),
            normalize_book_name("英検 準2級 でる順パス単 5訂版")
        );
        assert_eq!(normalize_book_name("ヶ月（テスト）"), "ケ月テスト");
        assert_eq!(normalize_book_name("ＤＵＯ ３．０"), "duo30");
        let once = normalize_book_name("Look@古文単語 337");
        assert_eq!(normalize_book_name(&once), once);
    }

    #[test]
    fn parses_slot_numbers() {
        assert_eq!(parse_slot_number("12"), Some(12));
        assert_eq!(parse_slot_number(" 12.00 "), Some(12));
        assert_eq!(parse_slot_number("12.5"), None);
        assert_eq!(parse_slot_number("12a"), None);
        assert_eq!(parse_slot_number(""), None);
    }

    #[test]
    fn short_gloss_is_truncated_by_chars() {
        assert_eq!(sanitize_short("走る", 80), "走る");
        let long = "あ".repeat(100);
        let short = sanitize_short(&long, 10);
        assert_eq!(short.chars().count(), 10);
        assert!(short.ends_with("..."));
    }

    #[test]
    fn word_family_strips_one_suffix() {
        assert_eq!(derive_word_family("organization"), "organ");
        assert_eq!(derive_word_family("running fast"), "runn");
        assert_eq!(derive_word_family("cats"), "cat");
        assert_eq!(derive_word_family("is"), "is");
        assert_eq!(derive_word_family(""), "");
    }
}
