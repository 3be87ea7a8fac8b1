//! Gloss analysis: first-segment extraction, bracketed POS tags, and the
//! Japanese inflection markers the classifier keys off.

use std::sync::LazyLock;

use regex::Regex;
use wordbank_types::Pos;

use crate::normalize::clean_text;

static TAG_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\[\(（【](?:名|動|形|副|他|自|前|接|代|助|可算|不可算)[\]\)）】]")
        .expect("valid tag marker regex")
});
static COUNT_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\[\(（【][0-9①-⑩]+\s*[\]\)）】]").expect("valid count marker regex")
});
static LEADING_ENUMERATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9①-⑩\-\.\s]+").expect("valid enumeration regex"));

static DICT_FORM_NA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ぁ-んァ-ヶ一-龠]{1,14}な$").expect("valid na regex"));
static DICT_FORM_NI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ぁ-んァ-ヶ一-龠]{1,14}に$").expect("valid ni regex"));
static DICT_FORM_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[ぁ-んァ-ヶ一-龠]{1,16}(?:る|う|く|す|つ|ぬ|む|ぶ|ぐ)$").expect("valid verb regex")
});
static NOMINALIZED_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:もの|こと|ため)$").expect("valid nominal regex"));
static DICT_FORM_I: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ぁ-んァ-ヶ一-龠]{2,14}い$").expect("valid i regex"));

/// `…すること` and any other dictionary-form verb followed by `こと`.
static GERUND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[ぁ-んァ-ヶ一-龠](?:る|う|く|す|つ|ぬ|む|ぶ|ぐ)こと").expect("valid gerund regex")
});

static PROGRESSIVE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:ている|でいる)$").expect("valid progressive regex"));
static DICT_FORM_I_OR_NA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ぁ-んァ-ヶ一-龠]{1,14}(?:い|な)$").expect("valid i/na regex"));

static VERBALIZER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[、,・;/()（）\s])[^、,・;/()（）\s]{0,8}(?:する|になる|させる)(?:$|[、,・;/()（）\s])")
        .expect("valid verbalizer regex")
});
static BOUNDED_NA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[、,・;/()（）\s])[ぁ-んァ-ヶ一-龠]{1,10}な(?:$|[、,・;/()（）\s])")
        .expect("valid bounded na regex")
});
static BOUNDED_NI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[、,・;/()（）\s])[ぁ-んァ-ヶ一-龠]{1,10}に(?:$|[、,・;/()（）\s])")
        .expect("valid bounded ni regex")
});

const TAG_LITERALS: [(Pos, &[&str]); 4] = [
    (Pos::Noun, &["【名】", "[名]", "(名)"]),
    (
        Pos::Verb,
        &["【動】", "[動]", "(動)", "【他】", "[他]", "(他)", "【自】", "[自]", "(自)"],
    ),
    (Pos::Adjective, &["【形】", "[形]", "(形)"]),
    (Pos::Adverb, &["【副】", "[副]", "(副)"]),
];

/// Clean a raw gloss and fold the wave dash into the full-width tilde.
pub fn normalize_gloss(raw: &str) -> String {
    clean_text(raw).replace('〜', "～")
}

/// First meaningful segment of a gloss, with tag/count markers and leading
/// enumeration removed. Empty input yields an empty string.
pub fn extract_first_gloss(raw: &str) -> String {
    let cleaned = clean_text(raw);
    if cleaned.is_empty() {
        return String::new();
    }

    let stripped = TAG_MARKER.replace_all(&cleaned, " ");
    let stripped = COUNT_MARKER.replace_all(&stripped, " ");
    let unified = stripped.replace(['；', ';', '/'], "、");

    let parts: Vec<String> = unified
        .split(['、', ','])
        .map(clean_text)
        .filter(|p| !p.is_empty())
        .collect();
    for part in &parts {
        let token = clean_text(&LEADING_ENUMERATION.replace(part, ""));
        if !token.is_empty() {
            return token;
        }
    }
    parts.first().cloned().unwrap_or_default()
}

/// Explicit bracket tags in leftmost-occurrence order, each POS at most once.
pub fn parse_explicit_pos_tags(raw: &str) -> Vec<Pos> {
    let normalized = clean_text(raw);
    if normalized.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<(usize, Pos)> = Vec::new();
    for (pos, literals) in TAG_LITERALS {
        for literal in literals {
            hits.extend(normalized.match_indices(literal).map(|(at, _)| (at, pos)));
        }
    }
    hits.sort_by_key(|(at, _)| *at);

    let mut ordered = Vec::new();
    for (_, pos) in hits {
        if !ordered.contains(&pos) {
            ordered.push(pos);
        }
    }
    ordered
}

/// The single tag, or the leading tag of several when it is not `noun`.
pub fn decisive_tag(tags: &[Pos]) -> Option<Pos> {
    match tags {
        [only] => Some(*only),
        [first, _, ..] if *first != Pos::Noun => Some(*first),
        _ => None,
    }
}

pub(crate) fn ends_with_na(gloss: &str) -> bool {
    DICT_FORM_NA.is_match(gloss)
}

pub(crate) fn ends_with_ni(gloss: &str) -> bool {
    DICT_FORM_NI.is_match(gloss)
}

/// Dictionary-form verb ending that is not a "thing that …" nominalization.
pub(crate) fn ends_with_verb_form(gloss: &str) -> bool {
    DICT_FORM_VERB.is_match(gloss) && !NOMINALIZED_END.is_match(gloss)
}

pub(crate) fn ends_with_i(gloss: &str) -> bool {
    DICT_FORM_I.is_match(gloss)
}

/// Surface shape of a first gloss, used to flag noun entries that still
/// look like another part of speech after review.
pub fn surface_pos_hints(first_gloss: &str) -> Vec<Pos> {
    let mut hints = Vec::new();
    if DICT_FORM_VERB.is_match(first_gloss) && !PROGRESSIVE_END.is_match(first_gloss) {
        hints.push(Pos::Verb);
    }
    if DICT_FORM_I_OR_NA.is_match(first_gloss) {
        hints.push(Pos::Adjective);
    }
    if DICT_FORM_NI.is_match(first_gloss) {
        hints.push(Pos::Adverb);
    }
    hints
}

pub fn has_gerund_marker(meaning: &str) -> bool {
    GERUND.is_match(meaning)
}

pub fn has_verbalizer(meaning: &str) -> bool {
    VERBALIZER.is_match(meaning)
}

pub fn has_adjective_marker(meaning: &str) -> bool {
    meaning.contains("的な") || BOUNDED_NA.is_match(meaning)
}

pub fn has_adverb_marker(meaning: &str) -> bool {
    meaning.contains("的に") || BOUNDED_NI.is_match(meaning)
}

/// POS implied by the gloss alone: explicit tags first, then the gerund,
/// verbalizer, adjectival and adverbial markers.
pub fn gloss_marker_pos(meaning: &str) -> Option<Pos> {
    let m = normalize_gloss(meaning);
    if m.is_empty() {
        return None;
    }
    let tags = parse_explicit_pos_tags(&m);
    if let Some(tag) = decisive_tag(&tags) {
        return Some(tag);
    }
    if has_gerund_marker(&m) {
        Some(Pos::Noun)
    } else if has_verbalizer(&m) {
        Some(Pos::Verb)
    } else if has_adjective_marker(&m) {
        Some(Pos::Adjective)
    } else if has_adverb_marker(&m) {
        Some(Pos::Adverb)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_gloss_skips_markers_and_numbering() {
        assert_eq!(extract_first_gloss("【動】走る、急ぐ"), "走る");
        assert_eq!(extract_first_gloss("(可算) 本; 書物"), "本");
        assert_eq!(extract_first_gloss("① 明るい ② 賢い"), "明るい ② 賢い");
        assert_eq!(extract_first_gloss("1. 速く/すばやく"), "速く");
        assert_eq!(extract_first_gloss("[2] 機会"), "機会");
        assert_eq!(extract_first_gloss(""), "");
        assert_eq!(extract_first_gloss("、、"), "");
    }

    #[test]
    fn explicit_tags_follow_leftmost_order() {
        assert_eq!(parse_explicit_pos_tags("[形]明るい (名)光"), vec![Pos::Adjective, Pos::Noun]);
        assert_eq!(parse_explicit_pos_tags("【名】光 【形】明るい"), vec![Pos::Noun, Pos::Adjective]);
        assert_eq!(parse_explicit_pos_tags("【他】動かす【自】動く"), vec![Pos::Verb]);
        assert!(parse_explicit_pos_tags("光").is_empty());
        assert!(parse_explicit_pos_tags("（名）光").is_empty());
    }

    #[test]
    fn decisive_tag_prefers_leading_non_noun() {
        assert_eq!(decisive_tag(&[Pos::Noun]), Some(Pos::Noun));
        assert_eq!(decisive_tag(&[Pos::Verb, Pos::Noun]), Some(Pos::Verb));
        assert_eq!(decisive_tag(&[Pos::Noun, Pos::Verb]), None);
        assert_eq!(decisive_tag(&[]), None);
    }

    #[test]
    fn dictionary_form_endings() {
        assert!(ends_with_na("静かな"));
        assert!(ends_with_ni("静かに"));
        assert!(ends_with_verb_form("走る"));
        assert!(!ends_with_verb_form("走るもの"));
        assert!(!ends_with_verb_form("る"));
        assert!(ends_with_i("明るい"));
        assert!(!ends_with_i("良い"));
    }

    #[test]
    fn bounded_markers_need_separators() {
        assert!(has_verbalizer("勉強する"));
        assert!(has_verbalizer("努力、勉強する"));
        assert!(!has_verbalizer("長い長い長い説明をする"));
        assert!(has_adjective_marker("経済的な"));
        assert!(has_adjective_marker("静かな、穏やか"));
        assert!(has_adverb_marker("静かに"));
        assert!(has_adjective_marker("明るい 静かな"));
        assert!(has_gerund_marker("勉強すること"));
        assert!(has_gerund_marker("走ること"));
        assert!(!has_gerund_marker("大事なこと"));
    }

    #[test]
    fn surface_hints_for_residual_nouns() {
        assert_eq!(surface_pos_hints("走る"), vec![Pos::Verb]);
        assert!(surface_pos_hints("走っている").is_empty());
        assert_eq!(surface_pos_hints("静かな"), vec![Pos::Adjective]);
        assert_eq!(surface_pos_hints("急に"), vec![Pos::Adverb]);
        assert!(surface_pos_hints("机").is_empty());
    }

    #[test]
    fn gloss_marker_pos_precedence() {
        assert_eq!(gloss_marker_pos("[副]すぐに"), Some(Pos::Adverb));
        assert_eq!(gloss_marker_pos("勉強すること"), Some(Pos::Noun));
        assert_eq!(gloss_marker_pos("勉強する"), Some(Pos::Verb));
        assert_eq!(gloss_marker_pos("経済的な"), Some(Pos::Adjective));
        assert_eq!(gloss_marker_pos("経済的に"), Some(Pos::Adverb));
        assert_eq!(gloss_marker_pos("机"), None);
        assert_eq!(gloss_marker_pos(""), None);
    }
}
