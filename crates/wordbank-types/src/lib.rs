//! Shared types for the wordbank part-of-speech consensus engine.
//!
//! Every stage of the engine speaks in these types: the classifier produces a
//! [`ClassificationResult`], the aggregator folds [`SourceRecord`]s into a
//! [`WordbankEntry`], triage derives a [`ReviewCandidate`], and confirmation
//! stages emit [`ConfirmationRecord`]s / [`ManualApplied`] rows as their audit
//! trail.
//!
//! Tags that travel through files ([`Pos`], [`Evidence`], [`ReviewPriority`],
//! [`OverrideMethod`], [`IgnoreReason`]) round-trip through their string form
//! via `Display`/`FromStr`, which is also what the optional `serde` feature
//! serializes.
//!
//! ```rust
//! use wordbank_types::{Evidence, Pos, VoteCounts};
//!
//! let pos: Pos = "adjective".parse().unwrap();
//! assert_eq!(pos.order(), 3);
//! assert_eq!(Evidence::ExplicitTag(Pos::Verb).to_string(), "explicit_tag:verb");
//!
//! let votes = VoteCounts::parse("noun:3 | verb:2");
//! assert_eq!(votes.get(Pos::Verb), 2);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Part-of-speech category. Declaration order is the canonical tie-break order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Pos {
    Verb,
    Noun,
    Adjective,
    Adverb,
    Phrase,
    Function,
    Other,
}

impl Pos {
    /// All categories in canonical order.
    pub const ALL: [Pos; 7] = [
        Pos::Verb,
        Pos::Noun,
        Pos::Adjective,
        Pos::Adverb,
        Pos::Phrase,
        Pos::Function,
        Pos::Other,
    ];

    /// Parse a lowercase label (`"verb"`, `"noun"`, ...). Surrounding whitespace
    /// and case are ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "verb" => Some(Pos::Verb),
            "noun" => Some(Pos::Noun),
            "adjective" => Some(Pos::Adjective),
            "adverb" => Some(Pos::Adverb),
            "phrase" => Some(Pos::Phrase),
            "function" => Some(Pos::Function),
            "other" => Some(Pos::Other),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Pos::Verb => "verb",
            Pos::Noun => "noun",
            Pos::Adjective => "adjective",
            Pos::Adverb => "adverb",
            Pos::Phrase => "phrase",
            Pos::Function => "function",
            Pos::Other => "other",
        }
    }

    /// 1-based position in the canonical order; drives group ordering.
    pub fn order(self) -> u8 {
        match self {
            Pos::Verb => 1,
            Pos::Noun => 2,
            Pos::Adjective => 3,
            Pos::Adverb => 4,
            Pos::Phrase => 5,
            Pos::Function => 6,
            Pos::Other => 7,
        }
    }

    /// Japanese display label used in group labels.
    pub fn label_ja(self) -> &'static str {
        match self {
            Pos::Verb => "動詞",
            Pos::Noun => "名詞",
            Pos::Adjective => "形容詞",
            Pos::Adverb => "副詞",
            Pos::Phrase => "熟語",
            Pos::Function => "機能語",
            Pos::Other => "その他",
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a tag string does not name a known value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseTagError {
    kind: &'static str,
    value: String,
}

impl ParseTagError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for ParseTagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {:?}", self.kind, self.value)
    }
}

impl std::error::Error for ParseTagError {}

impl FromStr for Pos {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pos::parse(s).ok_or_else(|| ParseTagError::new("part of speech", s))
    }
}

/// Automatic confirmation tier; doubles as the evidence prefix of its overrides.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ConfirmTier {
    High,
    Medium,
}

impl ConfirmTier {
    pub fn evidence_prefix(self) -> &'static str {
        match self {
            ConfirmTier::High => "high_confirm",
            ConfirmTier::Medium => "medium_confirm",
        }
    }

    pub fn priority(self) -> ReviewPriority {
        match self {
            ConfirmTier::High => ReviewPriority::High,
            ConfirmTier::Medium => ReviewPriority::Medium,
        }
    }
}

/// How a confirmation stage arrived at its decision.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum OverrideMethod {
    KeepCurrent,
    HeadwordAdverbOverride,
    HeadwordAdjectiveOverride,
    MeaningMarkerOverride,
    SecondaryVoteOverride,
    QuickWinAuto,
    ManualBatch,
}

impl OverrideMethod {
    const ALL: [OverrideMethod; 7] = [
        OverrideMethod::KeepCurrent,
        OverrideMethod::HeadwordAdverbOverride,
        OverrideMethod::HeadwordAdjectiveOverride,
        OverrideMethod::MeaningMarkerOverride,
        OverrideMethod::SecondaryVoteOverride,
        OverrideMethod::QuickWinAuto,
        OverrideMethod::ManualBatch,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OverrideMethod::KeepCurrent => "keep_current",
            OverrideMethod::HeadwordAdverbOverride => "headword_adverb_override",
            OverrideMethod::HeadwordAdjectiveOverride => "headword_adjective_override",
            OverrideMethod::MeaningMarkerOverride => "meaning_marker_override",
            OverrideMethod::SecondaryVoteOverride => "secondary_vote_override",
            OverrideMethod::QuickWinAuto => "quickwin_auto",
            OverrideMethod::ManualBatch => "manual_batch",
        }
    }

    /// Lexicon-backed overrides carry a higher confirmation confidence.
    pub fn is_headword_rule(self) -> bool {
        matches!(
            self,
            OverrideMethod::HeadwordAdverbOverride | OverrideMethod::HeadwordAdjectiveOverride
        )
    }
}

impl fmt::Display for OverrideMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverrideMethod {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OverrideMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ParseTagError::new("override method", s))
    }
}

/// Which rule produced a POS assignment.
///
/// Classifier rules map one-to-one onto variants; the trailing variants mark
/// assignments that a confirmation stage overrode.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Evidence {
    EmptyWord,
    PhrasePattern,
    FunctionWordList,
    ExplicitTag(Pos),
    ExplicitPrimaryTag(Pos),
    HeadwordAdverbList,
    HeadwordAdjectiveList,
    MeaningDictFormAdjective,
    MeaningDictFormAdverb,
    MeaningDictFormVerb,
    MeaningGerundNoun,
    MeaningContainsSuru,
    MeaningAdjectiveMarker,
    MeaningAdverbMarker,
    SuffixLy,
    NounSuffix,
    AdjectiveSuffix,
    VerbSuffix,
    MeaningNounMarker,
    FallbackNoun,
    Confirmed {
        tier: ConfirmTier,
        method: OverrideMethod,
    },
    QuickWinConfirm,
    ManualBatchConfirm,
}

const SIMPLE_EVIDENCE: [(Evidence, &str); 18] = [
    (Evidence::EmptyWord, "empty_word"),
    (Evidence::PhrasePattern, "phrase_pattern"),
    (Evidence::FunctionWordList, "function_word_list"),
    (Evidence::HeadwordAdverbList, "headword_adverb_list"),
    (Evidence::HeadwordAdjectiveList, "headword_adjective_list"),
    (Evidence::MeaningDictFormAdjective, "meaning_dict_form_adjective"),
    (Evidence::MeaningDictFormAdverb, "meaning_dict_form_adverb"),
    (Evidence::MeaningDictFormVerb, "meaning_dict_form_verb"),
    (Evidence::MeaningGerundNoun, "meaning_gerund_noun"),
    (Evidence::MeaningContainsSuru, "meaning_contains_する"),
    (Evidence::MeaningAdjectiveMarker, "meaning_adjective_marker"),
    (Evidence::MeaningAdverbMarker, "meaning_adverb_marker"),
    (Evidence::SuffixLy, "suffix_ly"),
    (Evidence::NounSuffix, "noun_suffix"),
    (Evidence::AdjectiveSuffix, "adjective_suffix"),
    (Evidence::VerbSuffix, "verb_suffix"),
    (Evidence::MeaningNounMarker, "meaning_noun_marker"),
    (Evidence::FallbackNoun, "fallback_noun"),
];

impl Evidence {
    /// The two weakest classifier rules; triage penalizes them.
    pub fn is_weak(self) -> bool {
        matches!(self, Evidence::FallbackNoun | Evidence::VerbSuffix)
    }
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evidence::ExplicitTag(pos) => write!(f, "explicit_tag:{pos}"),
            Evidence::ExplicitPrimaryTag(pos) => write!(f, "explicit_primary_tag:{pos}"),
            Evidence::Confirmed { tier, method } => {
                write!(f, "{}:{}", tier.evidence_prefix(), method)
            }
            Evidence::QuickWinConfirm => f.write_str("quickwin_confirm"),
            Evidence::ManualBatchConfirm => f.write_str("manual_batch_confirm"),
            simple => {
                let tag = SIMPLE_EVIDENCE
                    .iter()
                    .find(|(e, _)| e == simple)
                    .map(|(_, tag)| *tag)
                    .unwrap_or("unknown");
                f.write_str(tag)
            }
        }
    }
}

impl FromStr for Evidence {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseTagError::new("evidence tag", s);
        if let Some((ev, _)) = SIMPLE_EVIDENCE.iter().find(|(_, tag)| *tag == s) {
            return Ok(*ev);
        }
        match s {
            "quickwin_confirm" => return Ok(Evidence::QuickWinConfirm),
            "manual_batch_confirm" => return Ok(Evidence::ManualBatchConfirm),
            _ => {}
        }
        let (prefix, rest) = s.split_once(':').ok_or_else(err)?;
        match prefix {
            "explicit_tag" => Ok(Evidence::ExplicitTag(rest.parse().map_err(|_| err())?)),
            "explicit_primary_tag" => Ok(Evidence::ExplicitPrimaryTag(
                rest.parse().map_err(|_| err())?,
            )),
            "high_confirm" | "medium_confirm" => {
                let tier = if prefix == "high_confirm" {
                    ConfirmTier::High
                } else {
                    ConfirmTier::Medium
                };
                Ok(Evidence::Confirmed {
                    tier,
                    method: rest.parse().map_err(|_| err())?,
                })
            }
            _ => Err(err()),
        }
    }
}

/// Review priority emitted by triage.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ReviewPriority {
    High,
    Medium,
    Low,
}

impl ReviewPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewPriority::High => "HIGH",
            ReviewPriority::Medium => "MEDIUM",
            ReviewPriority::Low => "LOW",
        }
    }

    /// Sort rank for reviewer batches (HIGH first).
    pub fn rank(self) -> u8 {
        match self {
            ReviewPriority::High => 0,
            ReviewPriority::Medium => 1,
            ReviewPriority::Low => 9,
        }
    }
}

impl fmt::Display for ReviewPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewPriority {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Ok(ReviewPriority::High),
            "MEDIUM" => Ok(ReviewPriority::Medium),
            "LOW" => Ok(ReviewPriority::Low),
            _ => Err(ParseTagError::new("review priority", s)),
        }
    }
}

/// Why a manual decision row was not applied.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum IgnoreReason {
    InvalidDecisionPos,
    StatusNotReady,
    EntryIdHeadwordMismatchUnresolved,
    EntryIdMeaningMismatchUnresolved,
    HeadwordAmbiguous,
    EntryNotFound,
}

impl IgnoreReason {
    const ALL: [IgnoreReason; 6] = [
        IgnoreReason::InvalidDecisionPos,
        IgnoreReason::StatusNotReady,
        IgnoreReason::EntryIdHeadwordMismatchUnresolved,
        IgnoreReason::EntryIdMeaningMismatchUnresolved,
        IgnoreReason::HeadwordAmbiguous,
        IgnoreReason::EntryNotFound,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IgnoreReason::InvalidDecisionPos => "invalid_decision_pos",
            IgnoreReason::StatusNotReady => "status_not_ready",
            IgnoreReason::EntryIdHeadwordMismatchUnresolved => {
                "entry_id_headword_mismatch_unresolved"
            }
            IgnoreReason::EntryIdMeaningMismatchUnresolved => "entry_id_meaning_mismatch_unresolved",
            IgnoreReason::HeadwordAmbiguous => "headword_ambiguous",
            IgnoreReason::EntryNotFound => "entry_not_found",
        }
    }
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IgnoreReason {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IgnoreReason::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| ParseTagError::new("ignore reason", s))
    }
}

#[cfg(feature = "serde")]
macro_rules! serde_via_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl serde::Serialize for $ty {
                fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.collect_str(self)
                }
            }

            impl<'de> serde::Deserialize<'de> for $ty {
                fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let raw = String::deserialize(deserializer)?;
                    raw.parse().map_err(serde::de::Error::custom)
                }
            }
        )*
    };
}

#[cfg(feature = "serde")]
serde_via_str!(Pos, Evidence, ReviewPriority, OverrideMethod, IgnoreReason);

/// Per-POS vote tally for one headword.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct VoteCounts(BTreeMap<Pos, u32>);

impl VoteCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, pos: Pos) {
        *self.0.entry(pos).or_insert(0) += 1;
    }

    pub fn get(&self, pos: Pos) -> u32 {
        self.0.get(&pos).copied().unwrap_or(0)
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.0.contains_key(&pos)
    }

    /// Number of distinct POS labels that received votes.
    pub fn distinct(&self) -> usize {
        self.0.len()
    }

    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pos, u32)> + '_ {
        self.0.iter().map(|(pos, count)| (*pos, *count))
    }

    /// Votes ordered by count descending, then canonical POS order.
    pub fn ranked(&self) -> Vec<(Pos, u32)> {
        let mut items: Vec<(Pos, u32)> = self.iter().collect();
        items.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        items
    }

    /// The most-voted POS (canonical order breaks ties).
    pub fn top(&self) -> Option<Pos> {
        self.ranked().first().map(|(pos, _)| *pos)
    }

    /// Parse the `noun:3 | verb:2` form. Malformed pieces are skipped.
    pub fn parse(text: &str) -> Self {
        let mut map = BTreeMap::new();
        for piece in text.split('|') {
            let Some((name, count)) = piece.trim().split_once(':') else {
                continue;
            };
            let (Some(pos), Ok(count)) = (Pos::parse(name), count.trim().parse::<u32>()) else {
                continue;
            };
            map.insert(pos, count);
        }
        Self(map)
    }
}

impl fmt::Display for VoteCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (pos, count)) in self.ranked().into_iter().enumerate() {
            if idx > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{pos}:{count}")?;
        }
        Ok(())
    }
}

impl FromIterator<Pos> for VoteCounts {
    fn from_iter<I: IntoIterator<Item = Pos>>(iter: I) -> Self {
        let mut votes = VoteCounts::new();
        for pos in iter {
            votes.add(pos);
        }
        votes
    }
}

/// One observation of a `(book, number)` slot from one source file.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceRecord {
    /// Display name of the source book; drives stage lookup.
    pub book: String,
    pub book_norm: String,
    pub number: u32,
    pub headword: String,
    pub gloss: String,
    pub source_path: String,
    pub source_label: String,
    /// Lower is more trusted.
    pub source_priority: u8,
    pub method: String,
    pub quality: i32,
}

/// Classifier output for a single `(headword, gloss)` pair.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassificationResult {
    pub pos: Pos,
    pub confidence: u8,
    pub evidence: Evidence,
}

/// Canonical merged entry for one normalized headword.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WordbankEntry {
    pub entry_id: String,
    pub headword: String,
    pub headword_norm: String,
    pub gloss: String,
    pub pos: Pos,
    pub pos_secondary: Option<Pos>,
    pub pos_confidence: u8,
    pub pos_vote_count: u32,
    pub votes: VoteCounts,
    pub is_multi_pos: bool,
    pub pos_score_primary: f64,
    pub pos_score_secondary: f64,
    pub pos_score_margin: f64,
    pub pos_evidence: Evidence,
    pub is_phrase: bool,
    pub word_family: String,
    pub stage: u8,
    pub stage_label: String,
    pub stage_max: u8,
    pub group_id: String,
    pub group_label: String,
    pub group_order: u8,
    pub source_primary: String,
    pub source_primary_number: u32,
    pub book_rank_primary: u32,
    pub source_count: usize,
    pub source_books: Vec<String>,
    pub source_number_min: u32,
    pub source_number_median: u32,
    pub source_number_max: u32,
}

impl WordbankEntry {
    /// `min-max` stage range across the entry's sources.
    pub fn stage_span(&self) -> String {
        format!("{}-{}", self.stage, self.stage_max)
    }

    /// Recompute the POS-keyed group fields after `pos` changed.
    pub fn refresh_group(&mut self) {
        let (id, label, order) = group_key(self.stage, self.pos, &self.headword_norm);
        self.group_id = id;
        self.group_label = label;
        self.group_order = order;
    }
}

/// `(group_id, group_label, group_order)` for a stage/POS/headword triple.
pub fn group_key(stage: u8, pos: Pos, headword_norm: &str) -> (String, String, u8) {
    let letter = first_alpha(headword_norm).to_ascii_uppercase();
    (
        format!("S{stage:02}_{}_{letter}", pos.as_str().to_ascii_uppercase()),
        format!("{} / {letter}", pos.label_ja()),
        pos.order(),
    )
}

/// First ASCII lowercase letter, or `_` when there is none.
pub fn first_alpha(text: &str) -> char {
    text.chars().find(|c| c.is_ascii_lowercase()).unwrap_or('_')
}

/// Triage view of an entry.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReviewCandidate {
    pub entry_id: String,
    pub headword: String,
    pub headword_norm: String,
    pub gloss: String,
    pub pos_current: Pos,
    pub pos_secondary: Option<Pos>,
    pub votes: VoteCounts,
    pub pos_confidence: u8,
    pub pos_score_margin: f64,
    pub is_multi_pos: bool,
    pub pos_evidence: Evidence,
    pub stage: u8,
    pub stage_label: String,
    pub source_count: usize,
    pub source_books: Vec<String>,
    pub priority: ReviewPriority,
    pub score: u32,
    pub reasons: Vec<String>,
}

/// Reviewer-authored decision row from a manual batch file.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ManualDecision {
    pub entry_id: Option<String>,
    pub headword_norm: String,
    pub gloss: String,
    /// Raw reviewer input; validated during intake.
    pub decision_pos: String,
    pub status: String,
    pub decision_reason: String,
    pub reviewer: String,
    pub batch_file: String,
    /// 1-based row within `batch_file`.
    pub row_index: usize,
}

/// Audit row for one automatic confirmation evaluation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfirmationRecord {
    pub entry_id: String,
    pub headword: String,
    pub headword_norm: String,
    pub gloss: String,
    pub current_pos: Pos,
    pub confirmed_pos: Pos,
    pub changed: bool,
    pub method: OverrideMethod,
    pub reason: String,
    pub pos_confidence_before: u8,
    pub confirmation_confidence: f64,
    pub votes: VoteCounts,
    pub review_priority: ReviewPriority,
}

/// Audit row for one applied manual decision.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ManualApplied {
    pub source_entry_id: Option<String>,
    pub entry_id: String,
    pub headword_norm: String,
    pub before_pos: Pos,
    pub after_pos: Pos,
    pub changed: bool,
    pub decision_reason: String,
    pub reviewer: String,
    pub status: String,
    pub batch_file: String,
    pub row_index: usize,
}

/// A manual decision row that intake refused, with the reason.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IgnoredDecision {
    pub entry_id: Option<String>,
    pub decision_pos: String,
    pub status: String,
    pub batch_file: String,
    pub row_index: usize,
    pub reason: IgnoreReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pos_parse_is_case_insensitive() {
        assert_eq!(Pos::parse(" Verb "), Some(Pos::Verb));
        assert_eq!("ADVERB".parse::<Pos>(), Ok(Pos::Adverb));
        assert_eq!(Pos::parse("adj"), None);
        assert!("preposition".parse::<Pos>().is_err());
    }

    #[test]
    fn canonical_order_matches_declaration() {
        let mut shuffled = vec![Pos::Other, Pos::Noun, Pos::Phrase, Pos::Verb];
        shuffled.sort();
        assert_eq!(shuffled, vec![Pos::Verb, Pos::Noun, Pos::Phrase, Pos::Other]);
        assert_eq!(Pos::ALL.iter().map(|p| p.order()).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn evidence_tags_round_trip() {
        let tags = [
            Evidence::FallbackNoun,
            Evidence::MeaningContainsSuru,
            Evidence::ExplicitTag(Pos::Noun),
            Evidence::ExplicitPrimaryTag(Pos::Adverb),
            Evidence::Confirmed {
                tier: ConfirmTier::Medium,
                method: OverrideMethod::SecondaryVoteOverride,
            },
            Evidence::QuickWinConfirm,
            Evidence::ManualBatchConfirm,
        ];
        for tag in tags {
            assert_eq!(tag.to_string().parse::<Evidence>(), Ok(tag));
        }
        assert_eq!(
            Evidence::Confirmed {
                tier: ConfirmTier::High,
                method: OverrideMethod::HeadwordAdverbOverride
            }
            .to_string(),
            "high_confirm:headword_adverb_override"
        );
        assert!("explicit_tag:preposition".parse::<Evidence>().is_err());
    }

    #[test]
    fn vote_counts_format_and_parse() {
        let votes: VoteCounts = [Pos::Verb, Pos::Noun, Pos::Noun, Pos::Adverb]
            .into_iter()
            .collect();
        assert_eq!(votes.to_string(), "noun:2 | verb:1 | adverb:1");
        assert_eq!(votes.total(), 4);
        assert_eq!(votes.top(), Some(Pos::Noun));
        assert_eq!(VoteCounts::parse(&votes.to_string()), votes);

        let messy = VoteCounts::parse("noun:2 | bogus:4 | verb: x | adverb:1");
        assert_eq!(messy.distinct(), 2);
        assert_eq!(messy.get(Pos::Verb), 0);
    }

    #[test]
    fn group_key_uses_first_letter() {
        assert_eq!(
            group_key(2, Pos::Adjective, "happy"),
            ("S02_ADJECTIVE_H".to_string(), "形容詞 / H".to_string(), 3)
        );
        assert_eq!(group_key(1, Pos::Noun, "'90s").0, "S01_NOUN_S");
        assert_eq!(group_key(1, Pos::Noun, "123").0, "S01_NOUN__");
    }
}
