//! Merge source records into one entry per normalized headword.
//!
//! Each admissible record is classified on its own, then records sharing a
//! headword vote. A POS scores
//!
//! ```text
//! score(pos) = Σ confidence × stage_weight × evidence_weight + votes × vote_bonus
//! ```
//!
//! and the highest score wins, with vote count and canonical POS order
//! breaking ties.

use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, info};
use wordbank_pos::{
    Classifier, derive_word_family, has_ascii_letter, is_missing_token, is_phrase_headword,
    normalize_headword, sanitize_short,
};
use wordbank_types::{Evidence, Pos, SourceRecord, VoteCounts, WordbankEntry, group_key};

use crate::source::is_classical_book;
use crate::stage::StageRules;

/// Weights that turn per-record classifications into per-POS scores.
#[derive(Clone, Debug)]
pub struct ScoringConfig {
    pub stage_weights: BTreeMap<u8, f64>,
    pub evidence_weights: HashMap<Evidence, f64>,
    pub vote_bonus: f64,
    /// Character limit of the representative gloss.
    pub gloss_limit: usize,
}

impl ScoringConfig {
    pub fn stage_weight(&self, stage: u8) -> f64 {
        self.stage_weights.get(&stage).copied().unwrap_or(1.0)
    }

    pub fn evidence_weight(&self, evidence: Evidence) -> f64 {
        self.evidence_weights.get(&evidence).copied().unwrap_or(1.0)
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let mut evidence_weights = HashMap::from([
            (Evidence::PhrasePattern, 1.35),
            (Evidence::FunctionWordList, 1.3),
            (Evidence::HeadwordAdverbList, 1.3),
            (Evidence::HeadwordAdjectiveList, 1.25),
            (Evidence::MeaningGerundNoun, 1.2),
            (Evidence::MeaningDictFormVerb, 1.18),
            (Evidence::MeaningDictFormAdjective, 1.16),
            (Evidence::MeaningDictFormAdverb, 1.12),
            (Evidence::MeaningContainsSuru, 1.2),
            (Evidence::MeaningAdjectiveMarker, 1.15),
            (Evidence::MeaningAdverbMarker, 1.15),
            (Evidence::SuffixLy, 1.1),
            (Evidence::NounSuffix, 1.08),
            (Evidence::AdjectiveSuffix, 1.08),
            (Evidence::VerbSuffix, 1.02),
            (Evidence::MeaningNounMarker, 1.0),
            (Evidence::FallbackNoun, 0.85),
        ]);
        for pos in [Pos::Noun, Pos::Verb, Pos::Adjective, Pos::Adverb] {
            evidence_weights.insert(Evidence::ExplicitTag(pos), 1.28);
        }
        for pos in [Pos::Verb, Pos::Adjective, Pos::Adverb] {
            evidence_weights.insert(Evidence::ExplicitPrimaryTag(pos), 1.22);
        }
        Self {
            stage_weights: BTreeMap::from([(1, 1.25), (2, 1.15), (3, 1.0), (4, 0.9)]),
            evidence_weights,
            vote_bonus: 8.0,
            gloss_limit: 80,
        }
    }
}

/// One admissible record after classification.
#[derive(Clone, Debug)]
struct ClassifiedRow {
    book: String,
    number: u32,
    headword: String,
    headword_norm: String,
    gloss: String,
    stage: u8,
    stage_label: String,
    book_rank: u32,
    pos: Pos,
    confidence: u8,
    evidence: Evidence,
    word_family: String,
    is_phrase: bool,
    source_priority: u8,
    quality: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingToken,
    ClassicalBook,
    NoAsciiHeadword,
    EmptyHeadword,
}

/// Why a record cannot take part in aggregation, if it cannot.
pub fn admissibility(record: &SourceRecord) -> Result<(), SkipReason> {
    if is_missing_token(&record.headword) || is_missing_token(&record.gloss) {
        return Err(SkipReason::MissingToken);
    }
    if is_classical_book(&record.book) {
        return Err(SkipReason::ClassicalBook);
    }
    if !has_ascii_letter(&record.headword) {
        return Err(SkipReason::NoAsciiHeadword);
    }
    if normalize_headword(&record.headword).is_empty() {
        return Err(SkipReason::EmptyHeadword);
    }
    Ok(())
}

pub struct Aggregator<'a> {
    classifier: &'a Classifier,
    stages: &'a StageRules,
    scoring: &'a ScoringConfig,
}

impl<'a> Aggregator<'a> {
    pub fn new(
        classifier: &'a Classifier,
        stages: &'a StageRules,
        scoring: &'a ScoringConfig,
    ) -> Self {
        Self {
            classifier,
            stages,
            scoring,
        }
    }

    /// Build entries with `WB000001`-style ids. The result does not depend on
    /// the order of `records`.
    pub fn aggregate(&self, records: &[SourceRecord]) -> Vec<WordbankEntry> {
        let mut groups: BTreeMap<String, Vec<ClassifiedRow>> = BTreeMap::new();
        let mut skipped = 0usize;
        for record in records {
            if let Err(reason) = admissibility(record) {
                debug!(
                    headword = %record.headword,
                    book = %record.book,
                    ?reason,
                    "skipping source record"
                );
                skipped += 1;
                continue;
            }
            let row = self.classify_row(record);
            groups.entry(row.headword_norm.clone()).or_default().push(row);
        }

        let mut entries: Vec<WordbankEntry> = groups
            .into_values()
            .map(|rows| self.merge_group(rows))
            .collect();
        assign_entry_ids(&mut entries);

        info!(
            records = records.len(),
            skipped,
            entries = entries.len(),
            "aggregated source records"
        );
        entries
    }

    fn classify_row(&self, record: &SourceRecord) -> ClassifiedRow {
        let stage = self.stages.classify(&record.book);
        let result = self.classifier.infer_pos(&record.headword, &record.gloss);
        let headword_norm = normalize_headword(&record.headword);
        ClassifiedRow {
            book: record.book.clone(),
            number: record.number,
            headword: record.headword.clone(),
            word_family: derive_word_family(&headword_norm),
            headword_norm,
            gloss: sanitize_short(&record.gloss, self.scoring.gloss_limit),
            stage: stage.stage,
            stage_label: stage.label,
            book_rank: stage.book_rank,
            pos: result.pos,
            confidence: result.confidence,
            evidence: result.evidence,
            is_phrase: is_phrase_headword(&record.headword),
            source_priority: record.source_priority,
            quality: record.quality,
        }
    }

    fn row_score(&self, row: &ClassifiedRow) -> f64 {
        f64::from(row.confidence)
            * self.scoring.stage_weight(row.stage)
            * self.scoring.evidence_weight(row.evidence)
    }

    fn merge_group(&self, mut rows: Vec<ClassifiedRow>) -> WordbankEntry {
        rows.sort_by(|a, b| representative_key(a).cmp(&representative_key(b)));
        let rep = &rows[0];

        let votes: VoteCounts = rows.iter().map(|r| r.pos).collect();
        let mut scores: BTreeMap<Pos, f64> = BTreeMap::new();
        for row in &rows {
            *scores.entry(row.pos).or_insert(0.0) += self.row_score(row);
        }
        for (pos, count) in votes.iter() {
            *scores.entry(pos).or_insert(0.0) += f64::from(count) * self.scoring.vote_bonus;
        }

        let mut ranked: Vec<(Pos, f64, u32)> = scores
            .iter()
            .map(|(pos, score)| (*pos, *score, votes.get(*pos)))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.total_cmp(&a.1)
                .then(b.2.cmp(&a.2))
                .then(a.0.cmp(&b.0))
        });
        let (primary, score_primary, vote_count) = ranked[0];
        let secondary = ranked.get(1).map(|(pos, _, _)| *pos);
        let score_secondary = ranked.get(1).map_or(0.0, |(_, score, _)| *score);

        let mut primary_rows: Vec<&ClassifiedRow> =
            rows.iter().filter(|r| r.pos == primary).collect();
        primary_rows.sort_by(|a, b| {
            b.confidence
                .cmp(&a.confidence)
                .then(a.stage.cmp(&b.stage))
                .then(a.book_rank.cmp(&b.book_rank))
        });
        let confidence = primary_rows[0].confidence;
        let evidence = primary_rows[0].evidence;

        let stage = rows.iter().map(|r| r.stage).min().unwrap_or(rep.stage);
        let stage_max = rows.iter().map(|r| r.stage).max().unwrap_or(rep.stage);
        let source_books: Vec<String> = rows
            .iter()
            .map(|r| r.book.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let (number_min, number_median, number_max) = number_stats(&rows);
        let (group_id, group_label, group_order) = group_key(stage, primary, &rep.headword_norm);

        WordbankEntry {
            entry_id: String::new(),
            headword: rep.headword.clone(),
            headword_norm: rep.headword_norm.clone(),
            gloss: rep.gloss.clone(),
            pos: primary,
            pos_secondary: secondary,
            pos_confidence: confidence,
            pos_vote_count: vote_count,
            is_multi_pos: votes.distinct() >= 2,
            votes,
            pos_score_primary: round2(score_primary),
            pos_score_secondary: round2(score_secondary),
            pos_score_margin: round2(score_primary - score_secondary),
            pos_evidence: evidence,
            is_phrase: rep.is_phrase || primary == Pos::Phrase,
            word_family: vote_word_family(&rows),
            stage,
            stage_label: rep.stage_label.clone(),
            stage_max,
            group_id,
            group_label,
            group_order,
            source_primary: rep.book.clone(),
            source_primary_number: rep.number,
            book_rank_primary: rep.book_rank,
            source_count: source_books.len(),
            source_books,
            source_number_min: number_min,
            source_number_median: number_median,
            source_number_max: number_max,
        }
    }
}

/// Representative row first: earliest stage, book and slot.
#[allow(clippy::type_complexity)]
fn representative_key(row: &ClassifiedRow) -> (u8, u32, u32, &str, &str, &str, u8, Reverse<i32>) {
    (
        row.stage,
        row.book_rank,
        row.number,
        &row.book,
        &row.gloss,
        &row.headword,
        row.source_priority,
        Reverse(row.quality),
    )
}

/// Most common family stem; longer stems, then alphabetical order, break ties.
fn vote_word_family(rows: &[ClassifiedRow]) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for row in rows {
        *counts.entry(row.word_family.as_str()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .min_by(|a, b| {
            b.1.cmp(&a.1)
                .then(b.0.len().cmp(&a.0.len()))
                .then(a.0.cmp(b.0))
        })
        .map(|(family, _)| family.to_string())
        .unwrap_or_default()
}

/// Min, truncated median and max of the positive slot numbers; zeros when none.
fn number_stats(rows: &[ClassifiedRow]) -> (u32, u32, u32) {
    let mut numbers: Vec<u32> = rows.iter().map(|r| r.number).filter(|n| *n > 0).collect();
    if numbers.is_empty() {
        return (0, 0, 0);
    }
    numbers.sort_unstable();
    let mid = numbers.len() / 2;
    let median = if numbers.len() % 2 == 1 {
        numbers[mid]
    } else {
        ((u64::from(numbers[mid - 1]) + u64::from(numbers[mid])) / 2) as u32
    };
    (numbers[0], median, numbers[numbers.len() - 1])
}

/// Order entries for reading (stage, POS group, letter, position in source
/// books) and number them `WB000001`, `WB000002`, ...
pub fn assign_entry_ids(entries: &mut [WordbankEntry]) {
    entries.sort_by(entry_order);
    for (idx, entry) in entries.iter_mut().enumerate() {
        entry.entry_id = format!("WB{:06}", idx + 1);
    }
}

fn entry_order(a: &WordbankEntry, b: &WordbankEntry) -> Ordering {
    (a.stage, a.group_order, &a.group_id, a.source_number_median, a.book_rank_primary)
        .cmp(&(b.stage, b.group_order, &b.group_id, b.source_number_median, b.book_rank_primary))
        .then(a.source_primary_number.cmp(&b.source_primary_number))
        .then(a.headword_norm.cmp(&b.headword_norm))
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
