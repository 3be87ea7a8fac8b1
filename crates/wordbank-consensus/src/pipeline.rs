//! End-to-end orchestration: aggregate, triage, confirm, queue, apply manual
//! decisions and check the result.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::{info, warn};
use wordbank_pos::{Classifier, Lexicon, extract_first_gloss, surface_pos_hints};
use wordbank_types::{ConfirmTier, ManualDecision, Pos, ReviewCandidate, SourceRecord, WordbankEntry};

use crate::aggregate::{Aggregator, ScoringConfig};
use crate::confirm::{ConfirmOutcome, apply_quickwin, confirm_priority_pos};
use crate::manual::{ManualIntakeConfig, ManualOutcome, apply_manual_decisions};
use crate::queue::{
    ManualQueue, QueueItem, ReviewerBatch, build_manual_queue, prefill, split_batches,
};
use crate::stage::StageRules;
use crate::triage::{TriageConfig, triage};

/// Everything the engine is parameterized by. `Default` holds the
/// production tables.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub lexicon: Lexicon,
    pub stages: StageRules,
    pub scoring: ScoringConfig,
    pub triage: TriageConfig,
    pub manual: ManualIntakeConfig,
    pub batch_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lexicon: Lexicon::default(),
            stages: StageRules::default(),
            scoring: ScoringConfig::default(),
            triage: TriageConfig::default(),
            manual: ManualIntakeConfig::default(),
            batch_count: 10,
        }
    }
}

/// Every checkpoint of one run, oldest first.
#[derive(Clone, Debug)]
pub struct PipelineRun {
    pub aggregated: Vec<WordbankEntry>,
    pub review: Vec<ReviewCandidate>,
    pub high: ConfirmOutcome,
    pub medium: ConfirmOutcome,
    pub queue: ManualQueue,
    pub quickwin: ConfirmOutcome,
    /// Queue rows left after quick-win changes.
    pub remaining: Vec<QueueItem>,
    pub manual: ManualOutcome,
    /// Prefilled rows still waiting for a reviewer.
    pub final_queue: Vec<QueueItem>,
    pub batches: Vec<ReviewerBatch>,
    pub integrity: IntegritySummary,
}

impl PipelineRun {
    pub fn final_entries(&self) -> &[WordbankEntry] {
        &self.manual.entries
    }
}

pub struct Pipeline {
    classifier: Classifier,
    config: EngineConfig,
}

impl Pipeline {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            classifier: Classifier::new(config.lexicon.clone()),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn aggregate(&self, records: &[SourceRecord]) -> Vec<WordbankEntry> {
        Aggregator::new(&self.classifier, &self.config.stages, &self.config.scoring)
            .aggregate(records)
    }

    pub fn run(&self, records: &[SourceRecord], decisions: &[ManualDecision]) -> PipelineRun {
        let lexicon = &self.config.lexicon;
        let aggregated = self.aggregate(records);
        let review = triage(&aggregated, &self.config.triage);

        let high = confirm_priority_pos(&aggregated, &review, ConfirmTier::High, lexicon);
        let medium = confirm_priority_pos(&high.entries, &review, ConfirmTier::Medium, lexicon);

        let queue = build_manual_queue(&review, &high, &medium);
        let quickwin = apply_quickwin(&medium.entries, &queue.quickwin);
        let quickwin_ids: HashSet<&str> =
            quickwin.confirmations.iter().map(|c| c.entry_id.as_str()).collect();
        let remaining: Vec<QueueItem> = queue
            .queue
            .iter()
            .filter(|item| !quickwin_ids.contains(item.candidate.entry_id.as_str()))
            .cloned()
            .collect();

        let manual = apply_manual_decisions(&quickwin.entries, decisions, &self.config.manual);
        let manual_ids = manual.applied_ids();
        let unresolved: Vec<QueueItem> = remaining
            .iter()
            .filter(|item| !manual_ids.contains(item.candidate.entry_id.as_str()))
            .cloned()
            .collect();
        let final_queue = prefill(&unresolved);
        let batches = split_batches(&final_queue, self.config.batch_count);

        let integrity = IntegritySummary::check(&Checkpoints {
            entries: &manual.entries,
            review: &review,
            high: &high,
            medium: &medium,
            quickwin: &quickwin,
            remaining: &remaining,
            manual: &manual,
            final_queue: &final_queue,
        });
        integrity.log();

        PipelineRun {
            aggregated,
            review,
            high,
            medium,
            queue,
            quickwin,
            remaining,
            manual,
            final_queue,
            batches,
            integrity,
        }
    }
}

struct Checkpoints<'a> {
    entries: &'a [WordbankEntry],
    review: &'a [ReviewCandidate],
    high: &'a ConfirmOutcome,
    medium: &'a ConfirmOutcome,
    quickwin: &'a ConfirmOutcome,
    remaining: &'a [QueueItem],
    manual: &'a ManualOutcome,
    final_queue: &'a [QueueItem],
}

/// Consistency checks and distributions over one run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct IntegritySummary {
    pub entries: usize,
    pub entry_id_unique: bool,
    pub headword_unique: bool,
    pub review_candidates: usize,
    pub high_changed: usize,
    pub high_unchanged: usize,
    pub medium_changed: usize,
    pub medium_unchanged: usize,
    pub quickwin_applied: usize,
    pub queue_after_quickwin: usize,
    /// `high_unchanged + medium_unchanged - quickwin_applied`
    pub queue_expected: usize,
    pub queue_consistent: bool,
    pub manual_applied: usize,
    pub manual_changed: usize,
    pub manual_ignored: usize,
    pub final_queue: usize,
    pub prefilled: usize,
    pub pos_distribution: BTreeMap<Pos, usize>,
    pub priority_distribution: BTreeMap<String, usize>,
    /// Nouns left in the queue whose first gloss reads like another POS.
    pub residual_noun_signals: BTreeMap<Pos, usize>,
}

fn all_unique<'a>(values: impl Iterator<Item = &'a str>) -> bool {
    let mut seen = HashSet::new();
    values.into_iter().all(|v| seen.insert(v))
}

impl IntegritySummary {
    fn check(run: &Checkpoints<'_>) -> Self {
        let high_unchanged = run.high.unchanged_ids().count();
        let medium_unchanged = run.medium.unchanged_ids().count();
        let quickwin_applied = run.quickwin.confirmations.len();
        let queue_expected = (high_unchanged + medium_unchanged).saturating_sub(quickwin_applied);

        let mut pos_distribution = BTreeMap::new();
        for entry in run.entries {
            *pos_distribution.entry(entry.pos).or_insert(0) += 1;
        }
        let mut priority_distribution = BTreeMap::new();
        for candidate in run.review {
            *priority_distribution
                .entry(candidate.priority.as_str().to_string())
                .or_insert(0) += 1;
        }
        let mut residual_noun_signals = BTreeMap::new();
        for item in run.final_queue {
            if item.candidate.pos_current != Pos::Noun {
                continue;
            }
            for pos in surface_pos_hints(&extract_first_gloss(&item.candidate.gloss)) {
                *residual_noun_signals.entry(pos).or_insert(0) += 1;
            }
        }

        Self {
            entries: run.entries.len(),
            entry_id_unique: all_unique(run.entries.iter().map(|e| e.entry_id.as_str())),
            headword_unique: all_unique(run.entries.iter().map(|e| e.headword_norm.as_str())),
            review_candidates: run.review.len(),
            high_changed: run.high.changed_count(),
            high_unchanged,
            medium_changed: run.medium.changed_count(),
            medium_unchanged,
            quickwin_applied,
            queue_after_quickwin: run.remaining.len(),
            queue_expected,
            queue_consistent: run.remaining.len() == queue_expected,
            manual_applied: run.manual.applied.len(),
            manual_changed: run.manual.applied.iter().filter(|a| a.changed).count(),
            manual_ignored: run.manual.ignored.len(),
            final_queue: run.final_queue.len(),
            prefilled: run.final_queue.iter().filter(|i| i.is_prefilled).count(),
            pos_distribution,
            priority_distribution,
            residual_noun_signals,
        }
    }

    pub fn passed(&self) -> bool {
        self.entry_id_unique && self.headword_unique && self.queue_consistent
    }

    fn log(&self) {
        info!(
            entries = self.entries,
            high_changed = self.high_changed,
            medium_changed = self.medium_changed,
            quickwin = self.quickwin_applied,
            manual = self.manual_applied,
            queue = self.final_queue,
            prefilled = self.prefilled,
            "pipeline complete"
        );
        if !self.passed() {
            warn!(
                entry_id_unique = self.entry_id_unique,
                headword_unique = self.headword_unique,
                queue_after_quickwin = self.queue_after_quickwin,
                queue_expected = self.queue_expected,
                "integrity check failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_consistent() {
        let run = Pipeline::new(EngineConfig::default()).run(&[], &[]);
        assert!(run.final_entries().is_empty());
        assert!(run.batches.is_empty());
        assert!(run.integrity.passed());
        assert_eq!(
            run.integrity,
            IntegritySummary {
                entry_id_unique: true,
                headword_unique: true,
                queue_consistent: true,
                ..IntegritySummary::default()
            }
        );
    }
}
