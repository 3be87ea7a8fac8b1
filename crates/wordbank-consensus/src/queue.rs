//! Manual review queue: quick-win suggestions, conservative prefill and the
//! split into reviewer batches.

use std::collections::HashSet;

use serde::Serialize;
use tracing::info;
use wordbank_pos::gloss_marker_pos;
use wordbank_types::{Evidence, Pos, ReviewCandidate, ReviewPriority};

use crate::confirm::{ConfirmOutcome, vote_threshold};

pub const PREFILL_REVIEWER: &str = "auto_prefill";
pub const STATUS_TODO: &str = "todo";
pub const STATUS_TODO_PREFILL: &str = "todo_prefill";

/// An automatic POS suggestion with the vote split that justified it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Suggestion {
    pub pos: Pos,
    pub reason: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefillRule {
    KeepCurrentNonFallback,
    KeepCurrentJpHintMatch,
    KeepCurrentNounMargin1Sources1,
}

/// One row of the manual queue. Serializes flat so that a reviewer can edit
/// `decision_pos` and `status` and feed the row back as a manual decision.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueueItem {
    #[serde(flatten)]
    pub candidate: ReviewCandidate,
    pub jp_hint: Option<Pos>,
    pub suggestion: Option<Suggestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision_pos: Option<Pos>,
    pub decision_reason: String,
    pub reviewer: String,
    pub status: String,
    pub prefill_rule: Option<PrefillRule>,
    pub is_prefilled: bool,
}

impl QueueItem {
    fn new(candidate: ReviewCandidate) -> Self {
        let jp_hint = gloss_marker_pos(&candidate.gloss);
        let suggestion = suggest(&candidate, jp_hint);
        Self {
            candidate,
            jp_hint,
            suggestion,
            decision_pos: None,
            decision_reason: String::new(),
            reviewer: String::new(),
            status: STATUS_TODO.to_string(),
            prefill_rule: None,
            is_prefilled: false,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ManualQueue {
    pub queue: Vec<QueueItem>,
    /// Queue rows that carry a suggestion, in queue order.
    pub quickwin: Vec<QueueItem>,
}

fn queue_order(a: &ReviewCandidate, b: &ReviewCandidate) -> std::cmp::Ordering {
    a.priority
        .rank()
        .cmp(&b.priority.rank())
        .then(b.score.cmp(&a.score))
        .then(a.stage.cmp(&b.stage))
        .then(b.source_count.cmp(&a.source_count))
        .then(a.headword_norm.cmp(&b.headword_norm))
}

/// HIGH and MEDIUM review rows that automatic confirmation left unchanged.
pub fn build_manual_queue(
    review: &[ReviewCandidate],
    high: &ConfirmOutcome,
    medium: &ConfirmOutcome,
) -> ManualQueue {
    let unchanged: HashSet<&str> = high.unchanged_ids().chain(medium.unchanged_ids()).collect();
    let mut seen = HashSet::new();
    let mut rows: Vec<&ReviewCandidate> = review
        .iter()
        .filter(|c| matches!(c.priority, ReviewPriority::High | ReviewPriority::Medium))
        .filter(|c| unchanged.contains(c.entry_id.as_str()))
        .filter(|c| seen.insert(c.entry_id.as_str()))
        .collect();
    rows.sort_by(|a, b| queue_order(a, b));

    let queue: Vec<QueueItem> = rows.into_iter().cloned().map(QueueItem::new).collect();
    let quickwin: Vec<QueueItem> = queue
        .iter()
        .filter(|item| item.suggestion.is_some())
        .cloned()
        .collect();
    info!(queue = queue.len(), quickwin = quickwin.len(), "built manual queue");
    ManualQueue { queue, quickwin }
}

/// Suggest a POS from the gloss marker when the votes back it, else from a
/// well-supported secondary POS of a noun.
pub fn suggest(candidate: &ReviewCandidate, jp_hint: Option<Pos>) -> Option<Suggestion> {
    let current = candidate.pos_current;
    let current_votes = candidate.votes.get(current);

    if let Some(hint) = jp_hint
        && hint != current
        && candidate.votes.contains(hint)
    {
        let hint_votes = candidate.votes.get(hint);
        if hint_votes >= vote_threshold(2, current_votes, 6) {
            return Some(Suggestion {
                pos: hint,
                reason: format!("jp_hint_with_votes:{hint_votes}/{current_votes}"),
            });
        }
    }

    if let Some(secondary) = candidate.pos_secondary
        && current == Pos::Noun
        && secondary != current
    {
        let secondary_votes = candidate.votes.get(secondary);
        if secondary_votes >= vote_threshold(3, current_votes, 8) {
            return Some(Suggestion {
                pos: secondary,
                reason: format!("secondary_votes:{secondary_votes}/{current_votes}"),
            });
        }
    }
    None
}

/// Fill `decision_pos` with the current POS where keeping it is clearly
/// safe. Prefilled rows still need a reviewer to mark them done.
pub fn prefill(items: &[QueueItem]) -> Vec<QueueItem> {
    items.iter().cloned().map(prefill_one).collect()
}

fn prefill_one(mut item: QueueItem) -> QueueItem {
    if item.decision_pos.is_some() {
        return item;
    }
    let c = &item.candidate;
    let current = c.pos_current;
    let top = c.votes.top();
    let fallback = c.pos_evidence == Evidence::FallbackNoun;

    let rule = if !fallback && top == Some(current) {
        Some((
            PrefillRule::KeepCurrentNonFallback,
            format!("prefill_keep_current_non_fallback:{}", c.pos_evidence),
        ))
    } else if item.jp_hint == Some(current) && top == Some(current) {
        Some((
            PrefillRule::KeepCurrentJpHintMatch,
            "prefill_keep_current_jp_hint_match".to_string(),
        ))
    } else if current == Pos::Noun && fallback && c.source_count >= 1 && c.pos_score_margin >= 1.0 {
        Some((
            PrefillRule::KeepCurrentNounMargin1Sources1,
            "prefill_keep_current_noun_margin1_sources1".to_string(),
        ))
    } else {
        None
    };

    if let Some((rule, reason)) = rule {
        item.decision_pos = Some(current);
        item.decision_reason = reason;
        item.reviewer = PREFILL_REVIEWER.to_string();
        item.status = STATUS_TODO_PREFILL.to_string();
        item.prefill_rule = Some(rule);
        item.is_prefilled = true;
    }
    item
}

/// A queue row placed in a reviewer batch.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BatchRow {
    pub batch_id: String,
    pub batch_seq: usize,
    /// 1-based position across all batches.
    pub global_rank: usize,
    #[serde(flatten)]
    pub item: QueueItem,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReviewerBatch {
    pub batch_id: String,
    pub batch_seq: usize,
    pub file_stem: String,
    pub rows: Vec<BatchRow>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BatchSummary {
    pub batch: String,
    pub file_stem: String,
    pub rows: usize,
    pub high: usize,
    pub medium: usize,
    pub prefilled: usize,
}

impl ReviewerBatch {
    pub fn summary(&self) -> BatchSummary {
        let count = |p: ReviewPriority| {
            self.rows
                .iter()
                .filter(|r| r.item.candidate.priority == p)
                .count()
        };
        BatchSummary {
            batch: self.batch_id.clone(),
            file_stem: self.file_stem.clone(),
            rows: self.rows.len(),
            high: count(ReviewPriority::High),
            medium: count(ReviewPriority::Medium),
            prefilled: self.rows.iter().filter(|r| r.item.is_prefilled).count(),
        }
    }
}

/// Split the queue into at most `batch_count` equally sized batches
/// (`ceil(n / batch_count)` rows each, the last one possibly shorter).
pub fn split_batches(items: &[QueueItem], batch_count: usize) -> Vec<ReviewerBatch> {
    let mut sorted: Vec<&QueueItem> = items.iter().collect();
    sorted.sort_by(|a, b| queue_order(&a.candidate, &b.candidate));

    let size = sorted.len().div_ceil(batch_count.max(1)).max(1);
    sorted
        .chunks(size)
        .enumerate()
        .map(|(idx, chunk)| {
            let seq = idx + 1;
            let batch_id = format!("BATCH_{seq:02}");
            let rows = chunk
                .iter()
                .enumerate()
                .map(|(offset, item)| BatchRow {
                    batch_id: batch_id.clone(),
                    batch_seq: seq,
                    global_rank: idx * size + offset + 1,
                    item: (*item).clone(),
                })
                .collect();
            ReviewerBatch {
                file_stem: format!("POS_MANUAL_BATCH_{seq:02}"),
                batch_id,
                batch_seq: seq,
                rows,
            }
        })
        .collect()
}
