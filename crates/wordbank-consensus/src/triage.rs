//! Review triage: score each entry's risk of a wrong POS and decide which
//! entries go in front of a reviewer.

use tracing::info;
use wordbank_types::{ReviewCandidate, ReviewPriority, WordbankEntry};

#[derive(Clone, Debug)]
pub struct TriageConfig {
    pub low_confidence: u8,
    pub mid_confidence: u8,
    pub very_close_margin: f64,
    pub close_margin: f64,
    pub many_sources: usize,
    pub advanced_stage: u8,
    pub high_score: u32,
    pub medium_score: u32,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            low_confidence: 60,
            mid_confidence: 70,
            very_close_margin: 15.0,
            close_margin: 35.0,
            many_sources: 5,
            advanced_stage: 4,
            high_score: 8,
            medium_score: 5,
        }
    }
}

/// Additive review score with the reasons that contributed to it.
pub fn review_score(entry: &WordbankEntry, config: &TriageConfig) -> (u32, Vec<String>) {
    let mut score = 0;
    let mut reasons = Vec::new();

    if entry.pos_confidence < config.low_confidence {
        score += 5;
        reasons.push(format!("low_confidence(<{})", config.low_confidence));
    } else if entry.pos_confidence < config.mid_confidence {
        score += 3;
        reasons.push(format!("mid_confidence(<{})", config.mid_confidence));
    }

    if entry.is_multi_pos {
        score += 3;
        reasons.push("multi_pos".to_string());
    }

    if entry.pos_score_margin < config.very_close_margin {
        score += 4;
        reasons.push("very_close_margin".to_string());
    } else if entry.pos_score_margin < config.close_margin {
        score += 2;
        reasons.push("close_margin".to_string());
    }

    if entry.pos_evidence.is_weak() {
        score += 2;
        reasons.push(format!("weak_evidence:{}", entry.pos_evidence));
    }

    if entry.source_count >= config.many_sources && entry.is_multi_pos {
        score += 1;
        reasons.push("many_sources_with_conflict".to_string());
    }

    if entry.stage >= config.advanced_stage {
        score += 1;
        reasons.push("advanced_stage".to_string());
    }

    (score, reasons)
}

pub fn priority_for(score: u32, config: &TriageConfig) -> ReviewPriority {
    if score >= config.high_score {
        ReviewPriority::High
    } else if score >= config.medium_score {
        ReviewPriority::Medium
    } else {
        ReviewPriority::Low
    }
}

/// Review candidates, most urgent first.
///
/// An entry is emitted when its score reaches MEDIUM, when its sources
/// disagree, or when its confidence is below the mid threshold.
pub fn triage(entries: &[WordbankEntry], config: &TriageConfig) -> Vec<ReviewCandidate> {
    let mut out: Vec<ReviewCandidate> = entries
        .iter()
        .filter_map(|entry| {
            let (score, reasons) = review_score(entry, config);
            let emit = score >= config.medium_score
                || entry.is_multi_pos
                || entry.pos_confidence < config.mid_confidence;
            emit.then(|| candidate(entry, score, reasons, priority_for(score, config)))
        })
        .collect();

    out.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.priority.rank().cmp(&b.priority.rank()))
            .then(a.stage.cmp(&b.stage))
            .then(b.source_count.cmp(&a.source_count))
            .then(a.headword_norm.cmp(&b.headword_norm))
    });

    let high = out.iter().filter(|c| c.priority == ReviewPriority::High).count();
    let medium = out.iter().filter(|c| c.priority == ReviewPriority::Medium).count();
    info!(candidates = out.len(), high, medium, "triaged entries for review");
    out
}

fn candidate(
    entry: &WordbankEntry,
    score: u32,
    reasons: Vec<String>,
    priority: ReviewPriority,
) -> ReviewCandidate {
    ReviewCandidate {
        entry_id: entry.entry_id.clone(),
        headword: entry.headword.clone(),
        headword_norm: entry.headword_norm.clone(),
        gloss: entry.gloss.clone(),
        pos_current: entry.pos,
        pos_secondary: entry.pos_secondary,
        votes: entry.votes.clone(),
        pos_confidence: entry.pos_confidence,
        pos_score_margin: entry.pos_score_margin,
        is_multi_pos: entry.is_multi_pos,
        pos_evidence: entry.pos_evidence,
        stage: entry.stage,
        stage_label: entry.stage_label.clone(),
        source_count: entry.source_count,
        source_books: entry.source_books.clone(),
        priority,
        score,
        reasons,
    }
}
