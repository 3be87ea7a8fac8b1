//! Manual batch intake: validate reviewer rows, resolve them to entries and
//! apply the accepted ones.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{debug, info, warn};
use wordbank_pos::clean_text;
use wordbank_types::{
    Evidence, IgnoreReason, IgnoredDecision, ManualApplied, ManualDecision, Pos, WordbankEntry,
};

use crate::confirm::{Override, apply_override};

#[derive(Clone, Debug)]
pub struct ManualIntakeConfig {
    /// Lowercase statuses that mark a row as ready to apply.
    pub accepted_statuses: BTreeSet<String>,
    pub confidence_floor: u8,
    /// Status recorded for rows that leave `status` empty.
    pub default_status: String,
}

impl Default for ManualIntakeConfig {
    fn default() -> Self {
        Self {
            accepted_statuses: [
                "done",
                "confirmed",
                "approved",
                "apply",
                "applied",
                "manual_done",
                "complete",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            confidence_floor: 95,
            default_status: "done".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ManualOutcome {
    pub applied: Vec<ManualApplied>,
    pub ignored: Vec<IgnoredDecision>,
    pub entries: Vec<WordbankEntry>,
}

impl ManualOutcome {
    pub fn applied_ids(&self) -> HashSet<&str> {
        self.applied.iter().map(|a| a.entry_id.as_str()).collect()
    }
}

/// A decision row that passed validation.
#[derive(Clone, Debug)]
struct Accepted<'a> {
    entry_id: Option<String>,
    headword: String,
    gloss: String,
    pos: Pos,
    status: String,
    raw: &'a ManualDecision,
}

impl Accepted<'_> {
    fn dedup_key(&self) -> (String, String) {
        match &self.entry_id {
            Some(id) => (id.clone(), String::new()),
            None => (self.headword.clone(), self.gloss.clone()),
        }
    }
}

fn ignored(
    decision: &ManualDecision,
    entry_id: Option<String>,
    pos: &str,
    status: &str,
    reason: IgnoreReason,
) -> IgnoredDecision {
    warn!(
        batch_file = %decision.batch_file,
        row = decision.row_index,
        reason = %reason,
        "ignored manual decision"
    );
    IgnoredDecision {
        entry_id,
        decision_pos: pos.to_string(),
        status: status.to_string(),
        batch_file: decision.batch_file.clone(),
        row_index: decision.row_index,
        reason,
    }
}

/// Lookup tables over the snapshot. Headword and gloss never change during
/// intake, so they are built once.
struct EntryIndex<'a> {
    by_id: HashMap<&'a str, usize>,
    by_headword: HashMap<&'a str, Vec<usize>>,
    by_headword_gloss: HashMap<(&'a str, &'a str), Vec<usize>>,
}

impl<'a> EntryIndex<'a> {
    fn new(entries: &'a [WordbankEntry]) -> Self {
        let mut index = Self {
            by_id: HashMap::new(),
            by_headword: HashMap::new(),
            by_headword_gloss: HashMap::new(),
        };
        for (idx, e) in entries.iter().enumerate() {
            index.by_id.insert(e.entry_id.as_str(), idx);
            if !e.headword_norm.is_empty() {
                index.by_headword.entry(e.headword_norm.as_str()).or_default().push(idx);
                index
                    .by_headword_gloss
                    .entry((e.headword_norm.as_str(), e.gloss.as_str()))
                    .or_default()
                    .push(idx);
            }
        }
        index
    }

    /// Unique `(headword, gloss)` match, else unique headword match.
    fn resolve(&self, headword: &str, gloss: &str) -> Option<usize> {
        if headword.is_empty() {
            return None;
        }
        if !gloss.is_empty()
            && let Some([idx]) = self.by_headword_gloss.get(&(headword, gloss)).map(Vec::as_slice)
        {
            return Some(*idx);
        }
        match self.by_headword.get(headword).map(Vec::as_slice) {
            Some([idx]) => Some(*idx),
            _ => None,
        }
    }

    fn headword_count(&self, headword: &str) -> usize {
        self.by_headword.get(headword).map_or(0, Vec::len)
    }
}

fn validate<'a>(
    decisions: &'a [ManualDecision],
    config: &ManualIntakeConfig,
    ignored_rows: &mut Vec<IgnoredDecision>,
) -> Vec<Accepted<'a>> {
    let mut accepted = Vec::new();
    for decision in decisions {
        let entry_id = decision
            .entry_id
            .as_deref()
            .map(clean_text)
            .filter(|id| !id.is_empty());
        let headword = clean_text(&decision.headword_norm);
        let gloss = clean_text(&decision.gloss);
        if entry_id.is_none() && headword.is_empty() {
            continue;
        }
        let raw_pos = clean_text(&decision.decision_pos).to_lowercase();
        if raw_pos.is_empty() {
            continue;
        }
        let status = clean_text(&decision.status).to_lowercase();
        let Some(pos) = Pos::parse(&raw_pos) else {
            let reason = IgnoreReason::InvalidDecisionPos;
            ignored_rows.push(ignored(decision, entry_id, &raw_pos, &status, reason));
            continue;
        };
        if !status.is_empty() && !config.accepted_statuses.contains(&status) {
            let reason = IgnoreReason::StatusNotReady;
            ignored_rows.push(ignored(decision, entry_id, &raw_pos, &status, reason));
            continue;
        }
        accepted.push(Accepted {
            entry_id,
            headword,
            gloss,
            pos,
            status: if status.is_empty() {
                config.default_status.clone()
            } else {
                status
            },
            raw: decision,
        });
    }

    // Last write wins in (file, row) order.
    accepted.sort_by(|a, b| {
        a.raw
            .batch_file
            .cmp(&b.raw.batch_file)
            .then(a.raw.row_index.cmp(&b.raw.row_index))
    });
    let mut seen = HashSet::new();
    let mut kept: Vec<Accepted<'a>> = accepted
        .into_iter()
        .rev()
        .filter(|a| seen.insert(a.dedup_key()))
        .collect();
    kept.reverse();
    kept
}

/// Apply reviewer decisions to `entries`.
///
/// Rows with an empty `decision_pos` (or no way to identify an entry) are
/// skipped silently; rows that cannot be applied are returned in `ignored`.
/// Re-applying the same decisions to the output changes nothing.
pub fn apply_manual_decisions(
    entries: &[WordbankEntry],
    decisions: &[ManualDecision],
    config: &ManualIntakeConfig,
) -> ManualOutcome {
    let mut ignored_rows = Vec::new();
    let accepted = validate(decisions, config, &mut ignored_rows);

    let index = EntryIndex::new(entries);
    let mut next = entries.to_vec();
    let mut applied = Vec::new();

    for decision in accepted {
        let ignore = |reason| {
            ignored(
                decision.raw,
                decision.entry_id.clone(),
                decision.pos.as_str(),
                &decision.status,
                reason,
            )
        };

        let by_id = decision
            .entry_id
            .as_deref()
            .and_then(|id| index.by_id.get(id).copied());
        let target = match by_id {
            Some(idx) => {
                let current = &entries[idx];
                if !decision.headword.is_empty() && decision.headword != current.headword_norm {
                    index
                        .resolve(&decision.headword, &decision.gloss)
                        .ok_or(IgnoreReason::EntryIdHeadwordMismatchUnresolved)
                } else if !decision.headword.is_empty()
                    && !decision.gloss.is_empty()
                    && !current.gloss.is_empty()
                    && decision.gloss != current.gloss
                {
                    index
                        .resolve(&decision.headword, &decision.gloss)
                        .ok_or(IgnoreReason::EntryIdMeaningMismatchUnresolved)
                } else {
                    Ok(idx)
                }
            }
            None => index.resolve(&decision.headword, &decision.gloss).ok_or(
                if index.headword_count(&decision.headword) > 1 {
                    IgnoreReason::HeadwordAmbiguous
                } else {
                    IgnoreReason::EntryNotFound
                },
            ),
        };

        let idx = match target {
            Ok(idx) => idx,
            Err(reason) => {
                ignored_rows.push(ignore(reason));
                continue;
            }
        };

        let before = &next[idx];
        let before_pos = before.pos;
        let changed = before_pos != decision.pos;
        debug!(
            entry_id = %before.entry_id,
            from = %before_pos,
            to = %decision.pos,
            "manual decision"
        );
        applied.push(ManualApplied {
            source_entry_id: decision.entry_id.clone(),
            entry_id: before.entry_id.clone(),
            headword_norm: before.headword_norm.clone(),
            before_pos,
            after_pos: decision.pos,
            changed,
            decision_reason: clean_text(&decision.raw.decision_reason),
            reviewer: clean_text(&decision.raw.reviewer),
            status: decision.status.clone(),
            batch_file: decision.raw.batch_file.clone(),
            row_index: decision.raw.row_index,
        });
        if changed {
            let updated = apply_override(
                before,
                &Override {
                    pos: decision.pos,
                    evidence: Evidence::ManualBatchConfirm,
                    confidence_floor: config.confidence_floor,
                },
            );
            next[idx] = updated;
        }
    }

    info!(
        applied = applied.len(),
        changed = applied.iter().filter(|a| a.changed).count(),
        ignored = ignored_rows.len(),
        "manual intake complete"
    );
    ManualOutcome {
        applied,
        ignored: ignored_rows,
        entries: next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triage::tests::entry;

    fn decision(
        id: Option<&str>,
        headword: &str,
        pos: &str,
        status: &str,
        row: usize,
    ) -> ManualDecision {
        ManualDecision {
            entry_id: id.map(String::from),
            headword_norm: headword.into(),
            decision_pos: pos.into(),
            status: status.into(),
            reviewer: "rk".into(),
            batch_file: "POS_MANUAL_BATCH_01.jsonl".into(),
            row_index: row,
            ..ManualDecision::default()
        }
    }

    fn snapshot() -> Vec<WordbankEntry> {
        let mut light = entry("WB000001", "light", Pos::Noun, 45, Evidence::FallbackNoun);
        light.gloss = "光".into();
        let mut run = entry("WB000002", "run", Pos::Verb, 84, Evidence::MeaningDictFormVerb);
        run.gloss = "走る".into();
        vec![light, run]
    }

    #[test]
    fn validation_reasons() {
        let rows = [
            decision(Some("WB000001"), "light", "verbish", "done", 1),
            decision(Some("WB000001"), "light", "adjective", "todo_prefill", 2),
            decision(Some("WB000001"), "light", "", "done", 3),
            decision(None, "", "adjective", "done", 4),
        ];
        let out = apply_manual_decisions(&snapshot(), &rows, &ManualIntakeConfig::default());
        let reasons: Vec<IgnoreReason> = out.ignored.iter().map(|i| i.reason).collect();
        assert_eq!(reasons, vec![IgnoreReason::InvalidDecisionPos, IgnoreReason::StatusNotReady]);
        assert!(out.applied.is_empty());
        assert_eq!(out.entries, snapshot());
    }

    #[test]
    fn last_row_wins_and_status_defaults() {
        let mut late = decision(Some("WB000001"), "light", "Adjective", "", 1);
        late.batch_file = "POS_MANUAL_BATCH_02.jsonl".into();
        let rows = [late, decision(Some("WB000001"), "light", "adverb", "done", 9)];
        let out = apply_manual_decisions(&snapshot(), &rows, &ManualIntakeConfig::default());
        assert_eq!(out.applied.len(), 1);
        let a = &out.applied[0];
        assert_eq!((a.before_pos, a.after_pos), (Pos::Noun, Pos::Adjective));
        assert_eq!(a.status, "done");
        assert!(a.changed);

        let light = &out.entries[0];
        assert_eq!(light.pos, Pos::Adjective);
        assert_eq!(light.pos_secondary, Some(Pos::Noun));
        assert_eq!(light.pos_evidence, Evidence::ManualBatchConfirm);
        assert_eq!(light.pos_confidence, 95);
    }

    #[test]
    fn mismatched_ids_resolve_by_headword() {
        let rows = [
            decision(Some("WB000001"), "run", "noun", "done", 1),
            decision(Some("WB000002"), "walk", "noun", "done", 2),
            decision(Some("WB999999"), "light", "adjective", "done", 3),
        ];
        let out = apply_manual_decisions(&snapshot(), &rows, &ManualIntakeConfig::default());
        let ids: Vec<&str> = out.applied.iter().map(|a| a.entry_id.as_str()).collect();
        assert_eq!(ids, vec!["WB000002", "WB000001"]);
        assert_eq!(out.applied[0].source_entry_id.as_deref(), Some("WB000001"));
        assert_eq!(out.ignored.len(), 1);
        assert_eq!(out.ignored[0].reason, IgnoreReason::EntryIdHeadwordMismatchUnresolved);
    }

    #[test]
    fn gloss_mismatch_and_ambiguity() {
        let mut entries = snapshot();
        let mut light2 =
            entry("WB000003", "light", Pos::Adjective, 86, Evidence::MeaningAdjectiveMarker);
        light2.gloss = "軽やかな".into();
        entries.push(light2);

        let mut by_gloss = decision(Some("WB000001"), "light", "verb", "done", 1);
        by_gloss.gloss = "軽やかな".into();
        let mut unresolved = decision(Some("WB000003"), "light", "noun", "done", 2);
        unresolved.gloss = "明かり".into();
        let ambiguous = decision(None, "light", "verb", "done", 3);

        let out = apply_manual_decisions(
            &entries,
            &[by_gloss, unresolved, ambiguous],
            &ManualIntakeConfig::default(),
        );
        assert_eq!(out.applied.len(), 1);
        assert_eq!(out.applied[0].entry_id, "WB000003");
        let reasons: Vec<IgnoreReason> = out.ignored.iter().map(|i| i.reason).collect();
        assert_eq!(
            reasons,
            vec![IgnoreReason::EntryIdMeaningMismatchUnresolved, IgnoreReason::HeadwordAmbiguous]
        );
    }

    #[test]
    fn reapplying_is_a_no_op() {
        let rows = [decision(Some("WB000001"), "light", "adjective", "approved", 1)];
        let cfg = ManualIntakeConfig::default();
        let once = apply_manual_decisions(&snapshot(), &rows, &cfg);
        let twice = apply_manual_decisions(&once.entries, &rows, &cfg);
        assert_eq!(twice.entries, once.entries);
        assert!(twice.applied.iter().all(|a| !a.changed));
    }
}
