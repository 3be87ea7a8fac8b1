//! Automatic confirmation passes.
//!
//! Every pass reads one snapshot and returns a new one plus an audit record
//! per evaluation. All POS changes go through [`apply_override`], so a change
//! always leaves the prior primary POS in `pos_secondary`.

use std::collections::HashMap;

use tracing::info;
use wordbank_pos::{Lexicon, gloss_marker_pos};
use wordbank_types::{
    ConfirmTier, ConfirmationRecord, Evidence, OverrideMethod, Pos, ReviewCandidate,
    WordbankEntry,
};

use crate::queue::QueueItem;

pub const HEADWORD_RULE_CONFIDENCE: f64 = 0.98;
pub const OVERRIDE_CONFIDENCE: f64 = 0.9;
pub const KEEP_CONFIDENCE: f64 = 0.7;
pub const QUICKWIN_CONFIDENCE_FLOOR: u8 = 88;

/// A requested POS change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Override {
    pub pos: Pos,
    pub evidence: Evidence,
    /// The entry's confidence is raised to at least this value.
    pub confidence_floor: u8,
}

/// Apply one change to an entry, returning the new entry. A change to the
/// POS the entry already has returns an identical copy.
pub fn apply_override(entry: &WordbankEntry, change: &Override) -> WordbankEntry {
    let mut next = entry.clone();
    if change.pos == entry.pos {
        return next;
    }
    next.pos_secondary = Some(entry.pos);
    next.pos = change.pos;
    next.pos_vote_count = entry.votes.get(change.pos);
    next.is_multi_pos = true;
    next.pos_evidence = change.evidence;
    next.pos_confidence = entry.pos_confidence.max(change.confidence_floor);
    next.refresh_group();
    next
}

/// Outcome of one rule evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct Decision {
    pub pos: Pos,
    pub method: OverrideMethod,
    pub reason: String,
}

impl Decision {
    fn keep(pos: Pos) -> Self {
        Self {
            pos,
            method: OverrideMethod::KeepCurrent,
            reason: "no_override_rule".to_string(),
        }
    }

    pub fn changes(&self, current: Pos) -> bool {
        self.pos != current
    }

    /// 0.98 for headword-list overrides, 0.9 for other changes, 0.7 to keep.
    pub fn confidence(&self, current: Pos) -> f64 {
        if self.method.is_headword_rule() {
            HEADWORD_RULE_CONFIDENCE
        } else if self.changes(current) {
            OVERRIDE_CONFIDENCE
        } else {
            KEEP_CONFIDENCE
        }
    }
}

/// `max(floor, ⌊count × tenths / 10⌋)`
pub(crate) fn vote_threshold(floor: u32, count: u32, tenths: u32) -> u32 {
    floor.max(count * tenths / 10)
}

/// Evaluate the confirmation rules for one entry, first match wins:
/// headword lists, a gloss marker backed by secondary votes, then a
/// fallback-noun entry with a well-supported secondary POS.
pub fn decide(entry: &WordbankEntry, lexicon: &Lexicon) -> Decision {
    let current = entry.pos;
    let primary_count = entry.votes.get(current);
    let secondary_count = entry.pos_secondary.map_or(0, |pos| entry.votes.get(pos));

    if lexicon.is_adverb_headword(&entry.headword_norm) && current != Pos::Adverb {
        return Decision {
            pos: Pos::Adverb,
            method: OverrideMethod::HeadwordAdverbOverride,
            reason: "explicit_adverb_headword_list".to_string(),
        };
    }
    if lexicon.is_adjective_headword(&entry.headword_norm) && current != Pos::Adjective {
        return Decision {
            pos: Pos::Adjective,
            method: OverrideMethod::HeadwordAdjectiveOverride,
            reason: "explicit_adjective_headword_list".to_string(),
        };
    }

    match gloss_marker_pos(&entry.gloss) {
        // A marker that disagrees decides on its own; the fallback rule is
        // only consulted when there is no disagreeing marker.
        Some(marker) if marker != current => {
            let backed = entry.pos_secondary == Some(marker)
                && secondary_count >= vote_threshold(3, primary_count, 8);
            let backed_verb = marker == Pos::Verb
                && entry.pos_secondary == Some(Pos::Verb)
                && secondary_count >= vote_threshold(3, primary_count, 7);
            if backed || backed_verb {
                return Decision {
                    pos: marker,
                    method: OverrideMethod::MeaningMarkerOverride,
                    reason: format!("meaning_marker_with_votes:{marker}"),
                };
            }
        }
        _ => {
            if let Some(secondary) = entry.pos_secondary
                && current == Pos::Noun
                && entry.pos_evidence == Evidence::FallbackNoun
                && secondary != current
                && secondary_count >= 4
                && secondary_count >= vote_threshold(3, primary_count, 6)
            {
                return Decision {
                    pos: secondary,
                    method: OverrideMethod::SecondaryVoteOverride,
                    reason: format!("fallback_noun_with_secondary_votes:{secondary}"),
                };
            }
        }
    }

    Decision::keep(current)
}

/// Result of a confirmation pass: audit rows and the next snapshot.
#[derive(Clone, Debug, Default)]
pub struct ConfirmOutcome {
    pub confirmations: Vec<ConfirmationRecord>,
    pub entries: Vec<WordbankEntry>,
}

impl ConfirmOutcome {
    pub fn changed_count(&self) -> usize {
        self.confirmations.iter().filter(|c| c.changed).count()
    }

    pub fn unchanged_ids(&self) -> impl Iterator<Item = &str> {
        self.confirmations
            .iter()
            .filter(|c| !c.changed)
            .map(|c| c.entry_id.as_str())
    }
}

fn index_by_id(entries: &[WordbankEntry]) -> HashMap<&str, usize> {
    entries
        .iter()
        .enumerate()
        .map(|(idx, e)| (e.entry_id.as_str(), idx))
        .collect()
}

/// Run the confirmation rules over the review candidates of `tier`'s
/// priority. Candidates whose entry id is unknown are skipped.
pub fn confirm_priority_pos(
    entries: &[WordbankEntry],
    review: &[ReviewCandidate],
    tier: ConfirmTier,
    lexicon: &Lexicon,
) -> ConfirmOutcome {
    let index = index_by_id(entries);
    let mut next = entries.to_vec();
    let mut confirmations = Vec::new();

    for candidate in review.iter().filter(|c| c.priority == tier.priority()) {
        let Some(&idx) = index.get(candidate.entry_id.as_str()) else {
            continue;
        };
        let entry = &entries[idx];
        let decision = decide(entry, lexicon);
        let changed = decision.changes(entry.pos);
        let confidence = decision.confidence(entry.pos);

        if changed {
            next[idx] = apply_override(
                entry,
                &Override {
                    pos: decision.pos,
                    evidence: Evidence::Confirmed {
                        tier,
                        method: decision.method,
                    },
                    confidence_floor: (confidence * 100.0).round() as u8,
                },
            );
        }

        confirmations.push(ConfirmationRecord {
            entry_id: entry.entry_id.clone(),
            headword: entry.headword.clone(),
            headword_norm: entry.headword_norm.clone(),
            gloss: entry.gloss.clone(),
            current_pos: entry.pos,
            confirmed_pos: decision.pos,
            changed,
            method: decision.method,
            reason: decision.reason,
            pos_confidence_before: entry.pos_confidence,
            confirmation_confidence: confidence,
            votes: entry.votes.clone(),
            review_priority: tier.priority(),
        });
    }

    let outcome = ConfirmOutcome {
        confirmations,
        entries: next,
    };
    info!(
        tier = tier.evidence_prefix(),
        evaluated = outcome.confirmations.len(),
        changed = outcome.changed_count(),
        "confirmation pass complete"
    );
    outcome
}

/// Apply quick-win suggestions whose POS differs from the entry's current POS.
pub fn apply_quickwin(entries: &[WordbankEntry], quickwin: &[QueueItem]) -> ConfirmOutcome {
    let index = index_by_id(entries);
    let mut next = entries.to_vec();
    let mut confirmations = Vec::new();

    for item in quickwin {
        let Some(suggestion) = &item.suggestion else {
            continue;
        };
        let Some(&idx) = index.get(item.candidate.entry_id.as_str()) else {
            continue;
        };
        let entry = &entries[idx];
        if entry.pos == suggestion.pos {
            continue;
        }
        next[idx] = apply_override(
            entry,
            &Override {
                pos: suggestion.pos,
                evidence: Evidence::QuickWinConfirm,
                confidence_floor: QUICKWIN_CONFIDENCE_FLOOR,
            },
        );
        confirmations.push(ConfirmationRecord {
            entry_id: entry.entry_id.clone(),
            headword: entry.headword.clone(),
            headword_norm: entry.headword_norm.clone(),
            gloss: entry.gloss.clone(),
            current_pos: entry.pos,
            confirmed_pos: suggestion.pos,
            changed: true,
            method: OverrideMethod::QuickWinAuto,
            reason: suggestion.reason.clone(),
            pos_confidence_before: entry.pos_confidence,
            confirmation_confidence: f64::from(QUICKWIN_CONFIDENCE_FLOOR) / 100.0,
            votes: entry.votes.clone(),
            review_priority: item.candidate.priority,
        });
    }

    info!(applied = confirmations.len(), "quick-win pass complete");
    ConfirmOutcome {
        confirmations,
        entries: next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triage::tests::{entry, with_votes};
    use crate::triage::{TriageConfig, triage};

    #[test]
    fn override_moves_primary_to_secondary() {
        let before = with_votes(
            entry("WB000001", "light", Pos::Noun, 45, Evidence::FallbackNoun),
            "noun:3 | adjective:2",
            Pos::Adjective,
            10.0,
        );
        let after = apply_override(
            &before,
            &Override {
                pos: Pos::Adjective,
                evidence: Evidence::ManualBatchConfirm,
                confidence_floor: 95,
            },
        );
        assert_eq!(after.pos, Pos::Adjective);
        assert_eq!(after.pos_secondary, Some(Pos::Noun));
        assert_eq!(after.pos_vote_count, 2);
        assert_eq!(after.pos_confidence, 95);
        assert_eq!(after.pos_evidence, Evidence::ManualBatchConfirm);
        assert_eq!(after.group_id, "S03_ADJECTIVE_L");
        assert_eq!(after.group_order, 3);
        // Untouched input snapshot.
        assert_eq!(before.pos, Pos::Noun);

        let same = apply_override(
            &after,
            &Override {
                pos: Pos::Adjective,
                evidence: Evidence::QuickWinConfirm,
                confidence_floor: 99,
            },
        );
        assert_eq!(same, after);
    }

    #[test]
    fn headword_lists_override_first() {
        let lex = Lexicon::default();
        let e = entry("WB000001", "often", Pos::Noun, 45, Evidence::FallbackNoun);
        let d = decide(&e, &lex);
        assert_eq!(d.pos, Pos::Adverb);
        assert_eq!(d.method, OverrideMethod::HeadwordAdverbOverride);
        assert_eq!(d.confidence(Pos::Noun), 0.98);

        let e = entry("WB000002", "afraid", Pos::Verb, 70, Evidence::VerbSuffix);
        assert_eq!(decide(&e, &lex).method, OverrideMethod::HeadwordAdjectiveOverride);
    }

    #[test]
    fn marker_needs_secondary_votes() {
        let lex = Lexicon::default();
        let mut e = with_votes(
            entry("WB000001", "study", Pos::Noun, 65, Evidence::MeaningNounMarker),
            "noun:4 | verb:3",
            Pos::Verb,
            20.0,
        );
        e.gloss = "勉強する".into();
        // verb threshold is max(3, ⌊4 × 0.7⌋) = 3
        let d = decide(&e, &lex);
        assert_eq!(d.pos, Pos::Verb);
        assert_eq!(d.reason, "meaning_marker_with_votes:verb");

        e.votes = wordbank_types::VoteCounts::parse("noun:5 | verb:2");
        assert_eq!(decide(&e, &lex).method, OverrideMethod::KeepCurrent);
    }

    #[test]
    fn disagreeing_marker_blocks_fallback_rule() {
        let lex = Lexicon::default();
        let mut e = with_votes(
            entry("WB000001", "light", Pos::Noun, 45, Evidence::FallbackNoun),
            "noun:5 | adjective:4",
            Pos::Adjective,
            10.0,
        );
        e.gloss = "勉強する".into();
        // Marker says verb with no verb votes; the fallback rule is not tried.
        assert_eq!(decide(&e, &lex).method, OverrideMethod::KeepCurrent);

        e.gloss = "光".into();
        let d = decide(&e, &lex);
        assert_eq!(d.pos, Pos::Adjective);
        assert_eq!(d.method, OverrideMethod::SecondaryVoteOverride);
        assert_eq!(d.reason, "fallback_noun_with_secondary_votes:adjective");
    }

    #[test]
    fn fallback_rule_needs_four_secondary_votes() {
        let lex = Lexicon::default();
        let e = with_votes(
            entry("WB000001", "light", Pos::Noun, 45, Evidence::FallbackNoun),
            "noun:3 | adjective:3",
            Pos::Adjective,
            10.0,
        );
        assert_eq!(decide(&e, &lex).method, OverrideMethod::KeepCurrent);
    }

    #[test]
    fn priority_pass_records_every_evaluation() {
        let lex = Lexicon::default();
        let mut often = entry("WB000001", "often", Pos::Noun, 45, Evidence::FallbackNoun);
        often.pos_score_margin = 10.0;
        let light = with_votes(
            entry("WB000002", "light", Pos::Noun, 45, Evidence::FallbackNoun),
            "noun:3 | adjective:1",
            Pos::Adjective,
            10.0,
        );
        let entries = vec![often, light];
        let review = triage(&entries, &TriageConfig::default());
        assert!(review.iter().all(|c| c.priority == wordbank_types::ReviewPriority::High));

        let out = confirm_priority_pos(&entries, &review, ConfirmTier::High, &lex);
        assert_eq!(out.confirmations.len(), 2);
        assert_eq!(out.changed_count(), 1);
        assert_eq!(out.unchanged_ids().collect::<Vec<_>>(), vec!["WB000002"]);

        let often = &out.entries[0];
        assert_eq!(often.pos, Pos::Adverb);
        assert_eq!(often.pos_secondary, Some(Pos::Noun));
        assert_eq!(often.pos_confidence, 98);
        assert_eq!(often.pos_evidence.to_string(), "high_confirm:headword_adverb_override");

        let medium = confirm_priority_pos(&entries, &review, ConfirmTier::Medium, &lex);
        assert!(medium.confirmations.is_empty());
        assert_eq!(medium.entries, entries);
    }
}
