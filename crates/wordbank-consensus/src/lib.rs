//! Cross-source POS consensus for wordbank entries.
//!
//! Records from several vocabulary books are merged into one entry per
//! headword by weighted vote ([`aggregate`]). Risky entries are triaged
//! ([`triage`]) and pass through staged confirmation ([`confirm`]): a HIGH pass,
//! a MEDIUM pass, quick-win suggestions from the residual queue ([`queue`]) and
//! finally reviewer decisions ([`manual`]). [`Pipeline`] runs the stages in
//! order and keeps every intermediate snapshot.
//!
//! ```rust
//! use wordbank_consensus::{EngineConfig, Pipeline, SourceRow, SlotValue};
//! use wordbank_types::Pos;
//!
//! let row = SourceRow {
//!     book: "DUO3.0".into(),
//!     number: SlotValue::Int(12),
//!     headword: "run".into(),
//!     gloss: "走る".into(),
//!     source_path: String::new(),
//!     source_label: String::new(),
//!     source_priority: 0,
//!     method: String::new(),
//! };
//! let records: Vec<_> = row.into_record().into_iter().collect();
//! let run = Pipeline::new(EngineConfig::default()).run(&records, &[]);
//! assert_eq!(run.final_entries()[0].pos, Pos::Verb);
//! assert!(run.integrity.passed());
//! ```

pub mod aggregate;
pub mod confirm;
pub mod manual;
pub mod pipeline;
pub mod queue;
pub mod source;
pub mod stage;
pub mod triage;

pub use aggregate::{Aggregator, ScoringConfig, SkipReason, admissibility, assign_entry_ids};
pub use confirm::{
    ConfirmOutcome, Decision, Override, apply_override, apply_quickwin, confirm_priority_pos,
    decide,
};
pub use manual::{ManualIntakeConfig, ManualOutcome, apply_manual_decisions};
pub use pipeline::{EngineConfig, IntegritySummary, Pipeline, PipelineRun};
pub use queue::{
    BatchRow, BatchSummary, ManualQueue, PrefillRule, QueueItem, ReviewerBatch, Suggestion,
    build_manual_queue, prefill, split_batches, suggest,
};
pub use source::{SlotValue, SourceRow, is_classical_book, quality_score};
pub use stage::{StageAssignment, StageRule, StageRules};
pub use triage::{TriageConfig, priority_for, review_score, triage};
