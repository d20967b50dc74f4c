//! Merge-run audit report.
//!
//! The report is the engine's only output surface: the core performs no
//! logging, so preview display and commit auditing both read from here.

use serde::{Deserialize, Serialize};

use crate::engine::MergeMode;
use crate::entry::EntryId;
use crate::reconcile::ChangeRecord;

/// What happened to one submitted contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MergeAction {
    /// The contact merged into an existing entry.
    MergedInto {
        entry_id: Option<EntryId>,
        title: Option<String>,
    },
    /// No entry matched; a new one was materialized.
    Created,
}

/// Per-contact audit record, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOutcome {
    pub contact_name: String,
    #[serde(flatten)]
    pub action: MergeAction,
    pub changes: ChangeRecord,
}

/// Result of one merge run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    pub mode: MergeMode,
    pub outcomes: Vec<MergeOutcome>,
    pub matched: usize,
    pub created: usize,
    pub batches_submitted: usize,
}

impl MergeReport {
    /// Total number of field-level changes across matched entries.
    #[must_use]
    pub fn total_changes(&self) -> usize {
        self.outcomes.iter().map(|o| o.changes.len()).sum()
    }
}
