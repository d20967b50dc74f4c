//! Batched insert/update submission.
//!
//! The updater queues pending operations and flushes them to the remote
//! service in bounded batches. A flush is atomic-or-nothing from the
//! core's perspective: the queue is handed over whole and cleared
//! unconditionally, and a failed submit is fatal for the request.

use serde::{Deserialize, Serialize};

use crate::entry::RemoteEntry;
use crate::error::ServiceError;

/// Maximum operations per batch. The remote service accepts around 100;
/// 50 keeps a comfortable margin.
pub const BATCH_LIMIT: usize = 50;

/// Kind of a pending operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Insert,
    Update,
}

/// One queued insert/update awaiting flush.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOp {
    pub kind: OpKind,
    pub entry: RemoteEntry,
}

/// Submission strategy behind the updater.
///
/// A live submitter forwards batches to the remote service; the no-op
/// submitter backs preview runs, where the full matching/reconciliation
/// pass executes but nothing is queued or sent.
pub trait BatchSubmitter: Send + Sync {
    /// Submits one batch in a single remote call.
    fn submit(&self, ops: &[PendingOp]) -> Result<(), ServiceError>;

    /// Whether enqueued operations should be kept at all. Non-committing
    /// submitters turn `add_insert`/`add_update` into pure no-ops.
    fn commits(&self) -> bool {
        true
    }
}

/// Submitter for preview runs. Never queues and never submits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSubmitter;

impl BatchSubmitter for NoopSubmitter {
    fn submit(&self, _ops: &[PendingOp]) -> Result<(), ServiceError> {
        Ok(())
    }

    fn commits(&self) -> bool {
        false
    }
}

/// Bounded queue of pending operations for one merge request.
pub struct Updater {
    pending: Vec<PendingOp>,
    submitter: Box<dyn BatchSubmitter>,
    batches_submitted: usize,
}

impl Updater {
    /// Creates an updater over the given submission strategy.
    #[must_use]
    pub fn new(submitter: Box<dyn BatchSubmitter>) -> Self {
        Self {
            pending: Vec::new(),
            submitter,
            batches_submitted: 0,
        }
    }

    /// Creates a preview updater that never submits.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(NoopSubmitter))
    }

    /// Queues an insert of a new entry.
    pub fn add_insert(&mut self, entry: RemoteEntry) -> Result<(), ServiceError> {
        self.enqueue(OpKind::Insert, entry)
    }

    /// Queues an update of an existing entry.
    pub fn add_update(&mut self, entry: RemoteEntry) -> Result<(), ServiceError> {
        self.enqueue(OpKind::Update, entry)
    }

    fn enqueue(&mut self, kind: OpKind, entry: RemoteEntry) -> Result<(), ServiceError> {
        if !self.submitter.commits() {
            return Ok(());
        }
        self.pending.push(PendingOp { kind, entry });
        if self.pending.len() >= BATCH_LIMIT {
            self.flush()?;
        }
        Ok(())
    }

    /// Submits everything pending as one batch.
    ///
    /// No-op on an empty queue. The queue is cleared before the remote
    /// call, so there is no retry state: a submit error propagates and the
    /// operations it carried are gone.
    pub fn flush(&mut self) -> Result<(), ServiceError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let batch = std::mem::take(&mut self.pending);
        self.batches_submitted += 1;
        self.submitter.submit(&batch)
    }

    /// Number of operations currently queued.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of batches handed to the submitter so far.
    #[must_use]
    pub const fn batches_submitted(&self) -> usize {
        self.batches_submitted
    }
}
