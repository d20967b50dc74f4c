//! Uploaded-payload persistence.
//!
//! A submission is the raw JSON blob a user uploaded, filed under a
//! handle, kept so the merge can run (and be previewed) in a later
//! request. Re-uploading under the same handle replaces the earlier
//! submission.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contact::{parse_contacts, Handle, SubmittedContact};
use crate::error::{StoreError, ValidationError};

/// Locally-owned submission identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(Uuid);

impl SubmissionId {
    /// Creates a new random submission ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One stored upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub handle: Handle,
    /// The uploaded JSON payload, verbatim.
    pub payload: String,
    /// Destination group name, when one was supplied with the upload.
    pub group: Option<String>,
    pub touch_time: DateTime<Utc>,
}

impl Submission {
    /// Creates a submission stamped with the current time.
    #[must_use]
    pub fn new(handle: Handle, payload: impl Into<String>, group: Option<String>) -> Self {
        Self {
            id: SubmissionId::new(),
            handle,
            payload: payload.into(),
            group,
            touch_time: Utc::now(),
        }
    }

    /// Parses the stored payload into a contact list.
    pub fn contacts(&self) -> Result<Vec<SubmittedContact>, ValidationError> {
        parse_contacts(&self.payload)
    }

    /// Per-contact display data with phone numbers masked.
    pub fn preview(&self) -> Result<Vec<ContactPreview>, ValidationError> {
        let contacts = self.contacts()?;
        Ok(contacts
            .into_iter()
            .map(|contact| ContactPreview {
                numbers: contact
                    .numbers
                    .iter()
                    .map(|n| PreviewNumber {
                        label: n.label.clone(),
                        number: n.obfuscated(),
                    })
                    .collect(),
                name: contact.name,
                image_url: contact.image_url,
            })
            .collect())
    }
}

/// Display form of one submitted contact, numbers obfuscated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPreview {
    pub name: String,
    pub image_url: Option<String>,
    pub numbers: Vec<PreviewNumber>,
}

/// Display form of one submitted number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewNumber {
    pub label: String,
    pub number: String,
}

/// Storage contract for submissions.
pub trait SubmissionStore: Send + Sync {
    /// Stores a submission. A submission with the same handle is
    /// replaced; the stored touch time is refreshed.
    fn put(&self, submission: Submission) -> Result<(), StoreError>;

    /// Fetches a submission by ID.
    fn get(&self, id: SubmissionId) -> Result<Option<Submission>, StoreError>;

    /// Fetches the submission filed under a handle.
    fn find_by_handle(&self, handle: &Handle) -> Result<Option<Submission>, StoreError>;

    /// Fetches a submission by ID, failing when it no longer exists
    /// (replaced by a later upload under the same handle, or never
    /// stored).
    fn fetch(&self, id: SubmissionId) -> Result<Submission, StoreError> {
        self.get(id)?.ok_or(StoreError::SubmissionNotFound(id))
    }
}

fn lock_err(context: &'static str) -> StoreError {
    StoreError::Backend(format!("poisoned lock: {context}"))
}

#[derive(Debug, Default)]
struct SubmissionState {
    by_handle: HashMap<Handle, Submission>,
    id_to_handle: HashMap<SubmissionId, Handle>,
}

/// Thread-safe in-memory submission store, for tests and embedded use.
#[derive(Debug, Default)]
pub struct InMemorySubmissionStore {
    state: RwLock<SubmissionState>,
}

impl InMemorySubmissionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubmissionStore for InMemorySubmissionStore {
    fn put(&self, mut submission: Submission) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(|_| lock_err("put"))?;
        submission.touch_time = Utc::now();
        if let Some(previous) = state.by_handle.get(&submission.handle) {
            let previous_id = previous.id;
            state.id_to_handle.remove(&previous_id);
        }
        state
            .id_to_handle
            .insert(submission.id, submission.handle.clone());
        state.by_handle.insert(submission.handle.clone(), submission);
        Ok(())
    }

    fn get(&self, id: SubmissionId) -> Result<Option<Submission>, StoreError> {
        let state = self.state.read().map_err(|_| lock_err("get"))?;
        Ok(state
            .id_to_handle
            .get(&id)
            .and_then(|handle| state.by_handle.get(handle))
            .cloned())
    }

    fn find_by_handle(&self, handle: &Handle) -> Result<Option<Submission>, StoreError> {
        let state = self.state.read().map_err(|_| lock_err("find_by_handle"))?;
        Ok(state.by_handle.get(handle).cloned())
    }
}
