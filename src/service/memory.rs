//! In-memory contacts service.
//!
//! Thread-safe reference implementation of the service boundary, used by
//! tests and embedded callers. It owns entry-identifier assignment the
//! way the real service does, and records every submitted batch so tests
//! can assert on what would have gone over the wire.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use chrono::Utc;

use crate::batch::{OpKind, PendingOp};
use crate::entry::{EntryId, Group, RemoteEntry};
use crate::error::ServiceError;
use crate::feed::RemoteFeed;
use crate::service::ContactsService;

const ENTRY_BASE: &str = "http://www.google.com/m8/feeds/contacts/default/base";
const GROUP_BASE: &str = "http://www.google.com/m8/feeds/groups/default/base";

fn lock_err(context: &'static str) -> ServiceError {
    ServiceError::Backend(format!("poisoned lock: {context}"))
}

#[derive(Debug, Default)]
struct ServiceState {
    entries: Vec<RemoteEntry>,
    groups: HashMap<String, String>,
    batches: Vec<Vec<PendingOp>>,
    next_entry: usize,
    next_group: usize,
}

/// Thread-safe in-memory implementation of [`ContactsService`].
#[derive(Debug, Default)]
pub struct InMemoryContactsService {
    state: RwLock<ServiceState>,
    fail_submits: AtomicBool,
}

impl InMemoryContactsService {
    /// Creates an empty service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry to the account, assigning it an identifier.
    /// Returns the assigned ID.
    pub fn add_entry(&self, mut entry: RemoteEntry) -> Result<EntryId, ServiceError> {
        let mut state = self.state.write().map_err(|_| lock_err("add_entry"))?;
        let id = EntryId::new(format!("{ENTRY_BASE}/{}", state.next_entry));
        state.next_entry += 1;
        entry.id = Some(id.clone());
        state.entries.push(entry);
        Ok(id)
    }

    /// Seeds a group, returning its href.
    pub fn add_group(&self, name: &str) -> Result<String, ServiceError> {
        let mut state = self.state.write().map_err(|_| lock_err("add_group"))?;
        let href = format!("{GROUP_BASE}/{}", state.next_group);
        state.next_group += 1;
        state.groups.insert(name.to_string(), href.clone());
        Ok(href)
    }

    /// Makes every subsequent batch submit fail with a server error.
    pub fn set_fail_submits(&self, fail: bool) {
        self.fail_submits.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of the entries currently in the account.
    pub fn entries(&self) -> Result<Vec<RemoteEntry>, ServiceError> {
        let state = self.state.read().map_err(|_| lock_err("entries"))?;
        Ok(state.entries.clone())
    }

    /// Batches submitted so far, oldest first.
    pub fn submitted_batches(&self) -> Result<Vec<Vec<PendingOp>>, ServiceError> {
        let state = self.state.read().map_err(|_| lock_err("submitted_batches"))?;
        Ok(state.batches.clone())
    }
}

impl ContactsService for InMemoryContactsService {
    fn fetch_feed(&self) -> Result<RemoteFeed, ServiceError> {
        let state = self.state.read().map_err(|_| lock_err("fetch_feed"))?;
        Ok(RemoteFeed::new(state.entries.clone(), Utc::now()))
    }

    fn fetch_groups(&self) -> Result<HashMap<String, String>, ServiceError> {
        let state = self.state.read().map_err(|_| lock_err("fetch_groups"))?;
        Ok(state.groups.clone())
    }

    fn create_group(&self, name: &str) -> Result<Group, ServiceError> {
        if name.trim().is_empty() {
            return Err(ServiceError::GroupCreationFailed {
                name: name.to_string(),
                message: "group name is empty".to_string(),
            });
        }
        let href = self.add_group(name)?;
        Ok(Group::new(href))
    }

    fn submit_batch(&self, ops: &[PendingOp]) -> Result<(), ServiceError> {
        if self.fail_submits.load(Ordering::SeqCst) {
            return Err(ServiceError::ServerError {
                code: 500,
                message: "batch rejected".to_string(),
            });
        }

        let mut state = self.state.write().map_err(|_| lock_err("submit_batch"))?;
        state.batches.push(ops.to_vec());

        for op in ops {
            match op.kind {
                OpKind::Insert => {
                    let id = EntryId::new(format!("{ENTRY_BASE}/{}", state.next_entry));
                    state.next_entry += 1;
                    let mut entry = op.entry.clone();
                    entry.id = Some(id);
                    state.entries.push(entry);
                }
                OpKind::Update => {
                    let Some(id) = op.entry.id.clone() else {
                        return Err(ServiceError::InvalidResponse {
                            message: "update without an entry id".to_string(),
                        });
                    };
                    let Some(existing) = state
                        .entries
                        .iter_mut()
                        .find(|e| e.id.as_ref() == Some(&id))
                    else {
                        return Err(ServiceError::InvalidResponse {
                            message: format!("update of unknown entry {id}"),
                        });
                    };
                    *existing = op.entry.clone();
                }
            }
        }
        Ok(())
    }
}
