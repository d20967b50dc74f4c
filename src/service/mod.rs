//! Remote contacts-service boundary.
//!
//! The trait defines the four calls the merge core makes against the
//! remote account. An in-memory implementation backs tests and embedded
//! use; a blocking HTTP implementation is available behind the
//! `transport-http` feature.

use std::collections::HashMap;
use std::sync::Arc;

use crate::batch::{BatchSubmitter, PendingOp};
use crate::entry::Group;
use crate::error::ServiceError;
use crate::feed::RemoteFeed;

mod memory;

#[cfg(feature = "transport-http")]
pub mod http;

pub use memory::InMemoryContactsService;

/// Contract for the remote contacts account.
///
/// Errors from these calls propagate to the caller unchanged; the core
/// does not retry them.
pub trait ContactsService: Send + Sync {
    /// Fetches the full entry feed. Called once per merge operation.
    fn fetch_feed(&self) -> Result<RemoteFeed, ServiceError>;

    /// Fetches the group directory as a name-to-href mapping.
    fn fetch_groups(&self) -> Result<HashMap<String, String>, ServiceError>;

    /// Creates a group with the given name.
    fn create_group(&self, name: &str) -> Result<Group, ServiceError>;

    /// Applies one batch of pending operations in a single call.
    fn submit_batch(&self, ops: &[PendingOp]) -> Result<(), ServiceError>;
}

/// Live submitter delegating batch submission to a contacts service.
pub struct ServiceSubmitter {
    service: Arc<dyn ContactsService>,
}

impl ServiceSubmitter {
    /// Wraps a contacts service as a batch-submission strategy.
    #[must_use]
    pub fn new(service: Arc<dyn ContactsService>) -> Self {
        Self { service }
    }
}

impl BatchSubmitter for ServiceSubmitter {
    fn submit(&self, ops: &[PendingOp]) -> Result<(), ServiceError> {
        self.service.submit_batch(ops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time test: the service trait stays object-safe.
    fn _assert_service_object_safe(_: &dyn ContactsService) {}
}
