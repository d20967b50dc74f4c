//! # Mergebook - contact merge engine
//!
//! Mergebook reconciles a list of contacts scraped from an external phone
//! book into a remote contacts account. Each submitted contact either
//! merges into an existing remote entry, found with a fuzzy
//! name/phone-number heuristic, or becomes a new entry; resulting inserts
//! and updates are submitted in bounded batches.
//!
//! ## Core Concepts
//!
//! - **SubmittedContact**: one parsed contact from an uploaded JSON payload
//! - **RemoteFeed / RemoteEntry**: a point-in-time snapshot of the remote
//!   account and its entries
//! - **Suffix match**: two numbers are the same line when their last 7
//!   digits agree
//! - **ChangeRecord**: the field-level changes applied to a matched entry;
//!   empty means the entry was already consistent
//! - **Preview**: a dry run computing every change without committing any
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mergebook::{InMemoryContactsService, MergeEngine, MergeOptions, parse_contacts};
//!
//! let service = Arc::new(InMemoryContactsService::new());
//! let engine = MergeEngine::new(service);
//!
//! let contacts = parse_contacts(r#"[
//!     {"name": "Jane Doe",
//!      "numbers": [{"type": "mobile", "number": "(206) 555-1212"}]}
//! ]"#)?;
//!
//! let preview = engine.merge(&contacts, &MergeOptions::preview())?;
//! let report = engine.merge(&contacts, &MergeOptions::commit().with_group("Imported"))?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod batch;
pub mod contact;
pub mod engine;
pub mod entry;
pub mod error;
pub mod feed;
pub mod matcher;
pub mod phone;
pub mod reconcile;
pub mod service;
pub mod submission;

// Re-export primary types at the crate root for convenience
pub use batch::{BatchSubmitter, NoopSubmitter, OpKind, PendingOp, Updater, BATCH_LIMIT};
pub use contact::{parse_contacts, Handle, SubmittedContact, SubmittedNumber};
pub use engine::{MergeAction, MergeEngine, MergeMode, MergeOptions, MergeOutcome, MergeReport};
pub use entry::{EntryEmail, EntryId, EntryPhone, Group, GroupMembership, RemoteEntry};
pub use error::{MergeError, MergeResult, ServiceError, StoreError, ValidationError};
pub use feed::RemoteFeed;
pub use matcher::find_match;
pub use phone::{normalize_digits, obfuscate_tail, suffix_match, RelationType};
pub use reconcile::{apply_changes, build_new_entry, Change, ChangeRecord};
pub use service::{ContactsService, InMemoryContactsService, ServiceSubmitter};
pub use submission::{
    ContactPreview, InMemorySubmissionStore, PreviewNumber, Submission, SubmissionId,
    SubmissionStore,
};

#[cfg(feature = "transport-http")]
pub use service::http::{HttpConfig, HttpContactsService};
