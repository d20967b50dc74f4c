//! Remote contact-entry model.
//!
//! Entries are owned by the remote contacts service. The core never invents
//! entry identifiers; it only mutates title, phone numbers, and group
//! memberships in place before an entry is queued for upload.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier assigned by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Wraps an identifier received from the service.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A phone number on a remote entry.
///
/// `rel` is the raw relation URI exactly as the service reported it;
/// reconciliation never rewrites the relation of an existing number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPhone {
    pub rel: String,
    pub text: String,
}

/// An email address on a remote entry. Carried in the model but never
/// reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryEmail {
    pub rel: String,
    pub address: String,
}

/// Membership of an entry in a remote group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMembership {
    pub href: String,
}

/// Reference to a remote group contacts can be filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub href: String,
}

impl Group {
    /// Wraps a group href received from the service.
    #[must_use]
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }
}

/// One contact record in the remote contacts service.
///
/// `id` is `None` exactly for entries materialized locally and not yet
/// inserted; the service assigns the identifier on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub phone_numbers: Vec<EntryPhone>,
    #[serde(default)]
    pub emails: Vec<EntryEmail>,
    #[serde(default)]
    pub group_memberships: Vec<GroupMembership>,
}

impl RemoteEntry {
    /// Returns the entry title when present and non-empty.
    #[must_use]
    pub fn display_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    /// Returns true if the entry already belongs to the group.
    #[must_use]
    pub fn is_member_of(&self, group: &Group) -> bool {
        self.group_memberships.iter().any(|m| m.href == group.href)
    }
}
