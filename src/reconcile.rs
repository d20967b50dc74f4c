//! Field-level reconciliation.
//!
//! Merges a submitted contact into a remote entry in place, computing the
//! minimal set of changes needed without destroying existing remote data.
//! The change record doubles as the audit/preview surface: an empty record
//! means the entry is already consistent.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::contact::SubmittedContact;
use crate::entry::{EntryPhone, Group, GroupMembership, RemoteEntry};
use crate::phone::{suffix_match, RelationType};

/// One field-level change applied to an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    SetName {
        name: String,
    },
    AddNumber {
        number: String,
    },
    AddToGroup,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetName { name } => write!(f, "set name: {name}"),
            Self::AddNumber { number } => write!(f, "adding number: {number}"),
            Self::AddToGroup => write!(f, "adding to group."),
        }
    }
}

/// Changes applied to one entry, in detection order: name, then numbers in
/// submission order, then group. Empty means no changes were needed.
pub type ChangeRecord = Vec<Change>;

/// Merges contact data into an existing entry, in place.
///
/// - The title is set only when the entry has none; an existing title is
///   never overwritten, so a partial submitted name cannot clobber a
///   fuller remote one.
/// - Each submitted number is appended unless an existing entry number
///   already suffix-matches it. Added numbers get a relation classified
///   from the submitted free-text label.
/// - The group membership is added once when a destination group is given.
///
/// Applying the same contact twice yields an empty record the second time.
pub fn apply_changes(
    entry: &mut RemoteEntry,
    contact: &SubmittedContact,
    group: Option<&Group>,
) -> ChangeRecord {
    let mut changes = ChangeRecord::new();

    if entry.display_title().is_none() && !contact.name.is_empty() {
        entry.title = Some(contact.name.clone());
        changes.push(Change::SetName {
            name: contact.name.clone(),
        });
    }

    for submitted in &contact.numbers {
        let already_present = entry
            .phone_numbers
            .iter()
            .any(|existing| suffix_match(&existing.text, &submitted.number));
        if !already_present {
            entry.phone_numbers.push(EntryPhone {
                rel: RelationType::classify(&submitted.label).as_rel().to_string(),
                text: submitted.number.clone(),
            });
            changes.push(Change::AddNumber {
                number: submitted.number.clone(),
            });
        }
    }

    if let Some(group) = group {
        if !entry.is_member_of(group) {
            entry.group_memberships.push(GroupMembership {
                href: group.href.clone(),
            });
            changes.push(Change::AddToGroup);
        }
    }

    changes
}

/// Materializes a brand-new entry from a submitted contact.
///
/// Equivalent to applying the contact against an empty entry; the service
/// assigns the identifier on insert.
#[must_use]
pub fn build_new_entry(contact: &SubmittedContact, group: Option<&Group>) -> RemoteEntry {
    let mut entry = RemoteEntry::default();
    apply_changes(&mut entry, contact, group);
    entry
}
