//! Remote feed snapshot.
//!
//! A feed is fetched once per merge operation and treated as read-mostly:
//! only title, phone numbers, and group memberships of its entries are
//! mutated, in place, before being queued for upload. Claim bookkeeping
//! enforces that an entry is matched to at most one submitted contact per
//! merge run.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::RemoteEntry;

/// A point-in-time snapshot of all remote entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteFeed {
    entries: Vec<RemoteEntry>,
    fetched_at: DateTime<Utc>,
    #[serde(skip)]
    claimed: HashSet<usize>,
}

impl RemoteFeed {
    /// Wraps entries fetched from the service.
    #[must_use]
    pub fn new(entries: Vec<RemoteEntry>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            entries,
            fetched_at,
            claimed: HashSet::new(),
        }
    }

    /// When the snapshot was fetched.
    #[must_use]
    pub const fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Number of entries in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the snapshot holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`.
    #[must_use]
    pub fn entry(&self, index: usize) -> Option<&RemoteEntry> {
        self.entries.get(index)
    }

    /// Mutable handle to the entry at `index`, for in-place reconciliation.
    pub fn entry_mut(&mut self, index: usize) -> Option<&mut RemoteEntry> {
        self.entries.get_mut(index)
    }

    /// Iterates entries with their indices, in feed order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &RemoteEntry)> {
        self.entries.iter().enumerate()
    }

    /// Iterates entries not yet claimed by a submitted contact, in feed
    /// order.
    pub fn iter_unclaimed(&self) -> impl Iterator<Item = (usize, &RemoteEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter(move |(i, _)| !self.claimed.contains(i))
    }

    /// Marks the entry at `index` as claimed for the rest of this run.
    pub fn claim(&mut self, index: usize) {
        if index < self.entries.len() {
            self.claimed.insert(index);
        }
    }

    /// Returns true if the entry at `index` has been claimed.
    #[must_use]
    pub fn is_claimed(&self, index: usize) -> bool {
        self.claimed.contains(&index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::RemoteEntry;

    fn feed_of(n: usize) -> RemoteFeed {
        let entries = (0..n)
            .map(|i| RemoteEntry {
                title: Some(format!("Contact {i}")),
                ..RemoteEntry::default()
            })
            .collect();
        RemoteFeed::new(entries, Utc::now())
    }

    #[test]
    fn test_len_and_indexing() {
        let feed = feed_of(3);
        assert_eq!(feed.len(), 3);
        assert!(!feed.is_empty());
        assert_eq!(feed.entry(1).unwrap().display_title(), Some("Contact 1"));
        assert!(feed.entry(3).is_none());
    }

    #[test]
    fn test_claim_excludes_from_unclaimed_iteration() {
        let mut feed = feed_of(3);
        feed.claim(1);
        assert!(feed.is_claimed(1));
        let unclaimed: Vec<usize> = feed.iter_unclaimed().map(|(i, _)| i).collect();
        assert_eq!(unclaimed, vec![0, 2]);
    }

    #[test]
    fn test_claim_out_of_range_is_ignored() {
        let mut feed = feed_of(1);
        feed.claim(5);
        assert!(!feed.is_claimed(5));
    }

    #[test]
    fn test_entry_mut_allows_in_place_edit() {
        let mut feed = feed_of(1);
        feed.entry_mut(0).unwrap().title = Some("Renamed".to_string());
        assert_eq!(feed.entry(0).unwrap().display_title(), Some("Renamed"));
    }
}
