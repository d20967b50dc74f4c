//! Candidate-entry matching.
//!
//! Decides which remote entry, if any, a submitted contact should merge
//! into. First match in feed order wins; there is no scoring or best-match
//! selection.

use crate::contact::SubmittedContact;
use crate::entry::RemoteEntry;
use crate::feed::RemoteFeed;
use crate::phone::suffix_match;

/// Finds the entry a submitted contact should merge into.
///
/// Iterates unclaimed feed entries in feed order and returns the index of
/// the first entry whose non-empty title equals the contact name exactly
/// (case-sensitive), or any of whose phone numbers suffix-matches any
/// submitted number. Returns `None` when nothing matches; the contact is
/// then treated as new.
///
/// This is a pure predicate over existing data; claiming the returned
/// entry is the caller's responsibility.
#[must_use]
pub fn find_match(contact: &SubmittedContact, feed: &RemoteFeed) -> Option<usize> {
    feed.iter_unclaimed()
        .find(|(_, entry)| entry_matches(contact, entry))
        .map(|(index, _)| index)
}

fn entry_matches(contact: &SubmittedContact, entry: &RemoteEntry) -> bool {
    if let Some(title) = entry.display_title() {
        if title == contact.name {
            return true;
        }
    }

    entry.phone_numbers.iter().any(|entry_number| {
        contact
            .numbers
            .iter()
            .any(|submitted| suffix_match(&entry_number.text, &submitted.number))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::SubmittedNumber;
    use crate::entry::EntryPhone;
    use chrono::Utc;

    fn contact(name: &str, numbers: &[(&str, &str)]) -> SubmittedContact {
        SubmittedContact {
            name: name.to_string(),
            numbers: numbers
                .iter()
                .map(|(label, number)| SubmittedNumber {
                    label: (*label).to_string(),
                    number: (*number).to_string(),
                })
                .collect(),
            image_url: None,
        }
    }

    fn entry(title: Option<&str>, numbers: &[&str]) -> RemoteEntry {
        RemoteEntry {
            title: title.map(str::to_string),
            phone_numbers: numbers
                .iter()
                .map(|n| EntryPhone {
                    rel: "http://schemas.google.com/g/2005#other".to_string(),
                    text: (*n).to_string(),
                })
                .collect(),
            ..RemoteEntry::default()
        }
    }

    fn feed(entries: Vec<RemoteEntry>) -> RemoteFeed {
        RemoteFeed::new(entries, Utc::now())
    }

    #[test]
    fn test_title_match_exact_case_sensitive() {
        let feed = feed(vec![
            entry(Some("jane doe"), &[]),
            entry(Some("Jane Doe"), &[]),
        ]);
        let c = contact("Jane Doe", &[]);
        assert_eq!(find_match(&c, &feed), Some(1));
    }

    #[test]
    fn test_title_match_wins_even_without_phone_match() {
        let feed = feed(vec![entry(Some("Jane Doe"), &["000-0000"])]);
        let c = contact("Jane Doe", &[("mobile", "206-555-1212")]);
        assert_eq!(find_match(&c, &feed), Some(0));
    }

    #[test]
    fn test_phone_match_wins_even_if_titles_differ() {
        let feed = feed(vec![entry(Some("J. Doe"), &["(206) 555-1212"])]);
        let c = contact("Jane Doe", &[("mobile", "555-1212")]);
        assert_eq!(find_match(&c, &feed), Some(0));
    }

    #[test]
    fn test_nameless_contact_matches_by_suffix() {
        let feed = feed(vec![
            entry(Some("Someone"), &["111-1111"]),
            entry(Some("Target"), &["555-0199"]),
        ]);
        let c = contact("", &[("", "555-0199")]);
        assert_eq!(find_match(&c, &feed), Some(1));
    }

    #[test]
    fn test_first_match_wins_in_feed_order() {
        // No scoring: an earlier title match beats a later, arguably
        // better, phone match.
        let feed = feed(vec![
            entry(Some("Jane Doe"), &[]),
            entry(Some("Jane Doe"), &["206-555-1212"]),
        ]);
        let c = contact("Jane Doe", &[("mobile", "206-555-1212")]);
        assert_eq!(find_match(&c, &feed), Some(0));
    }

    #[test]
    fn test_no_match_returns_none() {
        let feed = feed(vec![entry(Some("Somebody Else"), &["111-1111"])]);
        let c = contact("Unknown Person", &[("mobile", "999-9999")]);
        assert_eq!(find_match(&c, &feed), None);
    }

    #[test]
    fn test_empty_contact_never_matches() {
        let feed = feed(vec![
            entry(None, &[]),
            entry(Some(""), &[]),
            entry(Some("Named"), &["555-1212"]),
        ]);
        let c = contact("", &[]);
        assert_eq!(find_match(&c, &feed), None);
    }

    #[test]
    fn test_short_numbers_never_match() {
        let feed = feed(vec![entry(None, &["12345"])]);
        let c = contact("", &[("", "12345")]);
        assert_eq!(find_match(&c, &feed), None);
    }

    #[test]
    fn test_claimed_entries_are_skipped() {
        let mut f = feed(vec![
            entry(Some("Jane Doe"), &[]),
            entry(Some("Jane Doe"), &[]),
        ]);
        let c = contact("Jane Doe", &[]);
        assert_eq!(find_match(&c, &f), Some(0));
        f.claim(0);
        assert_eq!(find_match(&c, &f), Some(1));
        f.claim(1);
        assert_eq!(find_match(&c, &f), None);
    }
}
