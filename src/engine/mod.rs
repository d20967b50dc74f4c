//! Merge orchestration.
//!
//! Runs the matcher/reconciler/updater pass over a submitted contact list
//! against a freshly fetched feed snapshot. Processing is sequential in
//! submission order by design: the order determines which remote entry a
//! contact claims, so the pass must not be parallelized. Each request gets
//! its own snapshot and its own updater; no mutable state crosses merge
//! requests.

mod report;

pub use report::{MergeAction, MergeOutcome, MergeReport};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::batch::Updater;
use crate::contact::SubmittedContact;
use crate::entry::Group;
use crate::error::{MergeError, MergeResult};
use crate::matcher::find_match;
use crate::reconcile::{apply_changes, build_new_entry, ChangeRecord};
use crate::service::{ContactsService, ServiceSubmitter};
use crate::submission::Submission;

/// Whether a merge run commits its operations.
///
/// Preview runs the full matching and reconciliation pass with a
/// non-committing submitter; nothing reaches the service beyond the feed
/// and group reads. The engine is agnostic to how the caller picked the
/// mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    Preview,
    Commit,
}

/// Options for one merge run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOptions {
    pub mode: MergeMode,
    /// Name of the destination group submitted contacts are filed under.
    /// Blank or whitespace-only names are treated as absent. The group is
    /// created remotely only if it does not already exist.
    pub group: Option<String>,
}

impl MergeOptions {
    /// Options for a dry run.
    #[must_use]
    pub const fn preview() -> Self {
        Self {
            mode: MergeMode::Preview,
            group: None,
        }
    }

    /// Options for a committing run.
    #[must_use]
    pub const fn commit() -> Self {
        Self {
            mode: MergeMode::Commit,
            group: None,
        }
    }

    /// Sets the destination group name.
    #[must_use]
    pub fn with_group(mut self, name: impl Into<String>) -> Self {
        self.group = Some(name.into());
        self
    }
}

/// Drives a merge run against a contacts service.
pub struct MergeEngine {
    service: Arc<dyn ContactsService>,
}

impl MergeEngine {
    /// Creates an engine over the given service.
    #[must_use]
    pub fn new(service: Arc<dyn ContactsService>) -> Self {
        Self { service }
    }

    /// Merges a submitted contact list into the remote account.
    ///
    /// Fetches one feed snapshot, resolves the destination group lazily,
    /// then processes contacts sequentially: each either reconciles into
    /// the first matching unclaimed entry (queued as an update only when
    /// the change record is non-empty) or materializes a new entry
    /// (queued as an insert). Pending operations are flushed at the end;
    /// a failed flush aborts the request.
    pub fn merge(
        &self,
        contacts: &[SubmittedContact],
        options: &MergeOptions,
    ) -> MergeResult<MergeReport> {
        let mut feed = self.service.fetch_feed()?;
        let group = self.resolve_group(options.group.as_deref())?;

        let mut updater = match options.mode {
            MergeMode::Preview => Updater::noop(),
            MergeMode::Commit => Updater::new(Box::new(ServiceSubmitter::new(Arc::clone(
                &self.service,
            )))),
        };

        let mut outcomes = Vec::with_capacity(contacts.len());
        let mut matched = 0;
        let mut created = 0;

        for contact in contacts {
            match find_match(contact, &feed) {
                Some(index) => {
                    feed.claim(index);
                    let entry = feed
                        .entry_mut(index)
                        .ok_or_else(|| MergeError::internal("matched entry vanished from feed"))?;
                    let changes = apply_changes(entry, contact, group.as_ref());
                    let action = MergeAction::MergedInto {
                        entry_id: entry.id.clone(),
                        title: entry.display_title().map(str::to_string),
                    };
                    if !changes.is_empty() {
                        updater.add_update(entry.clone())?;
                    }
                    matched += 1;
                    outcomes.push(MergeOutcome {
                        contact_name: contact.name.clone(),
                        action,
                        changes,
                    });
                }
                None => {
                    let entry = build_new_entry(contact, group.as_ref());
                    updater.add_insert(entry)?;
                    created += 1;
                    outcomes.push(MergeOutcome {
                        contact_name: contact.name.clone(),
                        action: MergeAction::Created,
                        changes: ChangeRecord::new(),
                    });
                }
            }
        }

        updater.flush()?;

        Ok(MergeReport {
            mode: options.mode,
            outcomes,
            matched,
            created,
            batches_submitted: updater.batches_submitted(),
        })
    }

    /// Merges the contacts stored in a submission, using its group.
    pub fn merge_submission(
        &self,
        submission: &Submission,
        mode: MergeMode,
    ) -> MergeResult<MergeReport> {
        let contacts = submission.contacts()?;
        let options = MergeOptions {
            mode,
            group: submission.group.clone(),
        };
        self.merge(&contacts, &options)
    }

    fn resolve_group(&self, name: Option<&str>) -> MergeResult<Option<Group>> {
        let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
            return Ok(None);
        };
        let groups = self.service.fetch_groups()?;
        if let Some(href) = groups.get(name) {
            return Ok(Some(Group::new(href.clone())));
        }
        Ok(Some(self.service.create_group(name)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::SubmittedNumber;
    use crate::entry::RemoteEntry;
    use crate::service::InMemoryContactsService;

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

    fn engine_with_entries(titles: &[&str]) -> (MergeEngine, Arc<InMemoryContactsService>) {
        let service = Arc::new(InMemoryContactsService::new());
        for title in titles {
            service
                .add_entry(RemoteEntry {
                    title: Some((*title).to_string()),
                    ..RemoteEntry::default()
                })
                .unwrap();
        }
        (MergeEngine::new(service.clone()), service)
    }

    #[test]
    fn test_unmatched_contact_is_created() {
        let (engine, service) = engine_with_entries(&[]);
        let report = engine
            .merge(
                &[contact("Unknown Person", &[("mobile", "206-555-1212")])],
                &MergeOptions::commit(),
            )
            .unwrap();

        assert_eq!(report.created, 1);
        assert_eq!(report.matched, 0);
        assert!(matches!(report.outcomes[0].action, MergeAction::Created));
        assert_eq!(report.batches_submitted, 1);

        let entries = service.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].display_title(), Some("Unknown Person"));
    }

    #[test]
    fn test_matched_contact_with_no_changes_is_not_queued() {
        let (engine, service) = engine_with_entries(&["Jane Doe"]);
        let report = engine
            .merge(&[contact("Jane Doe", &[])], &MergeOptions::commit())
            .unwrap();

        assert_eq!(report.matched, 1);
        assert!(report.outcomes[0].changes.is_empty());
        assert_eq!(report.batches_submitted, 0);
        assert!(service.submitted_batches().unwrap().is_empty());
    }

    #[test]
    fn test_group_resolved_without_creation_when_present() {
        let (engine, service) = engine_with_entries(&[]);
        let href = service.add_group("Imported").unwrap();

        let report = engine
            .merge(
                &[contact("Jane Doe", &[])],
                &MergeOptions::commit().with_group("Imported"),
            )
            .unwrap();
        assert_eq!(report.created, 1);

        // Still exactly one group, and the new entry points at it.
        let groups = service.fetch_groups().unwrap();
        assert_eq!(groups.len(), 1);
        let entries = service.entries().unwrap();
        assert_eq!(entries[0].group_memberships[0].href, href);
    }

    #[test]
    fn test_blank_group_name_is_ignored() {
        let (engine, service) = engine_with_entries(&[]);
        engine
            .merge(
                &[contact("Jane Doe", &[])],
                &MergeOptions::commit().with_group("   "),
            )
            .unwrap();
        assert!(service.fetch_groups().unwrap().is_empty());
        assert!(service.entries().unwrap()[0].group_memberships.is_empty());
    }

    #[test]
    fn test_report_counts_changes() {
        let (engine, _service) = engine_with_entries(&["Jane Doe"]);
        let report = engine
            .merge(
                &[contact("Jane Doe", &[("mobile", "206-555-1212")])],
                &MergeOptions::preview(),
            )
            .unwrap();
        assert_eq!(report.total_changes(), 1);
        assert_eq!(
            report.outcomes[0].changes[0].to_string(),
            "adding number: 206-555-1212"
        );
    }
}
