//! # Contact Store
//!
//! The authoritative collection of contacts and the call-history log.
//!
//! - Contacts are kept in insertion order.
//! - Call history is kept most-recent-first.
//! - Every operation is total: an unknown id is a no-op, never an error.
//!
//! The store is an owned value. Consumers receive it by reference (or
//! behind the app layer's lock); there is no global instance.

use crate::{CallHistoryItem, Contact, ContactId, ContactPatch};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// Outcome of [`ContactStore::import_contacts`].
///
/// The store does not renumber imported ids. Ids that were already present
/// before the merge, or that repeat inside the batch, are listed in
/// `colliding_ids` so the caller can surface them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Number of contacts appended.
    pub appended: usize,
    /// Ids from the batch that are now held by more than one contact.
    pub colliding_ids: Vec<ContactId>,
}

impl MergeReport {
    /// Whether the merge left every id unique.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.colliding_ids.is_empty()
    }
}

/// The in-memory contact store.
#[derive(Debug, Clone, Default)]
pub struct ContactStore {
    contacts: Vec<Contact>,
    history: Vec<CallHistoryItem>,
}

impl ContactStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `contacts`, in the given order.
    #[must_use]
    pub fn with_contacts(contacts: Vec<Contact>) -> Self {
        Self {
            contacts,
            history: Vec::new(),
        }
    }

    // =========================================================================
    // READ ACCESS
    // =========================================================================

    /// Contacts in insertion order.
    #[must_use]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Call history, most recent first.
    #[must_use]
    pub fn history(&self) -> &[CallHistoryItem] {
        &self.history
    }

    /// Copy of the first contact with `id`.
    #[must_use]
    pub fn get(&self, id: ContactId) -> Option<Contact> {
        self.contacts.iter().find(|c| c.id == id).cloned()
    }

    #[must_use]
    pub fn contains(&self, id: ContactId) -> bool {
        self.contacts.iter().any(|c| c.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Largest id in the store, if any.
    #[must_use]
    pub fn max_id(&self) -> Option<ContactId> {
        self.contacts.iter().map(|c| c.id).max()
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Remove every contact with `id`. No-op when absent.
    ///
    /// The caller is responsible for dropping any pick that refers to `id`.
    pub fn delete(&mut self, id: ContactId) {
        self.contacts.retain(|c| c.id != id);
    }

    /// Log an outgoing call to `contact` at the current time.
    pub fn add_call_history(&mut self, contact: &Contact) {
        self.add_call_history_at(contact, Utc::now());
    }

    /// Log an outgoing call to `contact` at `at`.
    ///
    /// The entry stores its own copy of the contact and goes to the front.
    pub fn add_call_history_at(&mut self, contact: &Contact, at: DateTime<Utc>) {
        self.history
            .insert(0, CallHistoryItem::outgoing(contact.clone(), at));
    }

    /// Apply `patch` to every contact with `id`. No-op when absent.
    pub fn edit_contact(&mut self, id: ContactId, patch: &ContactPatch) {
        for contact in self.contacts.iter_mut().filter(|c| c.id == id) {
            contact.apply(patch);
        }
    }

    /// Set `last_spoken` of every contact with `id` to `at`.
    pub fn mark_spoken(&mut self, id: ContactId, at: DateTime<Utc>) {
        let stamp = crate::iso_timestamp(at);
        for contact in self.contacts.iter_mut().filter(|c| c.id == id) {
            contact.last_spoken.clone_from(&stamp);
        }
    }

    /// Append `new_contacts` after all existing contacts, ids as supplied.
    ///
    /// Ids are neither checked nor rewritten; collisions are reported, not
    /// resolved. Call [`ContactStore::renumber_for_merge`] first to avoid
    /// them.
    pub fn import_contacts(&mut self, new_contacts: Vec<Contact>) -> MergeReport {
        let mut seen: BTreeSet<ContactId> = self.contacts.iter().map(|c| c.id).collect();
        let mut colliding = BTreeSet::new();
        for contact in &new_contacts {
            if !seen.insert(contact.id) {
                colliding.insert(contact.id);
            }
        }

        let appended = new_contacts.len();
        self.contacts.extend(new_contacts);

        MergeReport {
            appended,
            colliding_ids: colliding.into_iter().collect(),
        }
    }

    /// Shift the ids of an import batch past the largest id in the store.
    ///
    /// Row order is kept. On an empty store the ids are kept unchanged so a
    /// fresh import still starts at zero.
    pub fn renumber_for_merge(&self, batch: &mut [Contact]) {
        let Some(max) = self.max_id() else {
            return;
        };
        let offset = max.0.saturating_add(1);
        for contact in batch.iter_mut() {
            contact.id = ContactId(contact.id.0.saturating_add(offset));
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 20, 9, 30, 0)
            .single()
            .expect("valid time")
    }

    fn contact(id: u64, name: &str) -> Contact {
        Contact::new(ContactId(id), name, now())
    }

    fn ids(store: &ContactStore) -> Vec<u64> {
        store.contacts().iter().map(|c| c.id.0).collect()
    }

    #[test]
    fn delete_removes_matching_contact() {
        let mut store = ContactStore::with_contacts(vec![contact(1, "A"), contact(2, "B")]);
        store.delete(ContactId(1));
        assert_eq!(ids(&store), vec![2]);
    }

    #[test]
    fn delete_missing_id_is_noop() {
        let mut store = ContactStore::with_contacts(vec![contact(1, "A")]);
        store.delete(ContactId(99));
        assert_eq!(ids(&store), vec![1]);

        let mut empty = ContactStore::new();
        empty.delete(ContactId(1));
        assert!(empty.is_empty());
    }

    #[test]
    fn add_call_history_prepends() {
        let mut store = ContactStore::with_contacts(vec![contact(1, "A"), contact(2, "B")]);
        let a = store.get(ContactId(1)).expect("a");
        let b = store.get(ContactId(2)).expect("b");

        store.add_call_history_at(&a, now());
        store.add_call_history_at(&b, now() + chrono::Duration::seconds(5));

        let names: Vec<_> = store.history().iter().map(|h| h.contact.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(store.history()[1].timestamp, "2025-01-20T09:30:00.000Z");
    }

    #[test]
    fn history_is_independent_of_later_edits() {
        let mut store = ContactStore::with_contacts(vec![contact(1, "Sarah")]);
        let sarah = store.get(ContactId(1)).expect("sarah");

        store.add_call_history(&sarah);
        store.edit_contact(ContactId(1), &ContactPatch::name("X"));

        assert_eq!(store.history()[0].contact.name, "Sarah");
        assert_eq!(store.get(ContactId(1)).expect("sarah").name, "X");
    }

    #[test]
    fn edit_contact_patches_subset() {
        let mut store = ContactStore::with_contacts(vec![contact(1, "A")]);
        let patch = ContactPatch {
            phone: Some("555".to_string()),
            dob: Some("01/02/2000".to_string()),
            ..ContactPatch::default()
        };

        store.edit_contact(ContactId(1), &patch);

        let edited = store.get(ContactId(1)).expect("a");
        assert_eq!(edited.name, "A");
        assert_eq!(edited.phone, "555");
        assert_eq!(edited.dob, "01/02/2000");
    }

    #[test]
    fn edit_missing_id_is_noop() {
        let mut store = ContactStore::with_contacts(vec![contact(1, "A")]);
        let before = store.contacts().to_vec();
        store.edit_contact(ContactId(5), &ContactPatch::name("Z"));
        assert_eq!(store.contacts(), before.as_slice());
    }

    #[test]
    fn import_appends_in_order_and_keeps_ids() {
        let mut store = ContactStore::with_contacts(vec![contact(1, "A"), contact(2, "B")]);

        let report = store.import_contacts(vec![contact(10, "C"), contact(11, "D")]);

        assert_eq!(ids(&store), vec![1, 2, 10, 11]);
        assert_eq!(report.appended, 2);
        assert!(report.is_clean());
    }

    #[test]
    fn import_reports_but_keeps_colliding_ids() {
        let mut store = ContactStore::with_contacts(vec![contact(0, "A")]);

        let report = store.import_contacts(vec![contact(0, "Imported"), contact(1, "B")]);

        assert_eq!(ids(&store), vec![0, 0, 1]);
        assert_eq!(report.colliding_ids, vec![ContactId(0)]);
    }

    #[test]
    fn renumber_for_merge_offsets_past_max() {
        let store = ContactStore::with_contacts(vec![contact(3, "A"), contact(7, "B")]);
        let mut batch = vec![contact(0, "C"), contact(1, "D")];

        store.renumber_for_merge(&mut batch);

        let batch_ids: Vec<_> = batch.iter().map(|c| c.id.0).collect();
        assert_eq!(batch_ids, vec![8, 9]);
    }

    #[test]
    fn renumber_for_merge_on_empty_store_keeps_ids() {
        let store = ContactStore::new();
        let mut batch = vec![contact(0, "C"), contact(1, "D")];
        store.renumber_for_merge(&mut batch);
        assert_eq!(batch[0].id, ContactId(0));
    }

    #[test]
    fn mark_spoken_updates_timestamp() {
        let mut store = ContactStore::with_contacts(vec![contact(1, "A")]);
        let later = now() + chrono::Duration::days(2);

        store.mark_spoken(ContactId(1), later);

        assert_eq!(
            store.get(ContactId(1)).expect("a").last_spoken_at(),
            Some(later)
        );
    }
}
