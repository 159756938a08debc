//! # Property-Based Tests
//!
//! Invariants of the store and the selector, checked with proptest.

use chrono::{DateTime, TimeZone, Utc};
use dialdeck_core::{
    Contact, ContactId, ContactPatch, ContactStore, Palette, Selector, pick,
};
use proptest::collection::vec;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
        .single()
        .expect("valid time")
}

fn contacts_from(ids: &[u64]) -> Vec<Contact> {
    ids.iter()
        .map(|&id| Contact::new(ContactId(id), format!("c{}", id), epoch()))
        .collect()
}

fn ids_of(contacts: &[Contact]) -> Vec<u64> {
    contacts.iter().map(|c| c.id.0).collect()
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// A pick from a non-empty store is always one of its contacts.
    #[test]
    fn pick_is_member_of_snapshot(
        ids in vec(0u64..1000, 1..40),
        seed in any::<u64>()
    ) {
        let store = ContactStore::with_contacts(contacts_from(&ids));
        let palette = Palette::default();
        let mut rng = StdRng::seed_from_u64(seed);

        let picked = pick(store.contacts(), &palette, &mut rng).expect("non-empty");

        prop_assert!(store.contacts().contains(&picked.contact));
        prop_assert!(palette.colors().contains(&picked.color));
    }

    /// Deleting one id keeps every other contact, in order.
    #[test]
    fn delete_preserves_order_of_others(
        ids in vec(0u64..50, 0..30),
        victim in 0u64..50
    ) {
        let mut store = ContactStore::with_contacts(contacts_from(&ids));
        store.delete(ContactId(victim));

        let expected: Vec<u64> = ids.iter().copied().filter(|&id| id != victim).collect();
        prop_assert_eq!(ids_of(store.contacts()), expected);
    }

    /// Importing appends after the existing contacts and keeps all ids.
    #[test]
    fn import_appends_after_existing(
        existing in vec(0u64..100, 0..20),
        incoming in vec(0u64..100, 0..20)
    ) {
        let mut store = ContactStore::with_contacts(contacts_from(&existing));
        let report = store.import_contacts(contacts_from(&incoming));

        let mut expected = existing.clone();
        expected.extend(&incoming);
        prop_assert_eq!(ids_of(store.contacts()), expected);
        prop_assert_eq!(report.appended, incoming.len());
    }

    /// Renumbered batches never collide with what is already stored.
    #[test]
    fn renumbered_import_is_collision_free(
        existing in proptest::collection::btree_set(0u64..1000, 1..20),
        batch_len in 0usize..20
    ) {
        let existing: Vec<u64> = existing.into_iter().collect();
        let mut store = ContactStore::with_contacts(contacts_from(&existing));
        let mut batch: Vec<Contact> = (0..batch_len as u64)
            .map(|i| Contact::new(ContactId(i), "new", epoch()))
            .collect();

        store.renumber_for_merge(&mut batch);
        let report = store.import_contacts(batch);

        prop_assert!(report.is_clean());
    }

    /// History keeps the name a contact had when it was called.
    #[test]
    fn history_snapshot_survives_edits(new_name in "[A-Za-z ]{1,16}") {
        let mut store = ContactStore::with_contacts(contacts_from(&[1]));
        let called = store.get(ContactId(1)).expect("present");

        store.add_call_history(&called);
        store.edit_contact(ContactId(1), &ContactPatch::name(new_name.clone()));

        prop_assert_eq!(&store.history()[0].contact.name, "c1");
        prop_assert_eq!(store.get(ContactId(1)).expect("present").name, new_name);
    }

    /// A shuffle's steps only ever show contacts from the store.
    #[test]
    fn shuffle_steps_stay_in_store(
        ids in vec(0u64..1000, 1..10),
        seed in any::<u64>()
    ) {
        let store = ContactStore::with_contacts(contacts_from(&ids));
        let mut rng = StdRng::seed_from_u64(seed);
        let mut selector = Selector::default();

        let ticket = selector.begin_shuffle(&store).expect("idle");
        for _ in 0..20 {
            let shown = selector.step(ticket, &store, &mut rng).expect("live");
            prop_assert!(store.contains(shown.contact.id));
        }
        selector.finish(ticket);
        prop_assert!(!selector.is_shuffling());
    }
}
