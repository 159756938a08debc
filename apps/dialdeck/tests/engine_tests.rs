//! Timing and action tests for the Selection Engine.
//!
//! Run on a paused tokio clock so the 4.6 s shuffle completes instantly.

#![allow(clippy::unwrap_used, clippy::panic)]

use chrono::Utc;
use dialdeck::engine::{ActionOutcome, SelectionEngine, ShuffleEvent, share};
use dialdeck::platform::{Dialer, PresetImage};
use dialdeck_core::{
    Contact, ContactId, ContactPatch, ContactStore, Palette, Phase, ShuffleSchedule,
    starter_contacts,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

#[derive(Default)]
struct RecordingDialer {
    dialed: Mutex<Vec<String>>,
}

impl Dialer for RecordingDialer {
    fn dial(&self, phone: &str) {
        self.dialed.lock().unwrap().push(phone.to_string());
    }
}

fn contact(id: u64, name: &str) -> Contact {
    let mut c = Contact::new(ContactId(id), name, Utc::now());
    c.phone = format!("+1555000{:04}", id);
    c
}

async fn engine_over(contacts: Vec<Contact>) -> (SelectionEngine, Arc<RecordingDialer>) {
    let dialer = Arc::new(RecordingDialer::default());
    let engine = SelectionEngine::with_seed(
        share(ContactStore::with_contacts(contacts)),
        ShuffleSchedule::default(),
        Palette::default(),
        dialer.clone(),
        42,
    );
    engine.seed().await;
    (engine, dialer)
}

// =============================================================================
// SHUFFLE TIMING
// =============================================================================

#[tokio::test(start_paused = true)]
async fn shuffle_runs_twenty_decelerating_steps() {
    let (engine, _) = engine_over(starter_contacts()).await;
    let mut events = engine.subscribe();
    let ids: Vec<ContactId> = starter_contacts().iter().map(|c| c.id).collect();

    let start = tokio::time::Instant::now();
    let handle = engine.shuffle().await.unwrap();
    assert_eq!(engine.phase().await, Phase::Shuffling);
    handle.wait().await;
    let elapsed = start.elapsed();

    let mut delays = Vec::new();
    let mut finished = None;
    while let Ok(event) = events.try_recv() {
        match event {
            ShuffleEvent::Step {
                index,
                delay_ms,
                pick,
                ..
            } => {
                assert_eq!(index, delays.len());
                assert!(ids.contains(&pick.contact.id));
                assert!(Palette::default().colors().contains(&pick.color));
                delays.push(delay_ms);
            }
            ShuffleEvent::Finished { completed, .. } => finished = Some(completed),
        }
    }

    let expected: Vec<u64> = (0..20).map(|i| 40 + 20 * i).collect();
    assert_eq!(delays, expected);
    assert_eq!(finished, Some(true));
    assert!(elapsed >= Duration::from_millis(4600));
    assert!(elapsed < Duration::from_millis(4700));
    assert_eq!(engine.phase().await, Phase::Idle);
    assert!(engine.current().await.is_some());
}

#[tokio::test(start_paused = true)]
async fn second_shuffle_is_refused_while_one_runs() {
    let (engine, _) = engine_over(starter_contacts()).await;

    let handle = engine.shuffle().await.unwrap();
    assert!(engine.shuffle().await.is_none());
    assert!(!engine.next().await.accepted());
    assert!(!engine.delete().await.accepted());
    assert_eq!(engine.store().read().await.len(), 5);

    handle.wait().await;
    let again = engine.shuffle().await;
    assert!(again.is_some());
    again.unwrap().wait().await;
}

#[tokio::test]
async fn hand_built_schedule_does_not_size_the_event_buffer() {
    let schedule = ShuffleSchedule {
        steps: usize::MAX,
        ..ShuffleSchedule::default()
    };
    let engine = SelectionEngine::with_seed(
        share(ContactStore::new()),
        schedule,
        Palette::default(),
        Arc::new(RecordingDialer::default()),
        1,
    );
    assert!(engine.shuffle().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn shuffle_on_empty_store_is_refused() {
    let (engine, _) = engine_over(Vec::new()).await;
    assert!(engine.shuffle().await.is_none());
    assert_eq!(engine.phase().await, Phase::Idle);
    assert!(matches!(engine.next().await, ActionOutcome::Done));
}

// =============================================================================
// TERMINAL ACTIONS
// =============================================================================

#[tokio::test(start_paused = true)]
async fn call_dials_logs_and_shuffles() {
    let stale = |id, name| Contact {
        last_spoken: "2024-01-01".to_string(),
        ..contact(id, name)
    };
    let (engine, dialer) = engine_over(vec![stale(1, "Ana"), stale(2, "Ben")]).await;
    let called = engine.current().await.unwrap().contact;

    let outcome = engine.call().await;
    assert!(matches!(outcome, ActionOutcome::Shuffling(_)));
    assert!(!engine.call().await.accepted());

    {
        let store = engine.store().read().await;
        assert_eq!(store.history().len(), 1);
        assert_eq!(store.history()[0].contact.id, called.id);
        // The live contact is marked spoken; the history keeps the old stamp
        assert_eq!(store.history()[0].contact.last_spoken, "2024-01-01");
        let live = store.get(called.id).unwrap();
        assert_eq!(live.last_spoken, store.history()[0].timestamp);
    }
    assert_eq!(*dialer.dialed.lock().unwrap(), vec![called.phone.clone()]);

    outcome.settle().await;
    assert_eq!(engine.phase().await, Phase::Idle);
    assert!(engine.current().await.is_some());
}

#[tokio::test(start_paused = true)]
async fn call_history_is_a_snapshot() {
    let (engine, _) = engine_over(vec![contact(1, "Ana")]).await;

    engine.call().await.settle().await;
    engine
        .edit_contact(ContactId(1), &ContactPatch::name("Anna"))
        .await;

    let store = engine.store().read().await;
    assert_eq!(store.history()[0].contact.name, "Ana");
    assert_eq!(store.get(ContactId(1)).unwrap().name, "Anna");
    drop(store);
    assert_eq!(engine.current().await.unwrap().contact.name, "Anna");
}

#[tokio::test(start_paused = true)]
async fn delete_of_one_of_two_lands_on_the_other() {
    let (engine, _) = engine_over(vec![contact(1, "Ana"), contact(2, "Ben")]).await;
    let doomed = engine.current().await.unwrap().contact.id;

    let outcome = engine.delete().await;
    assert!(matches!(outcome, ActionOutcome::Shuffling(_)));
    outcome.settle().await;

    let survivor = engine.current().await.unwrap().contact;
    assert_ne!(survivor.id, doomed);
    assert_eq!(engine.store().read().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn delete_of_last_contact_clears_the_card() {
    let (engine, _) = engine_over(vec![contact(1, "Ana")]).await;
    let mut events = engine.subscribe();

    assert!(matches!(engine.delete().await, ActionOutcome::Done));

    assert!(engine.current().await.is_none());
    assert_eq!(engine.phase().await, Phase::Idle);
    assert!(engine.store().read().await.is_empty());
    assert!(events.try_recv().is_err());
    assert!(!engine.call().await.accepted());
}

#[tokio::test(start_paused = true)]
async fn removing_the_shown_contact_moves_the_card() {
    let (engine, _) = engine_over(vec![contact(1, "Ana"), contact(2, "Ben")]).await;
    let shown = engine.current().await.unwrap().contact.id;

    assert!(engine.remove_contact(shown).await);
    assert!(!engine.remove_contact(shown).await);

    let now_shown = engine.current().await.unwrap().contact.id;
    assert_ne!(now_shown, shown);
}

#[tokio::test(start_paused = true)]
async fn resync_picks_up_direct_store_changes() {
    let (engine, _) = engine_over(vec![contact(1, "Ana")]).await;

    engine
        .store()
        .write()
        .await
        .edit_contact(ContactId(1), &ContactPatch::name("Anna"));
    assert_eq!(engine.current().await.unwrap().contact.name, "Ana");

    engine.resync().await;
    assert_eq!(engine.current().await.unwrap().contact.name, "Anna");

    engine.store().write().await.delete(ContactId(1));
    engine.resync().await;
    assert!(engine.current().await.is_none());
}

#[tokio::test]
async fn mutations_report_presence_under_the_write_lock() {
    let (engine, _) = engine_over(vec![contact(1, "Ana")]).await;

    assert!(engine.edit_contact(ContactId(1), &ContactPatch::name("Anna")).await);
    assert!(!engine.edit_contact(ContactId(7), &ContactPatch::name("Nobody")).await);

    let photo = PresetImage(Some("file:///ana.png".to_string()));
    assert!(engine.choose_avatar(&photo, ContactId(1)).await);
    assert!(!engine.choose_avatar(&photo, ContactId(7)).await);
    assert!(!engine.choose_avatar(&PresetImage(None), ContactId(1)).await);

    // Two removals racing for the same id: exactly one sees it
    let (first, second) = tokio::join!(
        engine.remove_contact(ContactId(1)),
        engine.remove_contact(ContactId(1))
    );
    assert!(first ^ second);
}
