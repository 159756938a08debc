//! # Selection Engine
//!
//! Drives the core `Selector` in real time.
//!
//! - `shuffle` claims the Shuffling flag under the lock and spawns a task
//!   that applies one pick per step, sleeping the scheduled delay after
//!   each.
//! - `call`, `delete` and `next` are refused while a shuffle runs.
//! - Every step re-checks its ticket, so `cancel` turns the rest of a
//!   running shuffle into no-ops.
//!
//! The engine owns no contacts: it is handed the shared store at
//! construction and reads a fresh snapshot at every step.

use crate::platform::{Dialer, ImagePicker};
use chrono::Utc;
use dialdeck_core::{
    Avatar, Contact, ContactId, ContactPatch, ContactStore, MergeReport, Palette, Phase, Pick,
    Selector, ShuffleSchedule, ShuffleTicket,
};
use dialdeck_core::primitives::MAX_SHUFFLE_STEPS;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, broadcast};
use tokio::task::JoinHandle;

/// The contact store as shared between the engine and its callers.
pub type SharedStore = Arc<RwLock<ContactStore>>;

/// Wrap a store for sharing.
#[must_use]
pub fn share(store: ContactStore) -> SharedStore {
    Arc::new(RwLock::new(store))
}

// =============================================================================
// EVENTS & OUTCOMES
// =============================================================================

/// Progress of a shuffle, broadcast to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ShuffleEvent {
    /// A pick was shown; the engine now waits `delay_ms`.
    Step {
        generation: u64,
        index: usize,
        delay_ms: u64,
        pick: Pick,
    },
    /// The shuffle ended. `completed` is false when it was cancelled.
    Finished { generation: u64, completed: bool },
}

/// A running shuffle.
#[derive(Debug)]
pub struct ShuffleHandle {
    generation: u64,
    task: JoinHandle<()>,
}

impl ShuffleHandle {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Wait until the shuffle has finished or been cancelled.
    pub async fn wait(self) {
        if let Err(e) = self.task.await {
            tracing::error!(generation = self.generation, "Shuffle task failed: {}", e);
        }
    }
}

/// Result of a terminal action.
#[derive(Debug)]
pub enum ActionOutcome {
    /// Refused: a shuffle is running, or there is no pick to act on.
    Rejected,
    /// Applied; nothing further was started.
    Done,
    /// Applied, and a new shuffle is running.
    Shuffling(ShuffleHandle),
}

impl ActionOutcome {
    #[must_use]
    pub fn accepted(&self) -> bool {
        !matches!(self, Self::Rejected)
    }

    /// Wait for the shuffle this action started, if any.
    pub async fn settle(self) {
        if let Self::Shuffling(handle) = self {
            handle.wait().await;
        }
    }
}

/// What the card currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub pick: Option<Pick>,
    pub color: String,
    pub phase: Phase,
}

// =============================================================================
// ENGINE
// =============================================================================

struct EngineState {
    selector: Selector,
    rng: StdRng,
}

impl EngineState {
    fn step(&mut self, ticket: ShuffleTicket, store: &ContactStore) -> Option<Pick> {
        let Self { selector, rng } = self;
        selector.step(ticket, store, rng)
    }

    fn seed(&mut self, store: &ContactStore) -> bool {
        let Self { selector, rng } = self;
        selector.seed(store, rng)
    }

    /// Resync the pick and, if the card went blank, seed a new one.
    fn resync(&mut self, store: &ContactStore) {
        self.selector.resync(store);
        self.seed(store);
    }
}

/// The Selection Engine.
///
/// Cheap to clone; clones share the same state. Lock order is always
/// store first, then engine state.
#[derive(Clone)]
pub struct SelectionEngine {
    store: SharedStore,
    state: Arc<Mutex<EngineState>>,
    schedule: ShuffleSchedule,
    dialer: Arc<dyn Dialer>,
    events: broadcast::Sender<ShuffleEvent>,
}

impl SelectionEngine {
    /// Create an engine over `store` with an entropy-seeded RNG.
    #[must_use]
    pub fn new(
        store: SharedStore,
        schedule: ShuffleSchedule,
        palette: Palette,
        dialer: Arc<dyn Dialer>,
    ) -> Self {
        Self::with_rng(store, schedule, palette, dialer, StdRng::from_entropy())
    }

    /// Create an engine with a fixed RNG seed (reproducible picks).
    #[must_use]
    pub fn with_seed(
        store: SharedStore,
        schedule: ShuffleSchedule,
        palette: Palette,
        dialer: Arc<dyn Dialer>,
        seed: u64,
    ) -> Self {
        Self::with_rng(store, schedule, palette, dialer, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        store: SharedStore,
        schedule: ShuffleSchedule,
        palette: Palette,
        dialer: Arc<dyn Dialer>,
        rng: StdRng,
    ) -> Self {
        // One slot per step plus Finished, capped for hand-built schedules
        let capacity = schedule.steps.min(MAX_SHUFFLE_STEPS).saturating_add(8);
        let (events, _) = broadcast::channel(capacity);
        Self {
            store,
            state: Arc::new(Mutex::new(EngineState {
                selector: Selector::new(palette),
                rng,
            })),
            schedule,
            dialer,
            events,
        }
    }

    /// The shared store this engine reads from.
    #[must_use]
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    #[must_use]
    pub fn schedule(&self) -> ShuffleSchedule {
        self.schedule
    }

    /// Receive shuffle progress from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ShuffleEvent> {
        self.events.subscribe()
    }

    // =========================================================================
    // OBSERVATION
    // =========================================================================

    pub async fn view(&self) -> CardView {
        let state = self.state.lock().await;
        CardView {
            pick: state.selector.current().cloned(),
            color: state.selector.color().to_string(),
            phase: state.selector.phase(),
        }
    }

    pub async fn current(&self) -> Option<Pick> {
        self.state.lock().await.selector.current().cloned()
    }

    pub async fn phase(&self) -> Phase {
        self.state.lock().await.selector.phase()
    }

    // =========================================================================
    // SELECTION
    // =========================================================================

    /// Show an initial pick if the card is empty and there is something to
    /// show. A single pick, not a shuffle.
    pub async fn seed(&self) -> bool {
        let store = self.store.read().await;
        let seeded = self.state.lock().await.seed(&store);
        if seeded {
            tracing::debug!(contacts = store.len(), "Seeded initial pick");
        }
        seeded
    }

    /// Start a shuffle. `None` when one is already running or the store is
    /// empty.
    pub async fn shuffle(&self) -> Option<ShuffleHandle> {
        let store = self.store.read().await;
        let mut state = self.state.lock().await;
        let ticket = state.selector.begin_shuffle(&store)?;
        Some(self.spawn_shuffle(ticket))
    }

    /// Abandon the running shuffle, if any. The card keeps its last pick.
    pub async fn cancel(&self) {
        let mut state = self.state.lock().await;
        if state.selector.is_shuffling() {
            tracing::info!(generation = state.selector.generation(), "Shuffle cancelled");
        }
        state.selector.cancel();
    }

    fn spawn_shuffle(&self, ticket: ShuffleTicket) -> ShuffleHandle {
        tracing::debug!(
            generation = ticket.generation(),
            steps = self.schedule.steps,
            "Shuffle started"
        );
        let engine = self.clone();
        ShuffleHandle {
            generation: ticket.generation(),
            task: tokio::spawn(async move { engine.run_shuffle(ticket).await }),
        }
    }

    async fn run_shuffle(self, ticket: ShuffleTicket) {
        let generation = ticket.generation();

        for (index, delay) in self.schedule.delays().enumerate() {
            {
                let store = self.store.read().await;
                let mut state = self.state.lock().await;
                if !state.selector.is_live(ticket) {
                    let _ = self.events.send(ShuffleEvent::Finished {
                        generation,
                        completed: false,
                    });
                    return;
                }
                if let Some(pick) = state.step(ticket, &store) {
                    tracing::trace!(generation, index, contact = pick.contact.id.0, "Shuffle step");
                    let _ = self.events.send(ShuffleEvent::Step {
                        generation,
                        index,
                        delay_ms: delay.as_millis() as u64,
                        pick,
                    });
                }
            }
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().await;
        let completed = state.selector.is_live(ticket);
        state.selector.finish(ticket);
        drop(state);

        tracing::debug!(generation, completed, "Shuffle finished");
        let _ = self.events.send(ShuffleEvent::Finished {
            generation,
            completed,
        });
    }

    // =========================================================================
    // TERMINAL ACTIONS
    // =========================================================================

    /// Call the current pick, log it, then shuffle to the next contact.
    pub async fn call(&self) -> ActionOutcome {
        let mut store = self.store.write().await;
        let mut state = self.state.lock().await;

        if !state.selector.can_act() {
            return ActionOutcome::Rejected;
        }
        let Some(called) = state.selector.current().cloned() else {
            return ActionOutcome::Rejected;
        };

        self.dialer.dial(&called.contact.phone);
        let now = Utc::now();
        store.add_call_history_at(&called.contact, now);
        store.mark_spoken(called.contact.id, now);
        state.selector.resync(&store);
        tracing::info!(contact = called.contact.id.0, name = %called.contact.name, "Call logged");

        match state.selector.begin_shuffle(&store) {
            Some(ticket) => ActionOutcome::Shuffling(self.spawn_shuffle(ticket)),
            None => ActionOutcome::Done,
        }
    }

    /// Delete the current pick. Shuffles if anyone is left, otherwise
    /// clears the card.
    pub async fn delete(&self) -> ActionOutcome {
        let mut store = self.store.write().await;
        let mut state = self.state.lock().await;

        if !state.selector.can_act() {
            return ActionOutcome::Rejected;
        }
        let Some(id) = state.selector.current().map(|p| p.contact.id) else {
            return ActionOutcome::Rejected;
        };

        store.delete(id);
        state.selector.forget(id);
        tracing::info!(contact = id.0, remaining = store.len(), "Contact deleted");

        if store.is_empty() {
            state.selector.clear();
            return ActionOutcome::Done;
        }
        match state.selector.begin_shuffle(&store) {
            Some(ticket) => ActionOutcome::Shuffling(self.spawn_shuffle(ticket)),
            None => ActionOutcome::Done,
        }
    }

    /// Skip to another contact. Refused only while shuffling.
    pub async fn next(&self) -> ActionOutcome {
        let store = self.store.read().await;
        let mut state = self.state.lock().await;

        if state.selector.is_shuffling() {
            return ActionOutcome::Rejected;
        }
        match state.selector.begin_shuffle(&store) {
            Some(ticket) => ActionOutcome::Shuffling(self.spawn_shuffle(ticket)),
            None => ActionOutcome::Done,
        }
    }

    // =========================================================================
    // STORE MUTATIONS WITH RESYNC
    // =========================================================================

    /// Re-read the current pick from the store after an outside mutation.
    pub async fn resync(&self) {
        let store = self.store.read().await;
        self.state.lock().await.resync(&store);
    }

    /// Edit a contact and refresh the card if it shows that contact.
    ///
    /// Returns whether a contact with `id` was present when the edit ran.
    pub async fn edit_contact(&self, id: ContactId, patch: &ContactPatch) -> bool {
        let mut store = self.store.write().await;
        let found = store.contains(id);
        store.edit_contact(id, patch);
        self.state.lock().await.resync(&store);
        found
    }

    /// Delete a contact by id (not necessarily the one on the card).
    ///
    /// Returns whether a contact with `id` was present.
    pub async fn remove_contact(&self, id: ContactId) -> bool {
        let mut store = self.store.write().await;
        let found = store.contains(id);
        store.delete(id);
        self.state.lock().await.resync(&store);
        found
    }

    /// Let the user pick a photo for `id`.
    ///
    /// Returns true only when an image was chosen and the contact existed.
    pub async fn choose_avatar<P: ImagePicker>(&self, picker: &P, id: ContactId) -> bool {
        let Some(uri) = picker.pick_image().await else {
            tracing::debug!(contact = id.0, "Image selection cancelled");
            return false;
        };
        self.edit_contact(id, &ContactPatch::avatar(Avatar::ImageRef(uri)))
            .await
    }

    /// Merge an import batch: renumber past existing ids, append, and seed
    /// the card if it was empty.
    pub async fn merge_import(&self, mut batch: Vec<Contact>) -> MergeReport {
        let mut store = self.store.write().await;
        store.renumber_for_merge(&mut batch);
        let report = store.import_contacts(batch);
        if !report.is_clean() {
            tracing::warn!(ids = ?report.colliding_ids, "Imported contacts share ids");
        }
        tracing::info!(appended = report.appended, total = store.len(), "Contacts imported");
        self.state.lock().await.resync(&store);
        report
    }
}
