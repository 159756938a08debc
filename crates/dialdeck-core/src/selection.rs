//! # Selection
//!
//! Random contact selection and the shuffle state machine.
//!
//! This module holds the synchronous half of the Selection Engine:
//! - `pick`: one uniform draw of a contact and a colour
//! - `ShuffleSchedule`: the decelerating delay sequence
//! - `Selector`: the Idle/Shuffling state, the current pick and the
//!   generation counter that invalidates stale shuffle steps
//!
//! Timing lives in the app layer, which sleeps between the steps this
//! module hands out.

use crate::primitives::{
    MAX_SHUFFLE_STEPS, PALETTE, SHUFFLE_BASE_DELAY_MS, SHUFFLE_DELAY_STEP_MS, SHUFFLE_STEPS,
};
use crate::store::ContactStore;
use crate::{Contact, ContactId, DialdeckError};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// =============================================================================
// PALETTE & PICK
// =============================================================================

/// Non-empty, fixed set of card colours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette(Vec<String>);

impl Palette {
    /// Build a palette. Fails on an empty list.
    pub fn new(colors: Vec<String>) -> Result<Self, DialdeckError> {
        if colors.is_empty() {
            return Err(DialdeckError::Config("palette must not be empty".to_string()));
        }
        Ok(Self(colors))
    }

    #[must_use]
    pub fn colors(&self) -> &[String] {
        &self.0
    }

    /// First colour, shown before anything has been picked.
    #[must_use]
    pub fn first(&self) -> &str {
        self.0.first().map_or(PALETTE[0], String::as_str)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self(PALETTE.iter().map(|c| (*c).to_string()).collect())
    }
}

/// A contact shown on the card, with the colour it is shown in.
///
/// The contact is a copy taken at pick time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pick {
    pub contact: Contact,
    pub color: String,
}

/// Draw one contact and one colour, each uniformly at random.
///
/// Returns `None` on an empty slice.
pub fn pick<R: Rng + ?Sized>(contacts: &[Contact], palette: &Palette, rng: &mut R) -> Option<Pick> {
    let contact = contacts.choose(rng)?.clone();
    let color = palette
        .colors()
        .choose(rng)
        .cloned()
        .unwrap_or_else(|| palette.first().to_string());
    Some(Pick { contact, color })
}

// =============================================================================
// SHUFFLE SCHEDULE
// =============================================================================

/// Step count and delays of one shuffle.
///
/// Step `k` (0-based) is followed by a pause of
/// `base_delay_ms + k * delay_step_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShuffleSchedule {
    pub steps: usize,
    pub base_delay_ms: u64,
    pub delay_step_ms: u64,
}

impl Default for ShuffleSchedule {
    fn default() -> Self {
        Self {
            steps: SHUFFLE_STEPS,
            base_delay_ms: SHUFFLE_BASE_DELAY_MS,
            delay_step_ms: SHUFFLE_DELAY_STEP_MS,
        }
    }
}

impl ShuffleSchedule {
    /// Build a schedule. Fails unless `1 <= steps <= MAX_SHUFFLE_STEPS`.
    pub fn new(steps: usize, base_delay_ms: u64, delay_step_ms: u64) -> Result<Self, DialdeckError> {
        if steps == 0 {
            return Err(DialdeckError::Config(
                "shuffle steps must be at least 1".to_string(),
            ));
        }
        if steps > MAX_SHUFFLE_STEPS {
            return Err(DialdeckError::Config(format!(
                "shuffle steps {} exceeds maximum {}",
                steps, MAX_SHUFFLE_STEPS
            )));
        }
        Ok(Self {
            steps,
            base_delay_ms,
            delay_step_ms,
        })
    }

    /// Pause after step `step`.
    #[must_use]
    pub fn delay_after(&self, step: usize) -> Duration {
        let extra = self.delay_step_ms.saturating_mul(step as u64);
        Duration::from_millis(self.base_delay_ms.saturating_add(extra))
    }

    /// All pauses in order, one per step.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.steps).map(|step| self.delay_after(step))
    }

    /// Wall time of a full shuffle.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.delays().sum()
    }
}

// =============================================================================
// SELECTOR STATE MACHINE
// =============================================================================

/// Engine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Shuffling,
}

/// Permission to run one shuffle, tied to the generation it started in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShuffleTicket {
    generation: u64,
}

impl ShuffleTicket {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Current pick plus the Idle/Shuffling flag.
///
/// The Shuffling phase is the only lock in the system: while it is set,
/// a second shuffle and every terminal action are refused.
#[derive(Debug, Clone)]
pub struct Selector {
    phase: Phase,
    current: Option<Pick>,
    generation: u64,
    palette: Palette,
}

impl Default for Selector {
    fn default() -> Self {
        Self::new(Palette::default())
    }
}

impl Selector {
    #[must_use]
    pub fn new(palette: Palette) -> Self {
        Self {
            phase: Phase::Idle,
            current: None,
            generation: 0,
            palette,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_shuffling(&self) -> bool {
        self.phase == Phase::Shuffling
    }

    #[must_use]
    pub fn current(&self) -> Option<&Pick> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Colour of the card: the current pick's, else the palette's first.
    #[must_use]
    pub fn color(&self) -> &str {
        self.current
            .as_ref()
            .map_or_else(|| self.palette.first(), |p| p.color.as_str())
    }

    /// Whether a terminal action that needs a pick may run now.
    #[must_use]
    pub fn can_act(&self) -> bool {
        self.phase == Phase::Idle && self.current.is_some()
    }

    /// Draw from `contacts` without changing state.
    pub fn draw<R: Rng + ?Sized>(&self, contacts: &[Contact], rng: &mut R) -> Option<Pick> {
        pick(contacts, &self.palette, rng)
    }

    /// Pick once to give an idle, empty card something to show.
    ///
    /// Does nothing while shuffling, when a pick already exists, or when the
    /// store is empty. Returns whether a pick was made.
    pub fn seed<R: Rng + ?Sized>(&mut self, store: &ContactStore, rng: &mut R) -> bool {
        if self.phase != Phase::Idle || self.current.is_some() {
            return false;
        }
        match self.draw(store.contacts(), rng) {
            Some(p) => {
                self.current = Some(p);
                true
            }
            None => false,
        }
    }

    /// Enter Shuffling. Refused while already shuffling or on an empty store.
    pub fn begin_shuffle(&mut self, store: &ContactStore) -> Option<ShuffleTicket> {
        if self.phase == Phase::Shuffling || store.is_empty() {
            return None;
        }
        self.phase = Phase::Shuffling;
        self.generation = self.generation.wrapping_add(1);
        Some(ShuffleTicket {
            generation: self.generation,
        })
    }

    /// Whether `ticket` still owns the running shuffle.
    #[must_use]
    pub fn is_live(&self, ticket: ShuffleTicket) -> bool {
        self.phase == Phase::Shuffling && ticket.generation == self.generation
    }

    /// Apply one shuffle step. Stale tickets apply nothing.
    ///
    /// Returns the pick that was applied.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        ticket: ShuffleTicket,
        store: &ContactStore,
        rng: &mut R,
    ) -> Option<Pick> {
        if !self.is_live(ticket) {
            return None;
        }
        let next = self.draw(store.contacts(), rng)?;
        self.current = Some(next.clone());
        Some(next)
    }

    /// Leave Shuffling at the end of the shuffle `ticket` belongs to.
    pub fn finish(&mut self, ticket: ShuffleTicket) {
        if self.is_live(ticket) {
            self.phase = Phase::Idle;
        }
    }

    /// Abandon any running shuffle. Its remaining steps become no-ops.
    pub fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.phase = Phase::Idle;
    }

    /// Clear the current pick.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Drop the current pick if it refers to `id`.
    pub fn forget(&mut self, id: ContactId) {
        if self.current.as_ref().is_some_and(|p| p.contact.id == id) {
            self.current = None;
        }
    }

    /// Refresh the current pick from `store`.
    ///
    /// The pick is replaced by the store's copy of the same id (so edits
    /// show up) or cleared if that id is gone. The colour is kept.
    pub fn resync(&mut self, store: &ContactStore) {
        let Some(current) = self.current.as_mut() else {
            return;
        };
        match store.get(current.contact.id) {
            Some(fresh) => current.contact = fresh,
            None => self.current = None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
