//! # dialdeck-core
//!
//! The contact engine for Dialdeck - THE LOGIC.
//!
//! Dialdeck keeps a list of personal contacts and shows one at a time,
//! chosen at random, so the user can call, edit or delete it.
//!
//! ## Components
//!
//! - `store`: the Contact Store (CRUD, merge, call history)
//! - `selection`: uniform picks, the shuffle schedule and the
//!   Idle/Shuffling state machine
//! - `parser`: the Row Parser for CSV imports
//! - `seed`: built-in starter contacts
//! - `display`: relative-date labels
//!
//! ## Architectural Constraints
//!
//! - Synchronous: timing and I/O belong to the app layer
//! - Total: no store or selection operation fails on a missing id or an
//!   empty collection
//! - No logging: operations that can partially succeed return a report

// =============================================================================
// MODULES
// =============================================================================

pub mod display;
pub mod parser;
pub mod primitives;
pub mod seed;
pub mod selection;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Avatar, CallDirection, CallHistoryItem, CallId, Contact, ContactId, ContactPatch,
    DialdeckError, iso_timestamp, parse_birth_date, parse_timestamp,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use display::{history_label, last_spoken_label};
pub use parser::{ParseReport, RowParser, SkippedRow};
pub use seed::starter_contacts;
pub use selection::{Palette, Phase, Pick, Selector, ShuffleSchedule, ShuffleTicket, pick};
pub use store::{ContactStore, MergeReport};
