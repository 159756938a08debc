//! # Primitives
//!
//! Fixed constants for the Dialdeck core.
//!
//! The shuffle constants are defaults; the app layer may override them from
//! its configuration file.

/// Number of picks in one shuffle.
pub const SHUFFLE_STEPS: usize = 20;

/// Delay after the first pick of a shuffle, in milliseconds.
pub const SHUFFLE_BASE_DELAY_MS: u64 = 40;

/// Amount added to the delay after every pick, in milliseconds.
///
/// The constant increment makes the sequence slow down linearly.
pub const SHUFFLE_DELAY_STEP_MS: u64 = 20;

/// Upper bound on the picks in one configured shuffle.
pub const MAX_SHUFFLE_STEPS: usize = 1000;

/// Card colours a pick is presented in.
pub const PALETTE: [&str; 8] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#FFA07A", "#98D8C8", "#F7DC6F", "#BB8FCE", "#85C1E2",
];

/// Glyph used when a contact has no avatar.
pub const PLACEHOLDER_AVATAR: &str = "👤";

/// MIME filter handed to the file-selection collaborator.
pub const IMPORT_MIME_TYPES: [&str; 2] = ["text/csv", "text/comma-separated-values"];

// =============================================================================
// IMPORT HEADER NAMES
// =============================================================================

/// Header names the Row Parser recognises, after normalisation
/// (lower-case, `_`/`-`/space removed).
pub const FIELD_NAME: &str = "name";
pub const FIELD_DOB: &str = "dob";
pub const FIELD_PHONE: &str = "phone";
pub const FIELD_LAST_SPOKEN: &str = "lastspoken";
pub const FIELD_AVATAR: &str = "avatar";
