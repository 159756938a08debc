//! # Core Type Definitions
//!
//! This module contains all core types for the Dialdeck contact engine:
//! - Identifiers (`ContactId`, `CallId`)
//! - Contact records (`Contact`, `Avatar`, `ContactPatch`)
//! - Call history (`CallHistoryItem`, `CallDirection`)
//! - Error types (`DialdeckError`)
//!
//! ## Value Semantics
//!
//! Every type here is a plain owned value. A `Contact` handed out by the
//! store is a copy: editing the store afterwards never changes it.

use crate::primitives::PLACEHOLDER_AVATAR;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifier of a contact in the store.
///
/// Assigned at creation. Imported batches may reuse ids already present in
/// the store unless they are renumbered before the merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContactId(pub u64);

/// Identifier of a call history entry, in milliseconds since the Unix epoch.
///
/// Two calls in the same millisecond share an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CallId(pub i64);

impl CallId {
    /// Derive a call id from the call time.
    #[must_use]
    pub fn from_time(at: DateTime<Utc>) -> Self {
        Self(at.timestamp_millis())
    }
}

// =============================================================================
// AVATAR
// =============================================================================

/// What a contact card shows in its photo slot.
///
/// The variant is chosen where the value is produced: the placeholder and
/// imported text are glyphs, image-picker results are image references.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Avatar {
    /// A short emoji or text token shown as-is.
    Glyph(String),
    /// A URI pointing at an image resource.
    ImageRef(String),
}

impl Avatar {
    /// The generic placeholder glyph.
    #[must_use]
    pub fn placeholder() -> Self {
        Self::Glyph(PLACEHOLDER_AVATAR.to_string())
    }

    /// Build an avatar from an imported text cell.
    ///
    /// Cells carrying a URI scheme become image references, everything
    /// else is a glyph. Blank cells fall back to the placeholder.
    #[must_use]
    pub fn from_import(cell: &str) -> Self {
        let cell = cell.trim();
        if cell.is_empty() {
            return Self::placeholder();
        }
        if has_uri_scheme(cell) {
            Self::ImageRef(cell.to_string())
        } else {
            Self::Glyph(cell.to_string())
        }
    }

    /// Raw text of the avatar (glyph or URI).
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Glyph(s) | Self::ImageRef(s) => s,
        }
    }

    /// Whether this avatar points at an image.
    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self, Self::ImageRef(_))
    }
}

impl Default for Avatar {
    fn default() -> Self {
        Self::placeholder()
    }
}

/// `scheme:` prefix per RFC 3986 (letter, then letters/digits/`+-.`),
/// followed by something.
fn has_uri_scheme(s: &str) -> bool {
    let Some((scheme, rest)) = s.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    starts_alpha
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        && !rest.is_empty()
}

// =============================================================================
// CONTACT
// =============================================================================

/// Accepted date-of-birth layouts.
const DOB_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];

/// A personal contact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    /// Free-form date of birth, see [`Contact::birth_date`].
    pub dob: String,
    pub phone: String,
    /// ISO-8601 time of the most recent outgoing call.
    pub last_spoken: String,
    pub avatar: Avatar,
}

impl Contact {
    /// Create a contact with empty optional fields, a placeholder avatar and
    /// `last_spoken` set to `now`.
    #[must_use]
    pub fn new(id: ContactId, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            dob: String::new(),
            phone: String::new(),
            last_spoken: iso_timestamp(now),
            avatar: Avatar::placeholder(),
        }
    }

    /// Parse `dob` as a calendar date (`MM/DD/YYYY` or `YYYY-MM-DD`).
    #[must_use]
    pub fn birth_date(&self) -> Option<NaiveDate> {
        parse_birth_date(&self.dob)
    }

    /// Parse `last_spoken` (RFC 3339, or a bare `YYYY-MM-DD` taken as
    /// midnight UTC).
    #[must_use]
    pub fn last_spoken_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.last_spoken)
    }

    /// Apply a partial update. The id and unspecified fields are kept.
    pub fn apply(&mut self, patch: &ContactPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(dob) = &patch.dob {
            self.dob.clone_from(dob);
        }
        if let Some(phone) = &patch.phone {
            self.phone.clone_from(phone);
        }
        if let Some(avatar) = &patch.avatar {
            self.avatar = avatar.clone();
        }
    }
}

/// Parse a date of birth in one of the accepted layouts.
#[must_use]
pub fn parse_birth_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DOB_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parse an ISO-8601 timestamp or a bare calendar date.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Format a time the way call timestamps are stored
/// (`2025-01-15T09:30:00.000Z`).
#[must_use]
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// =============================================================================
// CONTACT PATCH
// =============================================================================

/// Partial update of a contact. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Avatar>,
}

impl ContactPatch {
    /// Patch that only renames.
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Patch that only replaces the avatar.
    #[must_use]
    pub fn avatar(avatar: Avatar) -> Self {
        Self {
            avatar: Some(avatar),
            ..Self::default()
        }
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.dob.is_none() && self.phone.is_none() && self.avatar.is_none()
    }

    /// Reject a non-empty `dob` that is not a calendar date.
    ///
    /// The store accepts any patch; callers that want clean data check
    /// first.
    pub fn validate(&self) -> Result<(), DialdeckError> {
        match &self.dob {
            Some(dob) if !dob.trim().is_empty() && parse_birth_date(dob).is_none() => {
                Err(DialdeckError::InvalidDate(dob.clone()))
            }
            _ => Ok(()),
        }
    }
}

// =============================================================================
// CALL HISTORY
// =============================================================================

/// Direction of a logged call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallDirection {
    Outgoing,
    Incoming,
}

impl CallDirection {
    /// Label shown in the recent-calls list.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Outgoing => "↗ Outgoing",
            Self::Incoming => "↙ Incoming",
        }
    }
}

/// One logged call.
///
/// Holds a copy of the contact as it was when the call was placed; later
/// edits to the contact leave the entry unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallHistoryItem {
    pub id: CallId,
    pub contact: Contact,
    #[serde(rename = "type")]
    pub direction: CallDirection,
    pub timestamp: String,
}

impl CallHistoryItem {
    /// Record an outgoing call to `contact` at `at`.
    #[must_use]
    pub fn outgoing(contact: Contact, at: DateTime<Utc>) -> Self {
        Self {
            id: CallId::from_time(at),
            contact,
            direction: CallDirection::Outgoing,
            timestamp: iso_timestamp(at),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in Dialdeck.
///
/// Store and selection operations never produce these: a missing id or an
/// empty store is a no-op. Errors come from I/O, configuration and explicit
/// validation only.
#[derive(Debug, Error)]
pub enum DialdeckError {
    /// A date field could not be parsed as a calendar date.
    #[error("Invalid date: {0:?}")]
    InvalidDate(String),

    /// A field value was rejected by validation (e.g. too long).
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// The content behind a selected file could not be read.
    #[error("Import read failed: {0}")]
    ImportRead(String),

    /// The configuration file is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),
}

// =============================================================================
// TESTS
// =============================================================================
