//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP control surface.

use chrono::{DateTime, Utc};
use dialdeck_core::{
    Avatar, CallHistoryItem, Contact, ContactPatch, DialdeckError, MergeReport, Phase,
    history_label, last_spoken_label,
};
use serde::{Deserialize, Serialize};

/// Maximum length of any text field in a patch.
pub const MAX_FIELD_LENGTH: usize = 1024;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// CONTACTS
// =============================================================================

/// Contact list response, insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactsResponse {
    pub count: usize,
    pub contacts: Vec<Contact>,
}

/// Contact edit request. Absent fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar: Option<Avatar>,
}

impl EditRequest {
    /// Convert to a patch, checking field lengths and the date of birth.
    pub fn to_patch(&self) -> Result<ContactPatch, DialdeckError> {
        let fields = [
            ("name", self.name.as_deref()),
            ("dob", self.dob.as_deref()),
            ("phone", self.phone.as_deref()),
            ("avatar", self.avatar.as_ref().map(Avatar::as_str)),
        ];
        for (field, value) in fields {
            if let Some(value) = value
                && value.len() > MAX_FIELD_LENGTH
            {
                return Err(DialdeckError::InvalidField(format!(
                    "Field '{}' length {} exceeds maximum {} bytes",
                    field,
                    value.len(),
                    MAX_FIELD_LENGTH
                )));
            }
        }

        let patch = ContactPatch {
            name: self.name.clone(),
            dob: self.dob.clone(),
            phone: self.phone.clone(),
            avatar: self.avatar.clone(),
        };
        patch.validate()?;
        Ok(patch)
    }
}

/// Image-picker result for a contact photo. `None` means cancelled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvatarRequest {
    #[serde(default)]
    pub uri: Option<String>,
}

/// Generic mutation acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationResponse {
    pub success: bool,
    /// Whether a contact with that id existed.
    pub found: bool,
    pub error: Option<String>,
}

impl MutationResponse {
    pub fn applied(found: bool) -> Self {
        Self {
            success: true,
            found,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            found: false,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// HISTORY
// =============================================================================

/// One call in the recent-calls list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub item: CallHistoryItem,
    pub direction_label: String,
    pub when: String,
}

impl HistoryEntry {
    pub fn new(item: CallHistoryItem, now: DateTime<Utc>) -> Self {
        Self {
            direction_label: item.direction.label().to_string(),
            when: history_label(&item.timestamp, now),
            item,
        }
    }
}

/// Recent calls, most recent first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub count: usize,
    pub calls: Vec<HistoryEntry>,
}

// =============================================================================
// CARD & ACTIONS
// =============================================================================

/// What the card shows right now.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentResponse {
    pub contact: Option<Contact>,
    pub color: String,
    pub phase: Phase,
    /// "Last call" label for the shown contact.
    pub last_call: Option<String>,
}

impl CurrentResponse {
    pub fn new(contact: Option<Contact>, color: String, phase: Phase, now: DateTime<Utc>) -> Self {
        let last_call = contact
            .as_ref()
            .map(|c| last_spoken_label(&c.last_spoken, now));
        Self {
            contact,
            color,
            phase,
            last_call,
        }
    }
}

/// Terminal action response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    /// False when refused (shuffle running, or nothing picked).
    pub accepted: bool,
    /// Whether the action started a shuffle.
    pub shuffling: bool,
}

// =============================================================================
// IMPORT
// =============================================================================

/// Import response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResponse {
    pub success: bool,
    pub appended: usize,
    pub colliding_ids: Vec<u64>,
    pub total: usize,
    pub error: Option<String>,
}

impl ImportResponse {
    pub fn merged(report: &MergeReport, total: usize) -> Self {
        Self {
            success: true,
            appended: report.appended,
            colliding_ids: report.colliding_ids.iter().map(|id| id.0).collect(),
            total,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            appended: 0,
            colliding_ids: Vec::new(),
            total: 0,
            error: Some(msg.into()),
        }
    }
}
