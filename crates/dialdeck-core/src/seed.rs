//! # Starter Contacts
//!
//! The contacts a fresh deck opens with when no import has happened yet.

use crate::{Avatar, Contact, ContactId};

/// (id, name, dob, phone, lastSpoken, avatar)
const STARTERS: [(u64, &str, &str, &str, &str, &str); 5] = [
    (1, "Sarah Johnson", "04/12/1985", "+15551234567", "2025-01-15", "👩"),
    (2, "Michael Chen", "08/23/1990", "+15552345678", "2025-01-10", "👨"),
    (3, "Emma Davis", "11/30/1988", "+15553456789", "2025-01-05", "👩‍🦰"),
    (4, "James Wilson", "02/17/1992", "+15554567890", "2024-12-28", "🧔"),
    (5, "Olivia Martinez", "07/09/1987", "+15555678901", "2024-12-20", "👱‍♀️"),
];

/// The built-in starter contacts, ids 1 to 5.
#[must_use]
pub fn starter_contacts() -> Vec<Contact> {
    STARTERS
        .iter()
        .map(|&(id, name, dob, phone, last_spoken, glyph)| Contact {
            id: ContactId(id),
            name: name.to_string(),
            dob: dob.to_string(),
            phone: phone.to_string(),
            last_spoken: last_spoken.to_string(),
            avatar: Avatar::Glyph(glyph.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starters_have_unique_ids_and_valid_dates() {
        let starters = starter_contacts();
        assert_eq!(starters.len(), 5);

        let ids: std::collections::BTreeSet<_> = starters.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 5);

        for contact in &starters {
            assert!(contact.birth_date().is_some(), "{}", contact.name);
            assert!(contact.last_spoken_at().is_some(), "{}", contact.name);
            assert!(!contact.avatar.is_image());
        }
    }
}
