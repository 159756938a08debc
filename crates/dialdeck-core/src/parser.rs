//! # Row Parser
//!
//! Turns delimited text with a header row into candidate contacts.
//!
//! - Columns are matched by header name, in any order. Unknown columns are
//!   ignored, missing ones take their default.
//! - Rows are never rejected for their content: an empty name still yields
//!   a contact.
//! - Ids are assigned sequentially from zero in row order. They are not
//!   reconciled with any store here.

use crate::primitives::{FIELD_AVATAR, FIELD_DOB, FIELD_LAST_SPOKEN, FIELD_NAME, FIELD_PHONE};
use crate::{Avatar, Contact, ContactId, iso_timestamp};
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};

/// A row the CSV reader could not decode (e.g. invalid UTF-8).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line number in the input (the header is line 1).
    pub line: u64,
    pub reason: String,
}

/// Result of parsing one import file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// Candidate contacts, ids `0..n` in row order.
    pub contacts: Vec<Contact>,
    /// Rows dropped because the reader failed on them.
    pub skipped: Vec<SkippedRow>,
}

/// Column positions resolved from the header row.
#[derive(Debug, Default, Clone, Copy)]
struct Columns {
    name: Option<usize>,
    dob: Option<usize>,
    phone: Option<usize>,
    last_spoken: Option<usize>,
    avatar: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let mut columns = Self::default();
        // First occurrence of a repeated header wins
        for (idx, header) in headers.iter().enumerate() {
            let slot = match normalize_header(header).as_str() {
                FIELD_NAME => &mut columns.name,
                FIELD_DOB => &mut columns.dob,
                FIELD_PHONE => &mut columns.phone,
                FIELD_LAST_SPOKEN => &mut columns.last_spoken,
                FIELD_AVATAR => &mut columns.avatar,
                _ => continue,
            };
            slot.get_or_insert(idx);
        }
        columns
    }
}

/// Lower-case and drop `_`, `-` and spaces, so `lastSpoken`,
/// `last_spoken` and `Last Spoken` all match.
fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

fn cell<'r>(record: &'r StringRecord, column: Option<usize>) -> Option<&'r str> {
    column.and_then(|idx| record.get(idx))
}

/// The Row Parser.
pub struct RowParser;

impl RowParser {
    /// Parse `text`, stamping missing `lastSpoken` cells with the current
    /// time.
    #[must_use]
    pub fn parse(text: &str) -> ParseReport {
        Self::parse_bytes_at(text.as_bytes(), Utc::now())
    }

    /// Parse `text`, stamping missing `lastSpoken` cells with `now`.
    #[must_use]
    pub fn parse_at(text: &str, now: DateTime<Utc>) -> ParseReport {
        Self::parse_bytes_at(text.as_bytes(), now)
    }

    /// Parse raw file content. Rows that are not valid UTF-8 are skipped
    /// and reported; the rest still produce contacts.
    #[must_use]
    pub fn parse_bytes(bytes: &[u8]) -> ParseReport {
        Self::parse_bytes_at(bytes, Utc::now())
    }

    /// [`RowParser::parse_bytes`] with an explicit `now`.
    #[must_use]
    pub fn parse_bytes_at(bytes: &[u8], now: DateTime<Utc>) -> ParseReport {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(bytes);

        let columns = match reader.headers() {
            Ok(headers) => Columns::from_headers(headers),
            Err(e) => {
                return ParseReport {
                    contacts: Vec::new(),
                    skipped: vec![SkippedRow {
                        line: 1,
                        reason: e.to_string(),
                    }],
                };
            }
        };

        let stamp = iso_timestamp(now);
        let mut report = ParseReport::default();

        for result in reader.records() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    let line = e.position().map(|p| p.line()).unwrap_or_default();
                    report.skipped.push(SkippedRow {
                        line,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let id = ContactId(report.contacts.len() as u64);
            report
                .contacts
                .push(Self::to_contact(id, &record, columns, &stamp));
        }

        report
    }

    fn to_contact(id: ContactId, record: &StringRecord, columns: Columns, stamp: &str) -> Contact {
        let text = |column| cell(record, column).unwrap_or_default().to_string();

        let last_spoken = cell(record, columns.last_spoken)
            .filter(|s| !s.is_empty())
            .map_or_else(|| stamp.to_string(), str::to_string);

        let avatar = cell(record, columns.avatar)
            .map(Avatar::from_import)
            .unwrap_or_default();

        Contact {
            id,
            name: text(columns.name),
            dob: text(columns.dob),
            phone: text(columns.phone),
            last_spoken,
            avatar,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
