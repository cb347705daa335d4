use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::JournalEntry;

/// Append-only record of committed task descriptions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLedger {
    entries: Vec<JournalEntry>,
}

impl JournalLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always appends a fresh entry, even when `date` already has one.
    pub fn append(&mut self, date: NaiveDate, descriptions: Vec<String>) {
        self.entries.push(JournalEntry {
            session_date: date,
            descriptions,
        });
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn entries_for(&self, date: NaiveDate) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter().filter(move |e| e.session_date == date)
    }

    pub fn latest(&self) -> Option<&JournalEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
