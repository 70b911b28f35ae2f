//! Read-projection over the upload history.

use std::sync::Arc;

use chrono::Local;

use crate::dataset::{DatasetId, HistoryEntry};

/// Ordered list of past uploads.
///
/// The store is never edited in place: a refresh builds a new store from the
/// backend's list and swaps it in. Cloning is cheap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryStore {
    entries: Arc<[HistoryEntry]>,
}

/// A selectable history row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryItem {
    pub id: DatasetId,
    pub label: String,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at a display position.
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn find(&self, id: DatasetId) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Display rows: `"{name} ({uploaded_at})"` in local time.
    pub fn items(&self) -> Vec<HistoryItem> {
        self.entries
            .iter()
            .map(|entry| HistoryItem {
                id: entry.id,
                label: match entry.uploaded_at {
                    Some(uploaded_at) => format!(
                        "{} ({})",
                        entry.name,
                        uploaded_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
                    ),
                    None => entry.name.clone(),
                },
            })
            .collect()
    }
}

impl From<Vec<HistoryEntry>> for HistoryStore {
    fn from(entries: Vec<HistoryEntry>) -> Self {
        Self {
            entries: entries.into(),
        }
    }
}
