//src/history.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::plan::ExerciseKey;
use crate::progress::{NotesState, ProgressState};

/// Everything recorded on one calendar date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub exercises: ProgressState,
    pub notes: NotesState,
}

/// One line of a history entry, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow<'a> {
    pub key: &'a ExerciseKey,
    /// `None` when only a note was written that day.
    pub completed: Option<bool>,
    pub note: Option<&'a str>,
}

impl HistoryEntry {
    pub fn rows(&self) -> Vec<HistoryRow<'_>> {
        let keys: BTreeSet<&ExerciseKey> = self.exercises.keys().chain(self.notes.keys()).collect();
        keys.into_iter()
            .map(|key| HistoryRow {
                key,
                completed: self.exercises.get(key).copied(),
                note: self.notes.get(key).map(String::as_str),
            })
            .collect()
    }
}

/// Daily snapshots of completion and notes. Entries are merged key by key and
/// never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog(BTreeMap<NaiveDate, HistoryEntry>);

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Records a completion change for `key` on `date`. A note is only
    /// written when one is given and non-blank; an existing note is never cleared.
    pub fn record(&mut self, date: NaiveDate, key: &ExerciseKey, completed: bool, note: Option<&str>) {
        let entry = self.0.entry(date).or_default();
        entry.exercises.insert(key.clone(), completed);
        if let Some(note) = note.filter(|n| !n.trim().is_empty()) {
            entry.notes.insert(key.clone(), note.to_string());
        }
    }

    /// Records just a note for `key` on `date`. Blank notes are ignored.
    pub fn record_note(&mut self, date: NaiveDate, key: &ExerciseKey, note: &str) {
        if note.trim().is_empty() {
            return;
        }
        self.0
            .entry(date)
            .or_default()
            .notes
            .insert(key.clone(), note.to_string());
    }

    pub fn lookup(&self, date: NaiveDate) -> Option<&HistoryEntry> {
        self.0.get(&date)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.0.keys().copied()
    }
}
