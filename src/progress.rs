use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::plan::{ExerciseKey, WorkoutPlan};

/// A map keyed by `ExerciseKey`.
///
/// Serialized as a list of `{ "key": ..., "value": ... }` records, since JSON
/// object keys must be strings and the key is structured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedMap<V>(BTreeMap<ExerciseKey, V>);

pub type ProgressState = KeyedMap<bool>;
pub type NotesState = KeyedMap<String>;

impl<V> Default for KeyedMap<V> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<V> KeyedMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ExerciseKey) -> Option<&V> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: ExerciseKey, value: V) -> Option<V> {
        self.0.insert(key, value)
    }

    pub fn remove(&mut self, key: &ExerciseKey) -> Option<V> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, ExerciseKey, V> {
        self.0.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, ExerciseKey, V> {
        self.0.keys()
    }

    /// Drops every entry whose key belongs to exactly `day`. Returns how many were removed.
    pub fn remove_day(&mut self, day: &str) -> usize {
        let before = self.0.len();
        self.0.retain(|key, _| key.day != day);
        before - self.0.len()
    }
}

impl<V> FromIterator<(ExerciseKey, V)> for KeyedMap<V> {
    fn from_iter<I: IntoIterator<Item = (ExerciseKey, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Serialize)]
struct KeyedRecordRef<'a, V> {
    key: &'a ExerciseKey,
    value: &'a V,
}

#[derive(Deserialize)]
struct KeyedRecord<V> {
    key: ExerciseKey,
    value: V,
}

impl<V: Serialize> Serialize for KeyedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            self.0
                .iter()
                .map(|(key, value)| KeyedRecordRef { key, value }),
        )
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for KeyedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let records = Vec::<KeyedRecord<V>>::deserialize(deserializer)?;
        Ok(records
            .into_iter()
            .map(|record| (record.key, record.value))
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DayStats {
    pub total: usize,
    pub completed: usize,
    pub percentage: u32,
}

impl DayStats {
    fn from_counts(total: usize, completed: usize) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u32
        };
        Self {
            total,
            completed,
            percentage,
        }
    }
}

/// Completion flags and notes for the exercises in the plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressStore {
    pub progress: ProgressState,
    pub notes: NotesState,
}

impl ProgressStore {
    pub fn new(progress: ProgressState, notes: NotesState) -> Self {
        Self { progress, notes }
    }

    pub fn is_completed(&self, key: &ExerciseKey) -> bool {
        self.progress.get(key).copied().unwrap_or(false)
    }

    pub fn note(&self, key: &ExerciseKey) -> Option<&str> {
        self.notes.get(key).map(String::as_str)
    }

    /// Flips the completion flag for `key` and returns the new value.
    pub fn toggle(&mut self, key: &ExerciseKey) -> bool {
        let completed = !self.is_completed(key);
        self.progress.insert(key.clone(), completed);
        completed
    }

    /// Sets the note for `key`. Blank text removes it.
    pub fn set_note(&mut self, key: &ExerciseKey, text: &str) {
        if text.trim().is_empty() {
            self.notes.remove(key);
        } else {
            self.notes.insert(key.clone(), text.to_string());
        }
    }

    /// Clears completion and notes for `day`. Only keys whose day equals `day`
    /// are touched; `"Mon"` leaves `"Monday"` alone.
    pub fn reset_day(&mut self, day: &str) -> usize {
        self.progress.remove_day(day) + self.notes.remove_day(day)
    }

    pub fn stats(&self, day: &str, plan: &WorkoutPlan) -> DayStats {
        let exercises = plan.exercises_for(day);
        let completed = exercises
            .iter()
            .filter(|(key, _)| self.is_completed(key))
            .count();
        DayStats::from_counts(exercises.len(), completed)
    }
}
