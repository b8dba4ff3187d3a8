//src/plan.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::schedule::ScheduleFormat;

// Display order for the usual day names; anything else sorts after these.
const WEEKDAY_ORDER: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Identity of an exercise within the plan: `(day, muscle group, exercise name)`.
///
/// Compared component-wise, so names containing separators can't collide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExerciseKey {
    pub day: String,
    pub muscle_group: String,
    pub exercise: String,
}

impl ExerciseKey {
    pub fn new(day: &str, muscle_group: &str, exercise: &str) -> Self {
        Self {
            day: day.to_string(),
            muscle_group: muscle_group.to_string(),
            exercise: exercise.to_string(),
        }
    }
}

impl fmt::Display for ExerciseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.day, self.exercise, self.muscle_group)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseEntry {
    pub name: String,
    pub sets_reps: String,
    pub reference_url: String,
}

/// Input for adding an exercise to a day. Everything but `reference_url` is required.
#[derive(Debug, Clone, Default)]
pub struct NewExercise {
    pub muscle_group: String,
    pub exercise: String,
    pub sets_reps: String,
    pub reference_url: Option<String>,
}

type MuscleGroups = BTreeMap<String, Vec<ExerciseEntry>>;

/// Weekly plan: day -> muscle group -> exercises in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutPlan(BTreeMap<String, MuscleGroups>);

impl WorkoutPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Day names, usual weekdays first (Monday..Sunday), then the rest alphabetically.
    pub fn days(&self) -> Vec<&str> {
        let mut days: Vec<&str> = self.0.keys().map(String::as_str).collect();
        days.sort_by_key(|day| {
            let rank = WEEKDAY_ORDER
                .iter()
                .position(|w| w == day)
                .unwrap_or(WEEKDAY_ORDER.len());
            (rank, *day)
        });
        days
    }

    pub fn group(&self, day: &str, muscle_group: &str) -> Option<&[ExerciseEntry]> {
        self.0
            .get(day)
            .and_then(|groups| groups.get(muscle_group))
            .map(Vec::as_slice)
    }

    /// Every exercise scheduled for `day`, paired with its key.
    pub fn exercises_for(&self, day: &str) -> Vec<(ExerciseKey, &ExerciseEntry)> {
        self.0
            .get(day)
            .into_iter()
            .flat_map(|groups| groups.iter())
            .flat_map(|(group, entries)| {
                entries
                    .iter()
                    .map(move |entry| (ExerciseKey::new(day, group, &entry.name), entry))
            })
            .collect()
    }

    pub fn contains_key(&self, key: &ExerciseKey) -> bool {
        self.group(&key.day, &key.muscle_group)
            .map_or(false, |entries| entries.iter().any(|e| e.name == key.exercise))
    }

    /// Appends `entry` under `plan[day][muscle_group]`, creating both levels if missing.
    pub fn push(&mut self, day: &str, muscle_group: &str, entry: ExerciseEntry) {
        self.0
            .entry(day.to_string())
            .or_default()
            .entry(muscle_group.to_string())
            .or_default()
            .push(entry);
    }

    /// Appends every entry of a saved overlay to this plan, in overlay order.
    /// The overlay only holds user-added exercises, so nothing is deduplicated.
    pub fn merge_overlay(&mut self, overlay: &WorkoutPlan) -> usize {
        let mut added = 0;
        for (day, groups) in &overlay.0 {
            for (group, entries) in groups {
                for entry in entries {
                    self.push(day, group, entry.clone());
                    added += 1;
                }
            }
        }
        added
    }
}

/// Adds an exercise to `day`. Returns `false` without touching the plan when a
/// required field is blank.
pub fn add_exercise(
    plan: &mut WorkoutPlan,
    day: &str,
    input: &NewExercise,
    format: &ScheduleFormat,
) -> bool {
    let day = day.trim();
    let muscle_group = input.muscle_group.trim();
    let name = input.exercise.trim();
    let sets_reps = input.sets_reps.trim();

    if [day, muscle_group, name, sets_reps].iter().any(|f| f.is_empty()) {
        return false;
    }

    let reference_url = match input.reference_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => format.reference_url_for(name),
    };

    plan.push(
        day,
        muscle_group,
        ExerciseEntry {
            name: name.to_string(),
            sets_reps: sets_reps.to_string(),
            reference_url,
        },
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bench() -> NewExercise {
        NewExercise {
            muscle_group: "Chest".into(),
            exercise: "Bench Press".into(),
            sets_reps: "4x8".into(),
            reference_url: None,
        }
    }

    #[test]
    fn add_creates_missing_levels() {
        let mut plan = WorkoutPlan::new();
        assert!(add_exercise(&mut plan, "Friday", &bench(), &ScheduleFormat::default()));

        let group = plan.group("Friday", "Chest").unwrap();
        assert_eq!(group.len(), 1);
        assert_eq!(group[0].name, "Bench Press");
        assert!(group[0].reference_url.contains("Bench%20Press%20exercise"));
    }

    #[test]
    fn add_appends_to_end_of_group() {
        let mut plan = WorkoutPlan::new();
        let format = ScheduleFormat::default();
        add_exercise(&mut plan, "Friday", &bench(), &format);
        let fly = NewExercise {
            exercise: "Cable Fly".into(),
            reference_url: Some("https://example.com/fly".into()),
            ..bench()
        };
        assert!(add_exercise(&mut plan, "Friday", &fly, &format));

        let names: Vec<_> = plan
            .group("Friday", "Chest")
            .unwrap()
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, ["Bench Press", "Cable Fly"]);
        assert_eq!(
            plan.group("Friday", "Chest").unwrap()[1].reference_url,
            "https://example.com/fly"
        );
    }

    #[test]
    fn add_with_missing_field_is_noop() {
        let mut plan = WorkoutPlan::new();
        let format = ScheduleFormat::default();
        let missing_sets = NewExercise {
            sets_reps: "  ".into(),
            ..bench()
        };
        assert!(!add_exercise(&mut plan, "Friday", &missing_sets, &format));
        assert!(!add_exercise(&mut plan, "", &bench(), &format));
        assert!(plan.is_empty());
    }

    #[test]
    fn days_follow_week_order() {
        let mut plan = WorkoutPlan::new();
        let format = ScheduleFormat::default();
        for day in ["Sunday", "Cardio", "Monday", "Wednesday"] {
            add_exercise(&mut plan, day, &bench(), &format);
        }
        assert_eq!(plan.days(), ["Monday", "Wednesday", "Sunday", "Cardio"]);
    }

    #[test]
    fn overlay_merge_appends_every_entry() {
        let format = ScheduleFormat::default();
        let mut source = WorkoutPlan::new();
        add_exercise(&mut source, "Friday", &bench(), &format);

        // Overlay holds only additions, one of them a repeat of a scheduled name
        let mut overlay = WorkoutPlan::new();
        let dips = NewExercise {
            exercise: "Dips".into(),
            ..bench()
        };
        add_exercise(&mut overlay, "Friday", &dips, &format);
        let heavy_bench = NewExercise {
            sets_reps: "5x5".into(),
            ..bench()
        };
        add_exercise(&mut overlay, "Friday", &heavy_bench, &format);

        assert_eq!(source.merge_overlay(&overlay), 2);
        let chest = source.group("Friday", "Chest").unwrap();
        let names: Vec<&str> = chest.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Bench Press", "Dips", "Bench Press"]);
        assert_eq!(chest[2].sets_reps, "5x5");
        assert!(source.contains_key(&ExerciseKey::new("Friday", "Chest", "Dips")));
    }
}
