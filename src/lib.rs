use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate, Weekday};
use std::fs;
use std::path::PathBuf;
use strum::IntoEnumIterator;

// --- Declare modules ---
pub mod config;
pub mod db;
pub mod history;
pub mod plan;
pub mod progress;
pub mod schedule;

// --- Expose public types ---
pub use config::{
    get_config_path as get_config_path_util, load as load_config_util, parse_color,
    save as save_config_util, Config, Error as ConfigError, StandardColor, Theme,
};
pub use db::{
    get_db_path as get_db_path_util, Error as DbError, KeyValueStore, MemoryStore, SqliteStore,
    StoreName,
};
pub use history::{HistoryEntry, HistoryLog, HistoryRow};
pub use plan::{add_exercise, ExerciseEntry, ExerciseKey, NewExercise, WorkoutPlan};
pub use progress::{DayStats, KeyedMap, NotesState, ProgressState, ProgressStore};
pub use schedule::{parse_schedule, parse_schedule_with, ScheduleFormat};

const SCHEDULE_FILE_NAME: &str = "workouts.tsv";

/// Source of "today" for history entries.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date from `chrono::Local`. History recorded just after
/// local midnight lands on the new local day, not on the UTC date.
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always the same date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Owns the plan and all tracking state. Every command runs to completion and
/// writes the stores it touched before returning.
pub struct AppService {
    pub config: Config,
    plan: WorkoutPlan,
    overlay: WorkoutPlan,
    progress: ProgressStore,
    history: HistoryLog,
    store: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    selected_day: String,
    history_date: NaiveDate,
}

impl AppService {
    /// Loads config, opens the database and reads the schedule file.
    /// # Errors
    /// Returns `anyhow::Error` if the config or database can't be opened. A
    /// missing or unreadable schedule only logs an error and yields an empty plan.
    pub fn initialize() -> Result<Self> {
        let config_path =
            config::get_config_path().context("Failed to determine configuration file path")?;
        let config = config::load(&config_path)
            .with_context(|| format!("Failed to load config from {config_path:?}"))?;

        let db_path = db::get_db_path().context("Failed to determine database path")?;
        let store = SqliteStore::open(&db_path)
            .with_context(|| format!("Failed to open database at {db_path:?}"))?;

        let schedule_text = match get_schedule_path(&config) {
            Ok(path) => match fs::read_to_string(&path) {
                Ok(text) => Some(text),
                Err(e) => {
                    log::error!("Error loading workout schedule from {path:?}: {e}");
                    None
                }
            },
            Err(e) => {
                log::error!("Could not determine schedule path: {e}");
                None
            }
        };

        Ok(Self::load(config, Box::new(store), schedule_text.as_deref()))
    }

    /// Builds the service from a config, a store and the schedule text.
    /// Never fails: each store that can't be read starts out empty.
    pub fn load(config: Config, store: Box<dyn KeyValueStore>, schedule_text: Option<&str>) -> Self {
        let mut plan = match schedule_text {
            Some(text) => parse_schedule_with(text, &config.schedule),
            None => WorkoutPlan::new(),
        };

        let overlay: WorkoutPlan = load_or_default(store.as_ref(), StoreName::PlanOverlay);
        let added = plan.merge_overlay(&overlay);
        if added > 0 {
            log::info!("Appended {added} exercise(s) from saved plan edits");
        }

        let progress = ProgressStore::new(
            load_or_default(store.as_ref(), StoreName::Progress),
            load_or_default(store.as_ref(), StoreName::Notes),
        );
        let history = load_or_default(store.as_ref(), StoreName::History);

        let clock: Box<dyn Clock> = Box::new(SystemClock);
        let today = clock.today();
        Self {
            config,
            plan,
            overlay,
            progress,
            history,
            store,
            clock,
            selected_day: weekday_name(today.weekday()).to_string(),
            history_date: today,
        }
    }

    /// Replaces the date source. Selected day and history date follow the new clock.
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        let today = clock.today();
        self.selected_day = weekday_name(today.weekday()).to_string();
        self.history_date = today;
        self.clock = clock;
        self
    }

    // --- Reads ---

    pub fn plan(&self) -> &WorkoutPlan {
        &self.plan
    }

    pub fn days(&self) -> Vec<&str> {
        self.plan.days()
    }

    pub fn selected_day(&self) -> &str {
        &self.selected_day
    }

    pub fn history_date(&self) -> NaiveDate {
        self.history_date
    }

    pub fn stats(&self, day: &str) -> DayStats {
        self.progress.stats(day, &self.plan)
    }

    pub fn selected_day_stats(&self) -> DayStats {
        self.stats(&self.selected_day)
    }

    pub fn is_completed(&self, key: &ExerciseKey) -> bool {
        self.progress.is_completed(key)
    }

    pub fn note(&self, key: &ExerciseKey) -> Option<&str> {
        self.progress.note(key)
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn history_entry(&self, date: NaiveDate) -> Option<&HistoryEntry> {
        self.history.lookup(date)
    }

    pub fn selected_history(&self) -> Option<&HistoryEntry> {
        self.history.lookup(self.history_date)
    }

    pub fn history_dates(&self) -> Vec<NaiveDate> {
        self.history.dates().collect()
    }

    /// Size in bytes of each persisted store, `None` if it was never written.
    pub fn stored_sizes(&self) -> Vec<(StoreName, Option<usize>)> {
        StoreName::iter()
            .map(|name| {
                let size = match self.store.load(name.as_ref()) {
                    Ok(raw) => raw.map(|r| r.len()),
                    Err(e) => {
                        log::warn!("Failed to read store '{name}': {e}");
                        None
                    }
                };
                (name, size)
            })
            .collect()
    }

    // --- Commands ---

    pub fn select_day(&mut self, day: &str) {
        self.selected_day = day.to_string();
    }

    pub fn select_history_date(&mut self, date: NaiveDate) {
        self.history_date = date;
    }

    /// Flips completion for `key`, recording it (and its current note) in today's history.
    pub fn toggle(&mut self, key: &ExerciseKey) -> bool {
        let completed = self.progress.toggle(key);
        let today = self.clock.today();
        self.history
            .record(today, key, completed, self.progress.note(key));

        self.persist(StoreName::Progress);
        self.persist(StoreName::History);
        completed
    }

    pub fn set_note(&mut self, key: &ExerciseKey, text: &str) {
        self.progress.set_note(key, text);
        let today = self.clock.today();
        self.history.record_note(today, key, text);

        self.persist(StoreName::Notes);
        self.persist(StoreName::History);
    }

    /// Clears completion and notes for `day`. History is left as recorded.
    pub fn reset_day(&mut self, day: &str) -> usize {
        let removed = self.progress.reset_day(day);
        log::info!("Cleared {removed} progress/note entries for {day}");

        self.persist(StoreName::Progress);
        self.persist(StoreName::Notes);
        removed
    }

    /// Adds an exercise to `day`. Returns `false` (and changes nothing) when a
    /// required field is blank.
    ///
    /// The addition is also kept in the overlay, which holds only user-added
    /// exercises and is appended to the parsed schedule on the next load.
    pub fn add_exercise(&mut self, day: &str, input: &NewExercise) -> bool {
        if !add_exercise(&mut self.overlay, day, input, &self.config.schedule) {
            log::debug!("Ignoring add-exercise with missing fields for day '{day}'");
            return false;
        }
        add_exercise(&mut self.plan, day, input, &self.config.schedule);
        self.persist(StoreName::PlanOverlay);
        true
    }

    fn persist(&mut self, name: StoreName) {
        let result = match name {
            StoreName::Progress => db::save_json(self.store.as_mut(), name, &self.progress.progress),
            StoreName::Notes => db::save_json(self.store.as_mut(), name, &self.progress.notes),
            StoreName::History => db::save_json(self.store.as_mut(), name, &self.history),
            StoreName::PlanOverlay => db::save_json(self.store.as_mut(), name, &self.overlay),
        };
        if let Err(e) = result {
            log::warn!("Failed to save '{name}': {e}");
        }
    }
}

fn load_or_default<T>(store: &dyn KeyValueStore, name: StoreName) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    match db::load_json(store, name) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            log::error!("Error loading '{name}', starting empty: {e}");
            T::default()
        }
    }
}

/// Path of the schedule file: the configured one, or `workouts.tsv` in the data directory.
pub fn get_schedule_path(config: &Config) -> Result<PathBuf, DbError> {
    match &config.schedule_path {
        Some(path) => Ok(path.clone()),
        None => Ok(db::app_data_dir()?.join(SCHEDULE_FILE_NAME)),
    }
}
