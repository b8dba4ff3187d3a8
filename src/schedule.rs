//src/schedule.rs
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};

use crate::plan::{ExerciseEntry, WorkoutPlan};

const DEFAULT_SEARCH_URL_BASE: &str = "https://www.google.com/search?tbm=isch&q=";
const DEFAULT_SEARCH_SUFFIX: &str = "exercise";
const MIN_FIELDS: usize = 4;

/// How schedule files are recognized and how missing reference links are built.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ScheduleFormat {
    /// A line whose first field matches one of these (ignoring ASCII case) is the header.
    pub header_labels: Vec<String>,
    pub search_url_base: String,
    pub search_suffix: String,
}

impl Default for ScheduleFormat {
    fn default() -> Self {
        Self {
            header_labels: vec!["Dia da Semana".to_string(), "Day".to_string()],
            search_url_base: DEFAULT_SEARCH_URL_BASE.to_string(),
            search_suffix: DEFAULT_SEARCH_SUFFIX.to_string(),
        }
    }
}

impl ScheduleFormat {
    /// Image-search link for an exercise name, used when the source has none.
    pub fn reference_url_for(&self, exercise: &str) -> String {
        let query = if self.search_suffix.is_empty() {
            exercise.to_string()
        } else {
            format!("{exercise} {}", self.search_suffix)
        };
        format!("{}{}", self.search_url_base, urlencoding::encode(&query))
    }

    fn is_header(&self, first_field: &str) -> bool {
        self.header_labels
            .iter()
            .any(|label| first_field.eq_ignore_ascii_case(label.trim()))
    }
}

/// Parses tab-separated schedule text with the default format.
pub fn parse_schedule(text: &str) -> WorkoutPlan {
    parse_schedule_with(text, &ScheduleFormat::default())
}

/// Parses tab-separated schedule text into a plan.
///
/// Never fails: lines that are blank, headers, short, or unreadable are
/// skipped and the rest of the input is still processed.
pub fn parse_schedule_with(text: &str, format: &ScheduleFormat) -> WorkoutPlan {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut plan = WorkoutPlan::new();
    let mut skipped = 0usize;

    for (index, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                log::debug!("Skipping unreadable schedule record {}: {}", index + 1, e);
                skipped += 1;
                continue;
            }
        };

        match entry_from_record(&record, format) {
            Some((day, group, entry)) => plan.push(day, group, entry),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        log::debug!("Skipped {skipped} schedule line(s)");
    }
    plan
}

fn entry_from_record<'r>(
    record: &'r StringRecord,
    format: &ScheduleFormat,
) -> Option<(&'r str, &'r str, ExerciseEntry)> {
    if record.len() < MIN_FIELDS {
        return None;
    }
    let day = record.get(0)?;
    if format.is_header(day) {
        return None;
    }
    let group = record.get(1)?;
    let name = record.get(2)?;
    let sets_reps = record.get(3)?;
    if day.is_empty() || group.is_empty() || name.is_empty() || sets_reps.is_empty() {
        return None;
    }

    let reference_url = match record.get(4) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => format.reference_url_for(name),
    };

    Some((
        day,
        group,
        ExerciseEntry {
            name: name.to_string(),
            sets_reps: sets_reps.to_string(),
            reference_url,
        },
    ))
}
