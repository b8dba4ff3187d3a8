use anyhow::Result;
use chrono::NaiveDate;
use workout_plan_lib::{
    AppService, Config, DbError, ExerciseKey, FixedClock, KeyValueStore, NewExercise,
    SqliteStore, StoreName,
};

const SCHEDULE: &str = "Dia da Semana\tGrupo Muscular\tExercício\tSéries x Repetições\tURL de Busca\n\
Monday\tLegs\tSquat\t3x10\n\
Monday\tLegs\tLunge\t3x12\thttps://example.com/lunge\n\
Monday\tCore\tPlank\t3x60s\n\
MondayExtra\tLegs\tSquat\t5x5\n\
Wednesday\tBack\tRow\t4x8\n";

// 2024-03-04 is a Monday
fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
}

fn tuesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
}

// Helper function to create a test service backed by an in-memory database
fn create_test_service(schedule: Option<&str>, today: NaiveDate) -> Result<AppService> {
    let store = SqliteStore::open_in_memory()?;
    Ok(AppService::load(Config::default(), Box::new(store), schedule)
        .with_clock(Box::new(FixedClock(today))))
}

fn squat() -> ExerciseKey {
    ExerciseKey::new("Monday", "Legs", "Squat")
}

#[test]
fn test_end_to_end_single_exercise() -> Result<()> {
    let mut service = create_test_service(Some("Monday\tLegs\tSquat\t3x10\n"), monday())?;

    let legs = service.plan().group("Monday", "Legs").unwrap();
    assert_eq!(legs.len(), 1);
    assert_eq!(legs[0].name, "Squat");
    assert_eq!(legs[0].sets_reps, "3x10");
    assert!(legs[0].reference_url.contains("Squat%20exercise"));

    assert!(service.toggle(&squat()));
    let stats = service.stats("Monday");
    assert_eq!((stats.total, stats.completed, stats.percentage), (1, 1, 100));
    Ok(())
}

#[test]
fn test_defaults_follow_clock() -> Result<()> {
    let service = create_test_service(Some(SCHEDULE), monday())?;

    assert_eq!(service.selected_day(), "Monday");
    assert_eq!(service.history_date(), monday());
    assert_eq!(service.days(), ["Monday", "Wednesday", "MondayExtra"]);

    let stats = service.selected_day_stats();
    assert_eq!((stats.total, stats.completed, stats.percentage), (3, 0, 0));
    Ok(())
}

#[test]
fn test_missing_schedule_starts_empty() -> Result<()> {
    let mut service = create_test_service(None, monday())?;

    assert!(service.plan().is_empty());
    assert_eq!(service.stats("Monday").percentage, 0);

    // Still usable: edits build the plan from scratch
    let added = service.add_exercise(
        "Monday",
        &NewExercise {
            muscle_group: "Legs".into(),
            exercise: "Squat".into(),
            sets_reps: "3x10".into(),
            reference_url: None,
        },
    );
    assert!(added);
    assert_eq!(service.days(), ["Monday"]);
    Ok(())
}

#[test]
fn test_toggle_twice_restores_and_logs_history() -> Result<()> {
    let mut service = create_test_service(Some(SCHEDULE), monday())?;

    assert!(service.toggle(&squat()));
    assert!(!service.toggle(&squat()));
    assert!(!service.is_completed(&squat()));

    // The day's history keeps the latest value for the key
    let entry = service.history_entry(monday()).unwrap();
    assert_eq!(entry.exercises.get(&squat()), Some(&false));
    Ok(())
}

#[test]
fn test_history_merges_within_a_day() -> Result<()> {
    let mut service = create_test_service(Some(SCHEDULE), monday())?;
    let lunge = ExerciseKey::new("Monday", "Legs", "Lunge");

    service.set_note(&squat(), "100kg");
    service.toggle(&squat());
    service.toggle(&lunge);

    let entry = service.history_entry(monday()).unwrap();
    assert_eq!(entry.exercises.len(), 2);
    assert_eq!(entry.exercises.get(&lunge), Some(&true));
    assert_eq!(entry.notes.get(&squat()).map(String::as_str), Some("100kg"));
    assert_eq!(service.history_dates(), [monday()]);
    Ok(())
}

#[test]
fn test_history_is_per_date() -> Result<()> {
    let mut service = create_test_service(Some(SCHEDULE), monday())?;
    service.toggle(&squat());

    // Next day: same state, later clock
    let mut service = service.with_clock(Box::new(FixedClock(tuesday())));
    assert_eq!(service.selected_day(), "Tuesday");
    service.toggle(&squat());

    assert_eq!(
        service.history_entry(monday()).unwrap().exercises.get(&squat()),
        Some(&true)
    );
    assert_eq!(
        service.history_entry(tuesday()).unwrap().exercises.get(&squat()),
        Some(&false)
    );
    assert_eq!(service.history_dates(), [monday(), tuesday()]);

    service.select_history_date(NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());
    assert!(service.selected_history().is_none());
    service.select_history_date(monday());
    assert_eq!(service.selected_history().unwrap().rows().len(), 1);
    Ok(())
}

#[test]
fn test_reset_day_is_exact_match() -> Result<()> {
    let mut service = create_test_service(Some(SCHEDULE), monday())?;
    let extra = ExerciseKey::new("MondayExtra", "Legs", "Squat");

    service.toggle(&squat());
    service.toggle(&extra);
    service.set_note(&squat(), "deep");
    service.set_note(&extra, "heavy");

    service.reset_day("Monday");

    assert!(!service.is_completed(&squat()));
    assert_eq!(service.note(&squat()), None);
    assert!(service.is_completed(&extra));
    assert_eq!(service.note(&extra), Some("heavy"));
    assert_eq!(service.stats("MondayExtra").completed, 1);

    // History is not rewritten by a reset
    let entry = service.history_entry(monday()).unwrap();
    assert_eq!(entry.exercises.get(&squat()), Some(&true));
    Ok(())
}

#[test]
fn test_add_exercise_validation_is_noop() -> Result<()> {
    let mut service = create_test_service(Some(SCHEDULE), monday())?;
    let before = service.plan().clone();

    let incomplete = NewExercise {
        muscle_group: "Chest".into(),
        exercise: "".into(),
        sets_reps: "4x8".into(),
        reference_url: None,
    };
    assert!(!service.add_exercise("Monday", &incomplete));
    assert_eq!(service.plan(), &before);

    let sizes = service.stored_sizes();
    assert!(sizes
        .iter()
        .any(|(name, size)| *name == StoreName::PlanOverlay && size.is_none()));
    Ok(())
}

#[test]
fn test_persisted_state_round_trips() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("tracker.sqlite");
    let lunge = ExerciseKey::new("Monday", "Legs", "Lunge");
    let bench = ExerciseKey::new("Friday", "Chest", "Bench Press");

    let (progress, notes, history) = {
        let store = SqliteStore::open(&db_path)?;
        let mut service = AppService::load(Config::default(), Box::new(store), Some(SCHEDULE))
            .with_clock(Box::new(FixedClock(monday())));

        service.toggle(&squat());
        service.set_note(&lunge, "left knee | careful - slow");
        assert!(service.add_exercise(
            "Friday",
            &NewExercise {
                muscle_group: "Chest".into(),
                exercise: "Bench Press".into(),
                sets_reps: "4x8".into(),
                reference_url: Some("https://example.com/bench".into()),
            },
        ));
        service.toggle(&bench);

        (
            service.progress().progress.clone(),
            service.progress().notes.clone(),
            service.history().clone(),
        )
    };

    let store = SqliteStore::open(&db_path)?;
    let reloaded = AppService::load(Config::default(), Box::new(store), Some(SCHEDULE))
        .with_clock(Box::new(FixedClock(tuesday())));

    assert_eq!(reloaded.progress().progress, progress);
    assert_eq!(reloaded.progress().notes, notes);
    assert_eq!(reloaded.history(), &history);

    // The added exercise comes back from the overlay, the source plan is unchanged
    let chest = reloaded.plan().group("Friday", "Chest").unwrap();
    assert_eq!(chest[0].reference_url, "https://example.com/bench");
    assert_eq!(reloaded.plan().group("Monday", "Legs").unwrap().len(), 2);
    assert!(reloaded.is_completed(&bench));
    Ok(())
}

fn open_file_service(db_path: &std::path::Path, schedule: &str) -> Result<AppService> {
    let store = SqliteStore::open(db_path)?;
    Ok(AppService::load(Config::default(), Box::new(store), Some(schedule))
        .with_clock(Box::new(FixedClock(monday()))))
}

fn legs(exercise: &str, sets_reps: &str) -> NewExercise {
    NewExercise {
        muscle_group: "Legs".into(),
        exercise: exercise.into(),
        sets_reps: sets_reps.into(),
        reference_url: None,
    }
}

#[test]
fn test_added_exercises_in_scheduled_group_survive_reload() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("tracker.sqlite");
    let schedule = "Monday\tLegs\tSquat\t3x10\n";

    {
        let mut service = open_file_service(&db_path, schedule)?;
        assert!(service.add_exercise("Monday", &legs("Squat", "5x5")));
        assert!(service.add_exercise("Monday", &legs("Lunge", "3x12")));
    }

    let reloaded = open_file_service(&db_path, schedule)?;
    let group = reloaded.plan().group("Monday", "Legs").unwrap();
    let rows: Vec<(&str, &str)> = group
        .iter()
        .map(|e| (e.name.as_str(), e.sets_reps.as_str()))
        .collect();
    assert_eq!(rows, [("Squat", "3x10"), ("Squat", "5x5"), ("Lunge", "3x12")]);

    // Reloading again does not stack the additions twice
    drop(reloaded);
    let again = open_file_service(&db_path, schedule)?;
    assert_eq!(again.plan().group("Monday", "Legs").unwrap().len(), 3);
    assert_eq!(again.stats("Monday").total, 3);
    Ok(())
}

#[test]
fn test_schedule_edits_win_after_reload() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("tracker.sqlite");

    {
        let mut service =
            open_file_service(&db_path, "Monday\tLegs\tSquat\t3x10\nMonday\tLegs\tLunge\t3x12\n")?;
        assert!(service.add_exercise(
            "Friday",
            &NewExercise {
                muscle_group: "Chest".into(),
                exercise: "Bench Press".into(),
                sets_reps: "4x8".into(),
                reference_url: None,
            },
        ));
    }

    // Lunge removed from the file and Squat's sets changed
    let reloaded = open_file_service(&db_path, "Monday\tLegs\tSquat\t5x5\n")?;
    let group = reloaded.plan().group("Monday", "Legs").unwrap();
    assert_eq!(group.len(), 1);
    assert_eq!(group[0].name, "Squat");
    assert_eq!(group[0].sets_reps, "5x5");
    assert!(!reloaded
        .plan()
        .contains_key(&ExerciseKey::new("Monday", "Legs", "Lunge")));

    let chest = reloaded.plan().group("Friday", "Chest").unwrap();
    assert_eq!(chest.len(), 1);
    assert_eq!(chest[0].name, "Bench Press");
    Ok(())
}

#[test]
fn test_corrupt_store_falls_back_to_empty() -> Result<()> {
    let mut store = SqliteStore::open_in_memory()?;
    store.save(StoreName::Progress.as_ref(), "this is not json")?;
    store.save(
        StoreName::Notes.as_ref(),
        r#"[{"key":{"day":"Monday","muscle_group":"Legs","exercise":"Squat"},"value":"kept"}]"#,
    )?;

    let service = AppService::load(Config::default(), Box::new(store), Some(SCHEDULE))
        .with_clock(Box::new(FixedClock(monday())));

    assert!(service.progress().progress.is_empty());
    assert_eq!(service.note(&squat()), Some("kept"));
    Ok(())
}

#[test]
fn test_each_command_writes_its_stores() -> Result<()> {
    let mut service = create_test_service(Some(SCHEDULE), monday())?;
    let written = |service: &AppService, name: StoreName| {
        service
            .stored_sizes()
            .into_iter()
            .any(|(n, size)| n == name && size.is_some())
    };

    service.set_note(&squat(), "warm up first");
    assert!(written(&service, StoreName::Notes));
    assert!(written(&service, StoreName::History));
    assert!(!written(&service, StoreName::Progress));

    service.reset_day("Wednesday");
    assert!(written(&service, StoreName::Progress));
    assert!(!written(&service, StoreName::PlanOverlay));
    Ok(())
}

#[test]
fn test_db_error_is_reported_for_bad_path() {
    let result = SqliteStore::open("/nonexistent-dir/for/sure/tracker.sqlite");
    assert!(matches!(result, Err(DbError::Connection(_))));
}
