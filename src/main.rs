//src/main.rs
mod cli;

use anyhow::{bail, Context, Result};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use std::io::stdout;

use workout_plan_lib::{AppService, DayStats, ExerciseKey, HistoryEntry, NewExercise, StandardColor};

fn main() -> Result<()> {
    env_logger::init();
    let cli_args = cli::parse_args();

    if let cli::Commands::GenerateCompletion { shell } = cli_args.command {
        let mut cmd = cli::build_cli_command();
        let bin_name = cmd.get_name().to_string();

        eprintln!("Generating completion script for {shell}...");
        clap_complete::generate(shell, &mut cmd, bin_name, &mut stdout());
        return Ok(());
    }

    let mut service =
        AppService::initialize().context("Failed to initialize application service")?;
    let header_color = to_table_color(service.config.header_color());

    match cli_args.command {
        cli::Commands::GenerateCompletion { .. } => {
            unreachable!("Completion generation should have exited already");
        }
        cli::Commands::Show { day } => {
            if let Some(day) = day {
                service.select_day(&day);
            }
            print_day(&service, header_color);
        }
        cli::Commands::Days => {
            let days = service.days();
            if days.is_empty() {
                println!("The plan is empty. Check the schedule file or add exercises with 'add'.");
            }
            for day in days {
                let stats = service.stats(day);
                println!("{day}: {}", format_stats(&stats));
            }
        }
        cli::Commands::Toggle {
            day,
            group,
            exercise,
        } => {
            let key = ExerciseKey::new(&day, &group, &exercise);
            if !service.plan().contains_key(&key) {
                bail!("No exercise '{exercise}' under {group} on {day}.");
            }
            let done = service.toggle(&key);
            println!(
                "{key} marked as {}.",
                if done { "done" } else { "not done" }
            );
            println!("{day}: {}", format_stats(&service.stats(&day)));
        }
        cli::Commands::Note {
            day,
            group,
            exercise,
            text,
        } => {
            let key = ExerciseKey::new(&day, &group, &exercise);
            if !service.plan().contains_key(&key) {
                bail!("No exercise '{exercise}' under {group} on {day}.");
            }
            service.set_note(&key, &text);
            match service.note(&key) {
                Some(note) => println!("Note for {key}: {note}"),
                None => println!("Note for {key} cleared."),
            }
        }
        cli::Commands::ResetDay { day } => {
            let removed = service.reset_day(&day);
            println!("Reset progress for {day} ({removed} entries cleared).");
        }
        cli::Commands::Add {
            day,
            group,
            exercise,
            sets_reps,
            url,
        } => {
            let input = NewExercise {
                muscle_group: group,
                exercise,
                sets_reps,
                reference_url: url,
            };
            if !service.add_exercise(&day, &input) {
                bail!("Day, group, exercise and sets/reps are all required.");
            }
            println!(
                "Added '{}' ({}) to {} on {}.",
                input.exercise.trim(),
                input.sets_reps.trim(),
                input.muscle_group.trim(),
                day.trim()
            );
        }
        cli::Commands::History { date } => {
            if let Some(date) = date {
                service.select_history_date(date);
            }
            let date = service.history_date();
            match service.selected_history() {
                Some(entry) => {
                    println!("Activity on {}", date.format("%Y-%m-%d (%A)"));
                    print_history(entry, header_color);
                }
                None => println!("No activity recorded on {}.", date.format("%Y-%m-%d")),
            }
        }
        cli::Commands::HistoryDates => {
            let dates = service.history_dates();
            if dates.is_empty() {
                println!("No history recorded yet.");
            }
            for date in dates {
                println!("{}", date.format("%Y-%m-%d"));
            }
        }
        cli::Commands::Stores => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    Cell::new("Store").fg(header_color),
                    Cell::new("Size (bytes)").fg(header_color),
                ]);
            for (name, size) in service.stored_sizes() {
                table.add_row(vec![
                    Cell::new(name),
                    Cell::new(size.map_or_else(|| "-".to_string(), |s| s.to_string())),
                ]);
            }
            println!("{table}");
        }
        cli::Commands::ConfigPath => {
            let path = workout_plan_lib::get_config_path_util()?;
            println!("Config file is located at: {}", path.display());
        }
        cli::Commands::DbPath => {
            let path = workout_plan_lib::get_db_path_util()?;
            println!("Database file is located at: {}", path.display());
        }
    }

    Ok(())
}

fn to_table_color(color: StandardColor) -> Color {
    match color {
        StandardColor::Black => Color::Black,
        StandardColor::Red => Color::Red,
        StandardColor::Green => Color::Green,
        StandardColor::Yellow => Color::Yellow,
        StandardColor::Blue => Color::Blue,
        StandardColor::Magenta => Color::Magenta,
        StandardColor::Cyan => Color::Cyan,
        StandardColor::White => Color::White,
        StandardColor::DarkGrey => Color::DarkGrey,
        StandardColor::DarkRed => Color::DarkRed,
        StandardColor::DarkGreen => Color::DarkGreen,
        StandardColor::DarkYellow => Color::DarkYellow,
        StandardColor::DarkBlue => Color::DarkBlue,
        StandardColor::DarkMagenta => Color::DarkMagenta,
        StandardColor::DarkCyan => Color::DarkCyan,
        StandardColor::Grey => Color::Grey,
    }
}

fn format_stats(stats: &DayStats) -> String {
    format!(
        "{}/{} exercises ({}%)",
        stats.completed, stats.total, stats.percentage
    )
}

fn print_day(service: &AppService, header_color: Color) {
    let day = service.selected_day();
    let exercises = service.plan().exercises_for(day);
    if exercises.is_empty() {
        println!("Nothing planned for {day}. Rest day!");
        return;
    }

    println!("{day}: {}", format_stats(&service.selected_day_stats()));

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Done").fg(header_color),
            Cell::new("Group").fg(header_color),
            Cell::new("Exercise").fg(header_color),
            Cell::new("Sets x Reps").fg(header_color),
            Cell::new("Note").fg(header_color),
            Cell::new("Reference").fg(header_color),
        ]);

    for (key, entry) in exercises {
        let done = service.is_completed(&key);
        let name_cell = if done {
            Cell::new(&entry.name).add_attribute(Attribute::CrossedOut)
        } else {
            Cell::new(&entry.name)
        };
        table.add_row(vec![
            Cell::new(if done { "[x]" } else { "[ ]" }),
            Cell::new(&key.muscle_group),
            name_cell,
            Cell::new(&entry.sets_reps),
            Cell::new(service.note(&key).unwrap_or("")),
            Cell::new(&entry.reference_url),
        ]);
    }
    println!("{table}");
}

fn print_history(entry: &HistoryEntry, header_color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Day").fg(header_color),
            Cell::new("Group").fg(header_color),
            Cell::new("Exercise").fg(header_color),
            Cell::new("Status").fg(header_color),
            Cell::new("Note").fg(header_color),
        ]);

    for row in entry.rows() {
        let status = match row.completed {
            Some(true) => Cell::new("done").fg(Color::Green),
            Some(false) => Cell::new("undone").fg(Color::Red),
            None => Cell::new("-"),
        };
        table.add_row(vec![
            Cell::new(&row.key.day),
            Cell::new(&row.key.muscle_group),
            Cell::new(&row.key.exercise),
            status,
            Cell::new(row.note.unwrap_or("")),
        ]);
    }
    println!("{table}");
}
