// src/cli.rs
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(author, version, about = "Track your weekly workout plan", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the exercises and progress for a day (defaults to today)
    Show {
        day: Option<String>,
    },
    /// List the days in the plan
    Days,
    /// Mark an exercise done, or undo it
    Toggle {
        day: String,
        /// Muscle group the exercise belongs to (e.g., "Legs")
        group: String,
        exercise: String,
    },
    /// Set the note for an exercise. An empty note clears it
    Note {
        day: String,
        group: String,
        exercise: String,
        text: String,
    },
    /// Clear completion and notes for a day
    ResetDay {
        day: String,
    },
    /// Add an exercise to the plan
    Add {
        #[arg(short, long)]
        day: String,
        /// Muscle group (e.g., "Chest", "Back", "Legs")
        #[arg(short, long)]
        group: String,
        /// Exercise name (e.g., "Bench Press")
        #[arg(short, long)]
        exercise: String,
        /// Sets x reps (e.g., "3 x 8-12")
        #[arg(short, long)]
        sets_reps: String,
        /// Reference link. Defaults to an image search for the exercise
        #[arg(short, long)]
        url: Option<String>,
    },
    /// Show what was recorded on a date (YYYY-MM-DD, defaults to today)
    History {
        date: Option<NaiveDate>,
    },
    /// List dates with recorded activity
    HistoryDates,
    /// Show the persisted stores and their sizes
    Stores,
    /// Show the path to the config file
    ConfigPath,
    /// Show the path to the database file
    DbPath,
    /// Generate shell completion scripts
    GenerateCompletion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

// Function to parse CLI arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
