//! `twin prefer`: read and write a student's preferred partner.

use std::path::PathBuf;

use clap::Subcommand;
use twin_recon::preferences::PreferenceChange;
use twin_recon::{StudentNumber, TwinError};

use crate::exit_codes::{io_exit_code, EXIT_PREFERENCE, EXIT_STORE};
use crate::util::{display_width, load_settings, open_store, pad_right, print_json, save_store};
use crate::{CliError, GlobalArgs};

#[derive(Subcommand)]
pub enum PreferCommands {
    /// Show a student's current preference (JSON: null or {student_number, name, reciprocal?})
    #[command(after_help = "\
Examples:
  twin prefer show --student 2097174
  twin prefer show --student 2097174 --json")]
    Show {
        #[arg(long, value_name = "N")]
        student: u32,

        /// Student store (default: from settings)
        #[arg(long, env = "TWIN_STORE")]
        store: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Set (or replace) a student's preference
    #[command(after_help = "\
Examples:
  twin prefer set --student 2097174 --for 2077073")]
    Set {
        #[arg(long, value_name = "N")]
        student: u32,

        /// Student number of the preferred partner
        #[arg(long = "for", value_name = "M")]
        preference_for: u32,

        #[arg(long, env = "TWIN_STORE")]
        store: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Remove a student's preference
    Clear {
        #[arg(long, value_name = "N")]
        student: u32,

        #[arg(long, env = "TWIN_STORE")]
        store: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Everyone a student can choose, marking those who already chose them
    List {
        #[arg(long, value_name = "N")]
        student: u32,

        #[arg(long, env = "TWIN_STORE")]
        store: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },
}

pub fn cmd_prefer(global: &GlobalArgs, cmd: PreferCommands) -> Result<(), CliError> {
    match cmd {
        PreferCommands::Show { student, store, json } => cmd_show(global, StudentNumber(student), store, json),
        PreferCommands::Set { student, preference_for, store, json } => {
            cmd_set(global, StudentNumber(student), StudentNumber(preference_for), store, json)
        }
        PreferCommands::Clear { student, store, json } => cmd_clear(global, StudentNumber(student), store, json),
        PreferCommands::List { student, store, json } => cmd_list(global, StudentNumber(student), store, json),
    }
}

fn unknown(student: StudentNumber) -> CliError {
    CliError::new(EXIT_PREFERENCE, TwinError::UnknownStudent(student).to_string())
        .with_hint("import the roster first with `twin import --apply`")
}

fn cmd_show(global: &GlobalArgs, student: StudentNumber, store: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let settings = load_settings(global.config.as_deref())?;
    let store = open_store(store, &settings)?;
    if !store.contains(student) {
        return Err(unknown(student));
    }

    let view = store.preferences().view(student, store.roster_lookup());
    if json {
        return print_json(&view);
    }
    match view {
        Some(v) => {
            let mark = if v.reciprocal == Some(true) { " (mutual)" } else { "" };
            println!("{} {}{}", v.student_number, v.name, mark);
        }
        None => eprintln!("{student} has no preference"),
    }
    Ok(())
}

fn cmd_set(
    global: &GlobalArgs,
    student: StudentNumber,
    preference_for: StudentNumber,
    store: Option<PathBuf>,
    json: bool,
) -> Result<(), CliError> {
    let settings = load_settings(global.config.as_deref())?;
    let mut store = open_store(store, &settings)?;

    let change = store
        .set_preference(student, preference_for)
        .map_err(|e| CliError::new(io_exit_code(&e, EXIT_STORE), e.to_string()))?;
    if change != PreferenceChange::Unchanged {
        save_store(&store)?;
    }
    log::info!("{student} -> {preference_for}: {change:?}");

    let view = store.preferences().view(student, store.roster_lookup());
    if json {
        return print_json(&view);
    }
    match change {
        PreferenceChange::Set => eprintln!("{student} now prefers {preference_for}"),
        PreferenceChange::Replaced { previous } => {
            eprintln!("{student} now prefers {preference_for} (was {previous})")
        }
        PreferenceChange::Unchanged => eprintln!("{student} already prefers {preference_for}"),
    }
    if store.preferences().is_reciprocal(student) {
        eprintln!("mutual: {preference_for} also chose {student}");
    }
    Ok(())
}

fn cmd_clear(global: &GlobalArgs, student: StudentNumber, store: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let settings = load_settings(global.config.as_deref())?;
    let mut store = open_store(store, &settings)?;

    let previous = store
        .clear_preference(student)
        .map_err(|e| CliError::new(io_exit_code(&e, EXIT_STORE), e.to_string()))?;
    if previous.is_some() {
        save_store(&store)?;
    }

    if json {
        return print_json(&serde_json::Value::Null);
    }
    match previous {
        Some(p) => eprintln!("cleared {student} (was {p})"),
        None => eprintln!("{student} had no preference"),
    }
    Ok(())
}

fn cmd_list(global: &GlobalArgs, student: StudentNumber, store: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let settings = load_settings(global.config.as_deref())?;
    let store = open_store(store, &settings)?;
    if !store.contains(student) {
        return Err(unknown(student));
    }

    let classmates = store.preferences().classmates(student, store.roster_lookup());
    if json {
        return print_json(&classmates);
    }

    let width = classmates.iter().map(|c| display_width(&c.name)).max().unwrap_or(0);
    for c in &classmates {
        let mark = if c.reciprocal == Some(true) { "*" } else { "" };
        println!("{:>8}  {} {}", c.student_number.0, pad_right(&c.name, width), mark);
    }
    eprintln!("{} classmates (* chose {student})", classmates.len());
    Ok(())
}
