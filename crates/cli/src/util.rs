use std::path::{Path, PathBuf};

use twin_config::TwinSettings;
use twin_io::{open_roster, ExportStyle, RosterLayout, RosterStats, Store};
use twin_recon::StudentRecord;
use unicode_width::UnicodeWidthStr;

use crate::exit_codes::{io_exit_code, EXIT_CONFIG, EXIT_ROSTER, EXIT_STORE};
use crate::CliError;

// ---------------------------------------------------------------------------
// Settings and collaborators
// ---------------------------------------------------------------------------

pub(crate) fn load_settings(path: Option<&Path>) -> Result<TwinSettings, CliError> {
    TwinSettings::load(path).map_err(|e| {
        CliError::new(EXIT_CONFIG, e.to_string()).with_hint("check the file or regenerate it with `twin config init`")
    })
}

pub(crate) fn roster_layout(settings: &TwinSettings) -> RosterLayout {
    let cols = &settings.roster.columns;
    RosterLayout {
        header_rows: settings.roster.header_rows,
        student_number: cols.student_number,
        last_name: cols.last_name,
        last_name_prefix: cols.last_name_prefix,
        first_name: cols.first_name,
        email: cols.email,
    }
}

pub(crate) fn export_style(settings: &TwinSettings) -> ExportStyle {
    let export = &settings.export;
    ExportStyle {
        matched: export.labels.matched.clone(),
        mismatched: export.labels.mismatched.clone(),
        single: export.labels.single.clone(),
        label_width: export.widths.label,
        name_width: export.widths.name,
        group_width: export.widths.group,
    }
}

/// `--store` wins over the settings file.
pub(crate) fn open_store(flag: Option<PathBuf>, settings: &TwinSettings) -> Result<Store, CliError> {
    let path = flag.unwrap_or_else(|| settings.store.path.clone());
    Store::open(&path).map_err(|e| CliError::new(io_exit_code(&e, EXIT_STORE), e.to_string()))
}

pub(crate) fn save_store(store: &Store) -> Result<(), CliError> {
    store
        .save()
        .map_err(|e| CliError::new(EXIT_STORE, e.to_string()))
}

pub(crate) fn load_roster(
    path: &Path,
    group: Option<&str>,
    settings: &TwinSettings,
) -> Result<(Vec<StudentRecord>, RosterStats), CliError> {
    let source = open_roster(path, group, roster_layout(settings))
        .map_err(|e| CliError::new(EXIT_ROSTER, e.to_string()))?;
    let (students, stats) = source
        .load_with_stats()
        .map_err(|e| CliError::new(EXIT_ROSTER, e.to_string()))?;
    if stats.skipped > 0 {
        eprintln!("note: skipped {} rows without a valid student number", stats.skipped);
    }
    Ok((students, stats))
}

pub(crate) fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::new(crate::exit_codes::EXIT_ERROR, format!("JSON serialization error: {e}")))?;
    println!("{json}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Text layout
// ---------------------------------------------------------------------------

/// Display width of a string, accounting for accents, CJK double-width, etc.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Right-pad to `width` display columns. Longer strings are left alone.
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let sw = display_width(s);
    format!("{}{}", s, " ".repeat(width.saturating_sub(sw)))
}
