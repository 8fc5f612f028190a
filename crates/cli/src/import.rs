//! `twin import`: reconcile a roster file against the student store.

use std::path::PathBuf;

use serde::Serialize;
use twin_io::{ApplySummary, RosterStats};
use twin_recon::model::{ChangedStudent, DeletedStudent, StudentGroup};
use twin_recon::{group_by_label, reconcile, StoreCommand};

use crate::exit_codes::{EXIT_PENDING, EXIT_USAGE};
use crate::util::{load_roster, load_settings, open_store, pad_right, print_json, save_store};
use crate::{CliError, GlobalArgs};

pub struct ImportArgs {
    pub roster: PathBuf,
    pub store: Option<PathBuf>,
    pub group: Option<String>,
    pub apply: bool,
    pub check: bool,
    pub delete: bool,
    pub json: bool,
}

#[derive(Serialize)]
struct RosterOutput {
    groups: usize,
    students: usize,
    skipped: usize,
}

impl From<RosterStats> for RosterOutput {
    fn from(stats: RosterStats) -> Self {
        Self {
            groups: stats.groups,
            students: stats.students,
            skipped: stats.skipped,
        }
    }
}

#[derive(Serialize)]
struct ImportOutput<'a> {
    roster: RosterOutput,
    changed: Vec<StudentGroup<ChangedStudent>>,
    deleted: &'a [DeletedStudent],
    #[serde(skip_serializing_if = "Option::is_none")]
    applied: Option<ApplySummary>,
}

pub fn cmd_import(global: &GlobalArgs, args: ImportArgs) -> Result<(), CliError> {
    if args.delete && !args.apply && !args.check {
        return Err(CliError::new(EXIT_USAGE, "--delete requires --apply or --check")
            .with_hint("twin import <roster> --apply --delete"));
    }

    let settings = load_settings(global.config.as_deref())?;
    let (students, stats) = load_roster(&args.roster, args.group.as_deref(), &settings)?;
    let mut store = open_store(args.store, &settings)?;

    let result = reconcile(&students, store.students());
    let by_group = group_by_label(&result.changed);

    // Students missing from the roster are only removed on request: a csv
    // roster holds one group and says nothing about the others.
    let commands: Vec<StoreCommand> = result
        .commands()
        .into_iter()
        .filter(|c| args.delete || !matches!(c, StoreCommand::Delete { .. }))
        .collect();
    let pending = result.changed.len() + if args.delete { result.deleted.len() } else { 0 };

    let applied = if args.apply && !commands.is_empty() {
        let summary = store.apply(&commands);
        save_store(&store)?;
        Some(summary)
    } else {
        None
    };

    if args.json {
        print_json(&ImportOutput {
            roster: stats.into(),
            changed: by_group,
            deleted: &result.deleted,
            applied,
        })?;
    } else {
        for group in &by_group {
            eprintln!("{}:", group.group);
            for c in &group.students {
                eprintln!(
                    "  {} {} {}",
                    pad_right(c.change.as_str(), 7),
                    c.record.student_number,
                    c.record.name
                );
            }
        }
        if !result.deleted.is_empty() {
            eprintln!("not in roster:");
            let action = if args.delete { "delete" } else { "keep" };
            for d in &result.deleted {
                eprintln!("  {} {} {}", pad_right(action, 7), d.student_number, d.name);
            }
        }
        eprintln!(
            "{} students in {} groups: {} new, {} changed, {} not in roster{}",
            stats.students,
            stats.groups,
            result.inserts(),
            result.updates(),
            result.deleted.len(),
            if args.delete || result.deleted.is_empty() { "" } else { " (kept, pass --delete to remove)" },
        );
        if applied.is_some() {
            eprintln!("applied to {}", store.path().display());
        }
    }

    if args.check && pending > 0 {
        return Err(CliError::new(EXIT_PENDING, format!("{pending} pending changes"))
        .with_hint("run `twin import --apply` to update the store"));
    }
    Ok(())
}
