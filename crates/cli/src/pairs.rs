//! `twin pairs`: mutual pairs among the stored students.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::Serialize;
use twin_recon::model::Roster;
use twin_recon::{find_mutual_pairs, StudentNumber};

use crate::util::{display_width, load_settings, open_store, pad_right, print_json};
use crate::{CliError, GlobalArgs};

#[derive(Serialize)]
struct Member<'a> {
    student_number: StudentNumber,
    name: &'a str,
}

#[derive(Serialize)]
struct PairOutput<'a> {
    a: Member<'a>,
    b: Member<'a>,
}

pub fn cmd_pairs(global: &GlobalArgs, store: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let settings = load_settings(global.config.as_deref())?;
    let store = open_store(store, &settings)?;

    let roster = store.roster_lookup();
    let candidates: HashSet<StudentNumber> = store.students().iter().map(|s| s.student_number).collect();
    let pairs = find_mutual_pairs(&store.preferences().edges(), &candidates);

    let member = |n: StudentNumber| Member {
        student_number: n,
        name: roster.name_of(n).unwrap_or(""),
    };
    let output: Vec<PairOutput> = pairs
        .iter()
        .map(|p| PairOutput {
            a: member(p.a),
            b: member(p.b),
        })
        .collect();

    if json {
        return print_json(&output);
    }

    let width = output.iter().map(|p| display_width(p.a.name)).max().unwrap_or(0);
    for p in &output {
        println!(
            "{:>8} {}  {:>8} {}",
            p.a.student_number.0,
            pad_right(p.a.name, width),
            p.b.student_number.0,
            p.b.name
        );
    }
    eprintln!(
        "{} pairs among {} students ({} preferences)",
        pairs.len(),
        candidates.len(),
        store.preferences().len()
    );
    Ok(())
}
