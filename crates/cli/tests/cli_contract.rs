// Contract tests for the `twin` binary: exit codes and the --json stdout shape.
//
// Run with: cargo test -p twin-cli --test cli_contract -- --nocapture

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

struct Env {
    dir: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn store(&self) -> PathBuf {
        self.path("store.json")
    }

    /// Runs `twin` with a private settings path and store.
    fn twin(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_twin"))
            .current_dir(self.dir.path())
            .env_remove("RUST_LOG")
            .env("TWIN_CONFIG", self.path("twin.toml"))
            .env("TWIN_STORE", self.store())
            .args(args)
            .output()
            .expect("run twin")
    }

    /// Like [`Env::twin`], but the store path comes from the settings.
    fn twin_default_store(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_twin"))
            .current_dir(self.dir.path())
            .env_remove("RUST_LOG")
            .env_remove("TWIN_STORE")
            .env("TWIN_CONFIG", self.path("cfg/twin.toml"))
            .args(args)
            .output()
            .expect("run twin")
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, contents).unwrap();
        path
    }
}

fn code(output: &Output) -> i32 {
    output.status.code().expect("exit code")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Assert stdout is a single, parseable JSON value.
fn json(output: &Output) -> serde_json::Value {
    assert_eq!(code(output), 0, "stderr: {}", stderr(output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim())
        .unwrap_or_else(|e| panic!("stdout must be one JSON value: {e}\n{stdout}"))
}

const IN01: &str = "\
studentnummer,achternaam,tussenvoegsel,voornaam,email
1,Wagener,,Paul,p.wagener@avans.nl
2,Dickhout,,Bart,
3,Putten,van der,Rein,
5,Stijn,,Stijn,
";

/// IN01 plus Bob from SWA13, as one file.
fn all_students() -> String {
    format!("{IN01}4,Bakker,,Bob,\n")
}

/// Store holding every student, imported from one file.
fn seeded() -> Env {
    let env = Env::new();
    env.write("IN01.csv", IN01);
    env.write("all.csv", &all_students());
    assert_eq!(code(&env.twin(&["import", "all.csv", "--apply"])), 0);
    env
}

fn prefer(env: &Env, from: &str, to: &str) {
    let out = env.twin(&["prefer", "set", "--student", from, "--for", to]);
    assert_eq!(code(&out), 0, "stderr: {}", stderr(&out));
}

// ===========================================================================
// twin import
// ===========================================================================

#[test]
fn import_json_into_empty_store() {
    let env = Env::new();
    env.write("IN01.csv", IN01);

    let val = json(&env.twin(&["import", "IN01.csv", "--json"]));
    assert_eq!(val["roster"]["students"], 4);
    let changed = val["changed"].as_array().unwrap();
    assert_eq!(changed.len(), 1);
    assert_eq!(changed[0]["group"], "IN01");
    let students = changed[0]["students"].as_array().unwrap();
    assert_eq!(students.len(), 4);
    assert_eq!(students[0]["change"], "insert");
    assert_eq!(students[0]["student_number"], 1);
    assert_eq!(students[0]["name"], "Paul Wagener");
    assert_eq!(students[2]["name"], "Rein van der Putten");
    assert!(val.get("applied").is_none());

    // Without --apply the store is untouched.
    assert!(!env.store().exists());
}

#[test]
fn import_check_reports_pending_changes() {
    let env = Env::new();
    env.write("IN01.csv", IN01);

    let pending = env.twin(&["import", "IN01.csv", "--check"]);
    assert_eq!(code(&pending), 8);
    assert!(stderr(&pending).contains("pending"));

    assert_eq!(code(&env.twin(&["import", "IN01.csv", "--apply"])), 0);
    assert_eq!(code(&env.twin(&["import", "IN01.csv", "--check"])), 0);

    // Rename one student, drop another.
    env.write(
        "IN01.csv",
        "nr,achternaam,tussenvoegsel,voornaam,email\n1,Wagener,,Paul,paul@avans.nl\n2,Dickhout,,Bart,\n3,Putten,van der,Rein,\n",
    );
    let val = json(&env.twin(&["import", "IN01.csv", "--json"]));
    assert_eq!(val["changed"][0]["students"][0]["change"], "update");
    assert_eq!(val["deleted"][0]["student_number"], 5);
    assert_eq!(code(&env.twin(&["import", "IN01.csv", "--check"])), 8);
}

#[test]
fn import_apply_and_check_conflict() {
    let env = Env::new();
    env.write("IN01.csv", IN01);
    assert_eq!(code(&env.twin(&["import", "IN01.csv", "--apply", "--check"])), 2);
}

#[test]
fn import_second_group_keeps_the_first() {
    let env = Env::new();
    env.write("IN01.csv", IN01);
    env.write("SWA13.csv", "nr,achternaam,tussenvoegsel,voornaam,email\n4,Bakker,,Bob,\n");
    assert_eq!(code(&env.twin(&["import", "IN01.csv", "--apply"])), 0);
    prefer(&env, "1", "2");

    let val = json(&env.twin(&["import", "SWA13.csv", "--apply", "--json"]));
    assert_eq!(val["deleted"].as_array().unwrap().len(), 4);
    assert_eq!(val["applied"]["inserted"], 1);
    assert_eq!(val["applied"]["deleted"], 0);

    // IN01 and its preferences survive; only new students count as pending.
    let shown = json(&env.twin(&["prefer", "show", "--student", "1", "--json"]));
    assert_eq!(shown["student_number"], 2);
    prefer(&env, "4", "5");
    assert_eq!(code(&env.twin(&["import", "SWA13.csv", "--check"])), 0);
    assert_eq!(code(&env.twin(&["import", "SWA13.csv", "--check", "--delete"])), 8);
}

#[test]
fn import_delete_removes_missing_students() {
    let env = seeded();
    prefer(&env, "4", "1");

    let val = json(&env.twin(&["import", "IN01.csv", "--apply", "--delete", "--json"]));
    assert_eq!(val["applied"]["deleted"], 1);
    assert_eq!(val["applied"]["preferences_removed"], 1);
    assert_eq!(code(&env.twin(&["prefer", "show", "--student", "4"])), 7);
    assert_eq!(code(&env.twin(&["import", "IN01.csv", "--check", "--delete"])), 0);
}

#[test]
fn import_delete_without_apply_or_check_is_usage_error() {
    let env = Env::new();
    env.write("IN01.csv", IN01);
    let out = env.twin(&["import", "IN01.csv", "--delete"]);
    assert_eq!(code(&out), 2);
    assert!(stderr(&out).contains("--delete"));
}

#[test]
fn import_missing_roster_is_roster_error() {
    let env = Env::new();
    assert_eq!(code(&env.twin(&["import", "nope.csv"])), 4);
    assert_eq!(code(&env.twin(&["import", "roster.pdf"])), 4);
}

#[test]
fn import_xlsx_sheets_become_groups() {
    let env = Env::new();
    let path = env.path("klassen.xlsx");
    let mut workbook = rust_xlsxwriter::Workbook::new();
    for (sheet, number, first) in [("IN01", 1.0, "Paul"), ("SWA13", 4.0, "Bob")] {
        let ws = workbook.add_worksheet().set_name(sheet).unwrap();
        ws.write_string(0, 0, "studentnummer").unwrap();
        ws.write_number(1, 0, number).unwrap();
        ws.write_string(1, 1, "Achternaam").unwrap();
        ws.write_string(1, 3, first).unwrap();
    }
    workbook.save(&path).unwrap();

    let val = json(&env.twin(&["import", "klassen.xlsx", "--apply", "--json"]));
    let groups: Vec<&str> = val["changed"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["group"].as_str().unwrap())
        .collect();
    assert_eq!(groups, vec!["IN01", "SWA13"]);
    assert_eq!(val["applied"]["inserted"], 2);
}

// ===========================================================================
// twin prefer
// ===========================================================================

#[test]
fn prefer_show_set_clear() {
    let env = seeded();

    let none = json(&env.twin(&["prefer", "show", "--student", "1", "--json"]));
    assert!(none.is_null());

    let set = json(&env.twin(&["prefer", "set", "--student", "1", "--for", "2", "--json"]));
    assert_eq!(set, serde_json::json!({"student_number": 2, "name": "Bart Dickhout"}));

    prefer(&env, "2", "1");
    let mutual = json(&env.twin(&["prefer", "show", "--student", "1", "--json"]));
    assert_eq!(mutual["reciprocal"], true);

    let cleared = json(&env.twin(&["prefer", "clear", "--student", "1", "--json"]));
    assert!(cleared.is_null());
    let after = json(&env.twin(&["prefer", "show", "--student", "1", "--json"]));
    assert!(after.is_null());
}

#[test]
fn prefer_rejections_exit_7() {
    let env = seeded();
    let own = env.twin(&["prefer", "set", "--student", "1", "--for", "1"]);
    assert_eq!(code(&own), 7);
    assert!(stderr(&own).contains("themselves"));

    assert_eq!(code(&env.twin(&["prefer", "set", "--student", "1", "--for", "99"])), 7);
    assert_eq!(code(&env.twin(&["prefer", "show", "--student", "99"])), 7);
}

#[test]
fn prefer_list_marks_who_chose_you() {
    let env = seeded();
    prefer(&env, "4", "1");

    let val = json(&env.twin(&["prefer", "list", "--student", "1", "--json"]));
    let list = val.as_array().unwrap();
    assert_eq!(list.len(), 4);
    let names: Vec<&str> = list.iter().map(|c| c["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Bart Dickhout", "Bob Bakker", "Rein van der Putten", "Stijn Stijn"]);
    assert_eq!(list[1]["reciprocal"], true);
    assert!(list[0].get("reciprocal").is_none());
}

// ===========================================================================
// twin pairs / twin groups
// ===========================================================================

#[test]
fn pairs_lists_mutual_choices() {
    let env = seeded();
    prefer(&env, "1", "2");
    prefer(&env, "2", "1");
    prefer(&env, "3", "4");
    prefer(&env, "4", "3");
    prefer(&env, "5", "1");

    let val = json(&env.twin(&["pairs", "--json"]));
    assert_eq!(
        val,
        serde_json::json!([
            {"a": {"student_number": 1, "name": "Paul Wagener"}, "b": {"student_number": 2, "name": "Bart Dickhout"}},
            {"a": {"student_number": 3, "name": "Rein van der Putten"}, "b": {"student_number": 4, "name": "Bob Bakker"}},
        ])
    );
}

fn paired_env() -> Env {
    let env = seeded();
    prefer(&env, "1", "2");
    prefer(&env, "2", "1");
    prefer(&env, "3", "4");
    prefer(&env, "4", "3");
    env
}

#[test]
fn groups_json_report() {
    let env = paired_env();
    let val = json(&env.twin(&["groups", "IN01.csv", "--json"]));
    let report = &val[0];
    assert_eq!(report["group"], "IN01");
    // Bob is not in this roster file, so 3-4 cannot be rendered.
    let labels: Vec<&str> = report["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["1a", "1b", "2", "3"]);
    assert_eq!(report["summary"]["matched_pairs"], 1);
    assert_eq!(report["summary"]["singles"], 2);
    // --json alone writes nothing
    assert!(!env.path("twin.xlsx").exists());
}

#[test]
fn groups_csv_export_uses_labels() {
    let env = paired_env();
    env.write("twin.toml", "[export.labels]\nsingle = \"alleen\"\n");

    let out = env.twin(&["groups", "all.csv", "--group", "IN01", "--format", "csv", "--out", "reports"]);
    assert_eq!(code(&out), 0, "stderr: {}", stderr(&out));
    let text = std::fs::read_to_string(env.path("reports/IN01.csv")).unwrap();
    assert_eq!(
        text,
        "1a,1,Paul Wagener,IN01,koppel\n\
         1b,2,Bart Dickhout,IN01,koppel\n\
         2a,3,Rein van der Putten,IN01,koppel\n\
         2b,4,Bob Bakker,IN01,koppel\n\
         3,5,Stijn Stijn,IN01,alleen\n"
    );
}

#[test]
fn groups_xlsx_default_output() {
    let env = paired_env();
    let out = env.twin(&["groups", "IN01.csv"]);
    assert_eq!(code(&out), 0, "stderr: {}", stderr(&out));
    assert!(is_xlsx(&env.path("twin.xlsx")));
}

fn is_xlsx(path: &Path) -> bool {
    use calamine::Reader;
    calamine::open_workbook_auto(path)
        .map(|wb| wb.sheet_names() == vec!["IN01".to_string()])
        .unwrap_or(false)
}

// ===========================================================================
// twin config
// ===========================================================================

#[test]
fn config_init_then_show() {
    let env = Env::new();
    assert_eq!(code(&env.twin(&["config", "init"])), 0);
    assert!(env.path("twin.toml").exists());
    assert_eq!(code(&env.twin(&["config", "init"])), 3);

    let val = json(&env.twin(&["config", "show", "--json"]));
    assert_eq!(val["export"]["labels"]["matched"], "koppel");
    assert_eq!(val["roster"]["columns"]["email"], 4);
}

#[test]
fn config_init_keeps_the_store() {
    let env = Env::new();
    env.write("IN01.csv", IN01);
    assert_eq!(code(&env.twin_default_store(&["import", "IN01.csv", "--apply"])), 0);
    assert!(env.path("cfg/twin-store.json").exists());

    assert_eq!(code(&env.twin_default_store(&["config", "init"])), 0);
    let shown = env.twin_default_store(&["prefer", "show", "--student", "1"]);
    assert_eq!(code(&shown), 0, "stderr: {}", stderr(&shown));
    assert_eq!(code(&env.twin_default_store(&["import", "IN01.csv", "--check"])), 0);
}

#[test]
fn invalid_settings_exit_3() {
    let env = seeded();
    env.write("twin.toml", "[roster.columns]\nemail = 0\n");
    let out = env.twin(&["pairs"]);
    assert_eq!(code(&out), 3);
    assert!(stderr(&out).contains("hint:"));
}
