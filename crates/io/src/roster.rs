// Roster import (xlsx, xls, xlsb, ods via calamine; csv)
//
// Every worksheet of a workbook is one group, labelled with the sheet title.
// A CSV file is a single group.

use std::io::Read;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use twin_recon::StudentRecord;

use crate::IoError;

/// Where the student fields live in each row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterLayout {
    pub header_rows: usize,
    pub student_number: usize,
    pub last_name: usize,
    pub last_name_prefix: usize,
    pub first_name: usize,
    pub email: usize,
}

impl Default for RosterLayout {
    fn default() -> Self {
        Self {
            header_rows: 1,
            student_number: 0,
            last_name: 1,
            last_name_prefix: 2,
            first_name: 3,
            email: 4,
        }
    }
}

/// Row counts for one roster load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RosterStats {
    pub groups: usize,
    pub students: usize,
    /// Rows with an empty student-number cell
    pub blank: usize,
    /// Rows whose student number is not a non-negative integer
    pub skipped: usize,
}

pub trait RosterSource {
    fn load_with_stats(&self) -> Result<(Vec<StudentRecord>, RosterStats), IoError>;

    fn load(&self) -> Result<Vec<StudentRecord>, IoError> {
        self.load_with_stats().map(|(students, _)| students)
    }
}

/// Pick a reader by file extension.
pub fn open_roster(
    path: &Path,
    group: Option<&str>,
    layout: RosterLayout,
) -> Result<Box<dyn RosterSource>, IoError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(Box::new(XlsxRoster::new(path, layout))),
        "csv" | "tsv" | "txt" => {
            let mut reader = CsvRoster::new(path, layout);
            if ext == "tsv" {
                reader = reader.with_delimiter(b'\t');
            }
            if let Some(group) = group {
                reader = reader.with_group(group);
            }
            Ok(Box::new(reader))
        }
        _ => Err(IoError::Read(format!(
            "unsupported roster format '{}' (expected xlsx, xls, ods or csv)",
            path.display()
        ))),
    }
}

// ---------------------------------------------------------------------------
// Row rules
// ---------------------------------------------------------------------------

enum RowOutcome {
    Student(StudentRecord),
    Blank,
    Invalid(String),
}

fn parse_row(cell: impl Fn(usize) -> String, layout: &RosterLayout, group: &str) -> RowOutcome {
    let number = cell(layout.student_number);
    if number.is_empty() {
        return RowOutcome::Blank;
    }
    let student_number = match number.parse::<u32>() {
        Ok(n) => n,
        Err(_) => return RowOutcome::Invalid(number),
    };

    let name = [
        cell(layout.first_name),
        cell(layout.last_name_prefix),
        cell(layout.last_name),
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" ");

    let email = cell(layout.email);
    RowOutcome::Student(StudentRecord::new(
        student_number,
        name,
        Some(email),
        group,
    ))
}

fn tally(outcome: RowOutcome, group: &str, row: usize, stats: &mut RosterStats, out: &mut Vec<StudentRecord>) {
    match outcome {
        RowOutcome::Student(record) => {
            stats.students += 1;
            out.push(record);
        }
        RowOutcome::Blank => stats.blank += 1,
        RowOutcome::Invalid(value) => {
            log::debug!("{group} row {}: skipping student number {value:?}", row + 1);
            stats.skipped += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Workbooks
// ---------------------------------------------------------------------------

pub struct XlsxRoster {
    path: PathBuf,
    layout: RosterLayout,
}

impl XlsxRoster {
    pub fn new(path: impl Into<PathBuf>, layout: RosterLayout) -> Self {
        Self {
            path: path.into(),
            layout,
        }
    }
}

/// Display text of a cell. Whole floats print without a fraction.
fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        None | Some(Data::Empty) => String::new(),
        Some(data) => data.to_string().trim().to_string(),
    }
}

impl RosterSource for XlsxRoster {
    fn load_with_stats(&self) -> Result<(Vec<StudentRecord>, RosterStats), IoError> {
        let mut workbook: Sheets<_> = open_workbook_auto(&self.path)
            .map_err(|e| IoError::Workbook(format!("Failed to open {}: {}", self.path.display(), e)))?;

        let mut stats = RosterStats::default();
        let mut students = Vec::new();

        for sheet_name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&sheet_name)
                .map_err(|e| IoError::Workbook(format!("Failed to read sheet '{}': {}", sheet_name, e)))?;
            stats.groups += 1;

            // Positions are absolute, so leading empty rows still count as header rows.
            let Some((last_row, _)) = range.end() else {
                log::debug!("sheet '{sheet_name}' is empty");
                continue;
            };
            for row in self.layout.header_rows as u32..=last_row {
                let cell = |col: usize| cell_text(range.get_value((row, col as u32)));
                let outcome = parse_row(cell, &self.layout, &sheet_name);
                tally(outcome, &sheet_name, row as usize, &mut stats, &mut students);
            }
        }

        log::info!(
            "{}: {} students in {} groups ({} skipped)",
            self.path.display(),
            stats.students,
            stats.groups,
            stats.skipped
        );
        Ok((students, stats))
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

pub struct CsvRoster {
    path: PathBuf,
    group: Option<String>,
    delimiter: u8,
    layout: RosterLayout,
}

impl CsvRoster {
    pub fn new(path: impl Into<PathBuf>, layout: RosterLayout) -> Self {
        Self {
            path: path.into(),
            group: None,
            delimiter: b',',
            layout,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Explicit group label, else the file stem.
    pub fn group(&self) -> String {
        self.group.clone().unwrap_or_else(|| {
            self.path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "roster".to_string())
        })
    }
}

/// Read file and convert to UTF-8 if needed (spreadsheet exports are often Windows-1252)
fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| IoError::Read(format!("{}: {}", path.display(), e)))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| IoError::Read(format!("{}: {}", path.display(), e)))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

impl RosterSource for CsvRoster {
    fn load_with_stats(&self) -> Result<(Vec<StudentRecord>, RosterStats), IoError> {
        let content = read_file_as_utf8(&self.path)?;
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        let group = self.group();

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut stats = RosterStats {
            groups: 1,
            ..Default::default()
        };
        let mut students = Vec::new();

        for (row, result) in reader.records().enumerate() {
            let record = result.map_err(|e| IoError::Parse(format!("{}: {}", self.path.display(), e)))?;
            if row < self.layout.header_rows {
                continue;
            }
            let cell = |col: usize| record.get(col).unwrap_or("").trim().to_string();
            let outcome = parse_row(cell, &self.layout, &group);
            tally(outcome, &group, row, &mut stats, &mut students);
        }

        log::info!(
            "{}: {} students ({} skipped)",
            self.path.display(),
            stats.students,
            stats.skipped
        );
        Ok((students, stats))
    }
}
