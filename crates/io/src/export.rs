// Report export: one xlsx worksheet or one csv file per group
//
// Rows are [label, student_number, name, group, status] with no header row.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook as XlsxWorkbook;
use twin_recon::{GroupReport, PairStatus};

use crate::IoError;

/// Excel's sheet name limit
const MAX_SHEET_NAME: usize = 31;

/// Status text and column widths
#[derive(Debug, Clone, PartialEq)]
pub struct ExportStyle {
    pub matched: String,
    pub mismatched: String,
    pub single: String,
    pub label_width: f64,
    pub name_width: f64,
    pub group_width: f64,
}

impl Default for ExportStyle {
    fn default() -> Self {
        Self {
            matched: "koppel".into(),
            mismatched: "mismatch".into(),
            single: "single".into(),
            label_width: 3.0,
            name_width: 30.0,
            group_width: 14.0,
        }
    }
}

impl ExportStyle {
    pub fn status_text(&self, status: PairStatus) -> &str {
        match status {
            PairStatus::Matched => &self.matched,
            PairStatus::Mismatched => &self.mismatched,
            PairStatus::Single => &self.single,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub groups: usize,
    pub rows: usize,
    /// Files written (one for xlsx, one per group for csv)
    pub files: Vec<PathBuf>,
}

/// Keep word characters and apostrophes, truncated to 31 chars.
/// `None` when nothing usable is left.
pub fn sanitize_sheet_name(name: &str) -> Option<String> {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '\'')
        .take(MAX_SHEET_NAME)
        .collect();
    // Excel rejects names that start or end with an apostrophe.
    let cleaned = cleaned.trim_matches('\'');
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// One distinct, sanitized name per report. Case-insensitive, as Excel compares them.
fn sheet_names(reports: &[GroupReport]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(reports.len());

    for (idx, report) in reports.iter().enumerate() {
        let base = sanitize_sheet_name(&report.group).unwrap_or_else(|| format!("Sheet{}", idx + 1));
        let mut name = base.clone();
        let mut n = 2;
        while !seen.insert(name.to_lowercase()) {
            let suffix = format!("_{n}");
            let keep = MAX_SHEET_NAME - suffix.len();
            name = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
            n += 1;
        }
        if name != report.group {
            log::debug!("group '{}' exported as '{}'", report.group, name);
        }
        names.push(name);
    }
    names
}

pub fn export_xlsx(reports: &[GroupReport], path: &Path, style: &ExportStyle) -> Result<ExportSummary, IoError> {
    let mut workbook = XlsxWorkbook::new();
    let mut summary = ExportSummary::default();

    for (report, name) in reports.iter().zip(sheet_names(reports)) {
        let worksheet = workbook
            .add_worksheet()
            .set_name(&name)
            .map_err(|e| IoError::Workbook(format!("Failed to create sheet '{}': {}", name, e)))?;

        for (col, width) in [(0u16, style.label_width), (2, style.name_width), (3, style.group_width)] {
            worksheet
                .set_column_width(col, width)
                .map_err(|e| IoError::Workbook(format!("Failed to set column width: {}", e)))?;
        }

        for (idx, row) in report.rows.iter().enumerate() {
            let r = idx as u32;
            let write = |e: rust_xlsxwriter::XlsxError| {
                IoError::Workbook(format!("Failed to write {}!row {}: {}", name, r + 1, e))
            };
            worksheet.write_string(r, 0, &row.label).map_err(write)?;
            worksheet
                .write_number(r, 1, f64::from(row.student_number.0))
                .map_err(write)?;
            worksheet.write_string(r, 2, &row.name).map_err(write)?;
            worksheet.write_string(r, 3, &row.group).map_err(write)?;
            worksheet
                .write_string(r, 4, style.status_text(row.status))
                .map_err(write)?;
        }

        summary.groups += 1;
        summary.rows += report.rows.len();
    }

    workbook
        .save(path)
        .map_err(|e| IoError::Write(format!("Failed to save {}: {}", path.display(), e)))?;
    summary.files.push(path.to_path_buf());
    Ok(summary)
}

/// Writes `<dir>/<sheet name>.csv` for every report.
pub fn export_csv(reports: &[GroupReport], dir: &Path, style: &ExportStyle) -> Result<ExportSummary, IoError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| IoError::Write(format!("{}: {}", dir.display(), e)))?;
    let mut summary = ExportSummary::default();

    for (report, name) in reports.iter().zip(sheet_names(reports)) {
        let path = dir.join(format!("{name}.csv"));
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_path(&path)
            .map_err(|e| IoError::Write(format!("{}: {}", path.display(), e)))?;

        for row in &report.rows {
            writer
                .write_record(row.cells(style.status_text(row.status)))
                .map_err(|e| IoError::Write(format!("{}: {}", path.display(), e)))?;
        }
        writer
            .flush()
            .map_err(|e| IoError::Write(format!("{}: {}", path.display(), e)))?;

        summary.groups += 1;
        summary.rows += report.rows.len();
        summary.files.push(path);
    }
    Ok(summary)
}
