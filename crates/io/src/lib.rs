// File I/O: roster import, student store, report export

pub mod export;
pub mod roster;
pub mod store;

pub use export::{export_csv, export_xlsx, sanitize_sheet_name, ExportStyle, ExportSummary};
pub use roster::{open_roster, CsvRoster, RosterLayout, RosterSource, RosterStats, XlsxRoster};
pub use store::{ApplySummary, HistoryEntry, Store};

use twin_recon::TwinError;

#[derive(Debug)]
pub enum IoError {
    /// Input file missing or unreadable
    Read(String),
    /// Output could not be written
    Write(String),
    /// Input was readable but not in the expected shape
    Parse(String),
    Workbook(String),
    Json(String),
    /// Rejected by the engine (self-preference, unknown student)
    Engine(TwinError),
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read(msg) => write!(f, "read error: {msg}"),
            Self::Write(msg) => write!(f, "write error: {msg}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::Workbook(msg) => write!(f, "workbook error: {msg}"),
            Self::Json(msg) => write!(f, "json error: {msg}"),
            Self::Engine(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Engine(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TwinError> for IoError {
    fn from(e: TwinError) -> Self {
        Self::Engine(e)
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}
