// Configuration loading

pub mod settings;

pub use settings::{
    ColumnLayout, ColumnWidths, ExportFormat, ExportSettings, RosterSettings, StatusLabels,
    StoreSettings, TwinSettings, DEFAULT_SETTINGS,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// TOML did not parse or did not match the settings shape
    Parse(String),
    /// Parsed, but values are inconsistent
    Validation(String),
    Io(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "settings parse error: {msg}"),
            Self::Validation(msg) => write!(f, "invalid settings: {msg}"),
            Self::Io(msg) => write!(f, "settings io error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
