// Application settings
// Loaded from ~/.config/twin/twin.toml (or --config)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ConfigError;

// ---------------------------------------------------------------------------
// Roster layout
// ---------------------------------------------------------------------------

/// Zero-based column positions in a roster sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLayout {
    pub student_number: usize,
    pub last_name: usize,
    /// Tussenvoegsel ("van der", "de", ...)
    pub last_name_prefix: usize,
    pub first_name: usize,
    pub email: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            student_number: 0,
            last_name: 1,
            last_name_prefix: 2,
            first_name: 3,
            email: 4,
        }
    }
}

impl ColumnLayout {
    fn positions(&self) -> [(&'static str, usize); 5] {
        [
            ("student_number", self.student_number),
            ("last_name", self.last_name),
            ("last_name_prefix", self.last_name_prefix),
            ("first_name", self.first_name),
            ("email", self.email),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterSettings {
    /// Leading rows to skip on every sheet.
    pub header_rows: usize,
    pub columns: ColumnLayout,
}

impl Default for RosterSettings {
    fn default() -> Self {
        Self {
            header_rows: 1,
            columns: ColumnLayout::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Xlsx => write!(f, "xlsx"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Text written in the status column of an exported report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusLabels {
    pub matched: String,
    pub mismatched: String,
    pub single: String,
}

impl Default for StatusLabels {
    fn default() -> Self {
        Self {
            matched: "koppel".into(),
            mismatched: "mismatch".into(),
            single: "single".into(),
        }
    }
}

/// Worksheet column widths (characters) for the xlsx export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnWidths {
    pub label: f64,
    pub name: f64,
    pub group: f64,
}

impl Default for ColumnWidths {
    fn default() -> Self {
        Self {
            label: 3.0,
            name: 30.0,
            group: 14.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub format: ExportFormat,
    pub labels: StatusLabels,
    pub widths: ColumnWidths,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub path: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("twin-store.json"),
        }
    }
}

// ---------------------------------------------------------------------------
// Top level
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwinSettings {
    pub roster: RosterSettings,
    pub export: ExportSettings,
    pub store: StoreSettings,
}

pub const DEFAULT_SETTINGS: &str = r#"# twin settings

[roster]
# Rows to skip at the top of every sheet
header_rows = 1

# Zero-based column positions
[roster.columns]
student_number = 0
last_name = 1
last_name_prefix = 2
first_name = 3
email = 4

[export]
# "xlsx" (one worksheet per group) or "csv" (one file per group)
format = "xlsx"

[export.labels]
matched = "koppel"
mismatched = "mismatch"
single = "single"

[export.widths]
label = 3.0
name = 30.0
group = 14.0

[store]
# Relative paths are relative to this file's directory.
path = "twin-store.json"
"#;

impl TwinSettings {
    /// Default settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("twin")
            .join("twin.toml")
    }

    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let settings: TwinSettings =
            toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from `path`, or the default location when `None`.
    /// A missing file yields defaults.
    ///
    /// A relative store path is relative to the settings file's directory,
    /// whether or not the file exists yet.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);
        let mut settings = if path.exists() {
            let contents = fs::read_to_string(&path)
                .map_err(|e| ConfigError::Io(format!("cannot read {}: {e}", path.display())))?;
            Self::from_toml(&contents)?
        } else {
            log::debug!("no settings at {}, using defaults", path.display());
            Self::default()
        };

        if settings.store.path.is_relative() {
            if let Some(dir) = path.parent() {
                settings.store.path = dir.join(&settings.store.path);
            }
        }
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positions = self.roster.columns.positions();
        for (i, (name, col)) in positions.iter().enumerate() {
            if let Some((other, _)) = positions[..i].iter().find(|(_, c)| c == col) {
                return Err(ConfigError::Validation(format!(
                    "roster columns '{other}' and '{name}' both use column {col}"
                )));
            }
        }

        let labels = &self.export.labels;
        for (name, label) in [
            ("matched", &labels.matched),
            ("mismatched", &labels.mismatched),
            ("single", &labels.single),
        ] {
            if label.trim().is_empty() {
                return Err(ConfigError::Validation(format!("export label '{name}' is empty")));
            }
        }

        let widths = &self.export.widths;
        for (name, width) in [
            ("label", widths.label),
            ("name", widths.name),
            ("group", widths.group),
        ] {
            if !(width > 0.0) {
                return Err(ConfigError::Validation(format!(
                    "export width '{name}' must be positive, got {width}"
                )));
            }
        }

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Write the commented default file. Refuses to overwrite.
    pub fn write_default(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::Io(format!("{} already exists", path.display())));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        fs::write(path, DEFAULT_SETTINGS).map_err(|e| ConfigError::Io(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_file_matches_defaults() {
        let parsed = TwinSettings::from_toml(DEFAULT_SETTINGS).unwrap();
        assert_eq!(parsed, TwinSettings::default());
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(TwinSettings::from_toml("").unwrap(), TwinSettings::default());
    }

    #[test]
    fn partial_override() {
        let settings = TwinSettings::from_toml(
            r#"
[roster.columns]
email = 7

[export]
format = "csv"
"#,
        )
        .unwrap();
        assert_eq!(settings.roster.columns.email, 7);
        assert_eq!(settings.roster.columns.first_name, 3);
        assert_eq!(settings.roster.header_rows, 1);
        assert_eq!(settings.export.format, ExportFormat::Csv);
        assert_eq!(settings.export.labels.matched, "koppel");
    }

    #[test]
    fn reject_duplicate_columns() {
        let err = TwinSettings::from_toml("[roster.columns]\nemail = 0\n").unwrap_err();
        assert!(err.to_string().contains("'student_number' and 'email'"), "{err}");
    }

    #[test]
    fn reject_empty_label() {
        let err = TwinSettings::from_toml("[export.labels]\nsingle = \" \"\n").unwrap_err();
        assert!(err.to_string().contains("'single'"));
    }

    #[test]
    fn reject_bad_width() {
        let err = TwinSettings::from_toml("[export.widths]\nname = 0.0\n").unwrap_err();
        assert!(err.to_string().contains("must be positive"));
    }

    #[test]
    fn reject_unknown_format() {
        assert!(TwinSettings::from_toml("[export]\nformat = \"ods\"\n").is_err());
    }

    #[test]
    fn load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let settings = TwinSettings::load(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(settings.export, TwinSettings::default().export);
        assert_eq!(settings.store.path, dir.path().join("twin-store.json"));
    }

    #[test]
    fn init_keeps_the_store_location() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("twin.toml");
        let before = TwinSettings::load(Some(&path)).unwrap();
        TwinSettings::write_default(&path).unwrap();
        let after = TwinSettings::load(Some(&path)).unwrap();
        assert_eq!(before.store.path, after.store.path);
        assert_eq!(before, after);
    }

    #[test]
    fn load_resolves_store_relative_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("twin.toml");
        fs::write(&path, "[store]\npath = \"data/store.json\"\n").unwrap();
        let settings = TwinSettings::load(Some(&path)).unwrap();
        assert_eq!(settings.store.path, dir.path().join("data/store.json"));
    }

    #[test]
    fn write_default_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("twin.toml");
        TwinSettings::write_default(&path).unwrap();
        assert!(TwinSettings::write_default(&path).is_err());
        assert_eq!(TwinSettings::load(Some(&path)).unwrap().export.format, ExportFormat::Xlsx);
    }

    #[test]
    fn round_trip_through_toml() {
        let mut settings = TwinSettings::default();
        settings.export.format = ExportFormat::Csv;
        let text = settings.to_toml().unwrap();
        assert_eq!(TwinSettings::from_toml(&text).unwrap(), settings);
    }
}
