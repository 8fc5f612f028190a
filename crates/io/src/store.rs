// Student store: a single JSON document holding students, preferences and
// the preference history.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use twin_recon::preferences::PreferenceChange;
use twin_recon::{PersistedStudent, PreferenceBook, PreferenceEdge, StoreCommand, StudentNumber, TwinError};

use crate::IoError;

/// One preference write, kept for auditing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub student: StudentNumber,
    /// `None` when the preference was cleared
    pub preference_for: Option<StudentNumber>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    students: Vec<PersistedStudent>,
    #[serde(default)]
    preferences: Vec<PreferenceEdge>,
    #[serde(default)]
    history: Vec<HistoryEntry>,
}

/// Counts from [`Store::apply`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplySummary {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    /// Preferences dropped because a student was deleted
    pub preferences_removed: usize,
}

#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    students: Vec<PersistedStudent>,
    book: PreferenceBook,
    history: Vec<HistoryEntry>,
}

impl Store {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, IoError> {
        let path = path.into();
        let data = if path.exists() {
            let text = fs::read_to_string(&path)
                .map_err(|e| IoError::Read(format!("{}: {}", path.display(), e)))?;
            serde_json::from_str::<StoreData>(&text)
                .map_err(|e| IoError::Json(format!("{}: {}", path.display(), e)))?
        } else {
            log::debug!("store {} does not exist yet", path.display());
            StoreData::default()
        };

        Ok(Self {
            book: PreferenceBook::from_edges(&data.preferences),
            students: data.students,
            history: data.history,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn students(&self) -> &[PersistedStudent] {
        &self.students
    }

    /// Name resolution for preference views.
    pub fn roster_lookup(&self) -> &[PersistedStudent] {
        &self.students
    }

    pub fn preferences(&self) -> &PreferenceBook {
        &self.book
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn contains(&self, student: StudentNumber) -> bool {
        self.students.iter().any(|s| s.student_number == student)
    }

    /// Upserts keep a student's position or append; deletes cascade to preferences.
    pub fn apply(&mut self, commands: &[StoreCommand]) -> ApplySummary {
        let mut summary = ApplySummary::default();
        for command in commands {
            match command {
                StoreCommand::Upsert(student) => {
                    match self
                        .students
                        .iter_mut()
                        .find(|s| s.student_number == student.student_number)
                    {
                        Some(existing) => {
                            *existing = student.clone();
                            summary.updated += 1;
                        }
                        None => {
                            self.students.push(student.clone());
                            summary.inserted += 1;
                        }
                    }
                }
                StoreCommand::Delete { student_number } => {
                    let before = self.students.len();
                    self.students.retain(|s| s.student_number != *student_number);
                    if self.students.len() == before {
                        continue;
                    }
                    summary.deleted += 1;

                    let edges = self.book.len();
                    self.book.remove_student(*student_number);
                    summary.preferences_removed += edges - self.book.len();
                }
            }
        }
        log::info!(
            "applied {} commands: {} inserted, {} updated, {} deleted",
            commands.len(),
            summary.inserted,
            summary.updated,
            summary.deleted
        );
        summary
    }

    /// Record `from`'s preference for `to`. Both must be stored students.
    pub fn set_preference(&mut self, from: StudentNumber, to: StudentNumber) -> Result<PreferenceChange, IoError> {
        for student in [from, to] {
            if !self.contains(student) {
                return Err(TwinError::UnknownStudent(student).into());
            }
        }
        let change = self.book.set(from, to)?;
        if change != PreferenceChange::Unchanged {
            self.record(from, Some(to));
        }
        Ok(change)
    }

    /// Remove `from`'s preference, returning who it pointed at.
    pub fn clear_preference(&mut self, from: StudentNumber) -> Result<Option<StudentNumber>, IoError> {
        if !self.contains(from) {
            return Err(TwinError::UnknownStudent(from).into());
        }
        let previous = self.book.clear(from);
        if previous.is_some() {
            self.record(from, None);
        }
        Ok(previous)
    }

    fn record(&mut self, student: StudentNumber, preference_for: Option<StudentNumber>) {
        self.history.push(HistoryEntry {
            student,
            preference_for,
            date: Utc::now(),
        });
    }

    /// Write the store as pretty JSON, creating parent directories.
    pub fn save(&self) -> Result<(), IoError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| IoError::Write(format!("{}: {}", parent.display(), e)))?;
        }
        let data = StoreData {
            students: self.students.clone(),
            preferences: self.book.edges(),
            history: self.history.clone(),
        };
        let json = serde_json::to_string_pretty(&data)?;
        fs::write(&self.path, json + "\n")
            .map_err(|e| IoError::Write(format!("{}: {}", self.path.display(), e)))?;
        log::debug!("saved {} students to {}", self.students.len(), self.path.display());
        Ok(())
    }
}
