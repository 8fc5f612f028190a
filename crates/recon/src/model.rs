use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Student number. The only identity key shared by the roster source and the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentNumber(pub u32);

impl fmt::Display for StudentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for StudentNumber {
    fn from(n: u32) -> Self {
        Self(n)
    }
}

/// Blank strings are "no email".
pub(crate) fn normalize_email(email: Option<String>) -> Option<String> {
    email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
}

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

/// A student as observed in the roster source, tagged with the sheet it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub student_number: StudentNumber,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub group: String,
}

impl StudentRecord {
    pub fn new(
        student_number: impl Into<StudentNumber>,
        name: impl Into<String>,
        email: Option<String>,
        group: impl Into<String>,
    ) -> Self {
        Self {
            student_number: student_number.into(),
            name: name.into(),
            email: normalize_email(email),
            group: group.into(),
        }
    }

    /// The stored form of this record (the group is a roster-only annotation).
    pub fn to_persisted(&self) -> PersistedStudent {
        PersistedStudent {
            student_number: self.student_number,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// A student as held by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedStudent {
    pub student_number: StudentNumber,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl PersistedStudent {
    pub fn new(
        student_number: impl Into<StudentNumber>,
        name: impl Into<String>,
        email: Option<String>,
    ) -> Self {
        Self {
            student_number: student_number.into(),
            name: name.into(),
            email: normalize_email(email),
        }
    }
}

/// Anything that can resolve a student number to a display name.
pub trait Roster {
    fn name_of(&self, student: StudentNumber) -> Option<&str>;

    /// All students, in roster order.
    fn students(&self) -> Vec<(StudentNumber, &str)>;
}

impl Roster for [PersistedStudent] {
    fn name_of(&self, student: StudentNumber) -> Option<&str> {
        self.iter()
            .find(|s| s.student_number == student)
            .map(|s| s.name.as_str())
    }

    fn students(&self) -> Vec<(StudentNumber, &str)> {
        self.iter()
            .map(|s| (s.student_number, s.name.as_str()))
            .collect()
    }
}

impl Roster for [StudentRecord] {
    fn name_of(&self, student: StudentNumber) -> Option<&str> {
        self.iter()
            .find(|s| s.student_number == student)
            .map(|s| s.name.as_str())
    }

    fn students(&self) -> Vec<(StudentNumber, &str)> {
        self.iter()
            .map(|s| (s.student_number, s.name.as_str()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Nothing,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Insert => "insert",
            ChangeKind::Update => "update",
            ChangeKind::Nothing => "nothing",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A roster record together with what has to happen to it in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedStudent {
    pub change: ChangeKind,
    #[serde(flatten)]
    pub record: StudentRecord,
}

/// A stored student that the roster no longer lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletedStudent {
    pub student_number: StudentNumber,
    pub name: String,
}

/// Change set between the roster source and the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    /// Inserts and updates, in roster order.
    pub changed: Vec<ChangedStudent>,
    /// Stored students missing from the roster, in store order.
    pub deleted: Vec<DeletedStudent>,
}

/// Command for the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StoreCommand {
    Upsert(PersistedStudent),
    Delete { student_number: StudentNumber },
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Records sharing one group label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentGroup<T> {
    pub group: String,
    pub students: Vec<T>,
}

// ---------------------------------------------------------------------------
// Preferences + pairs
// ---------------------------------------------------------------------------

/// `from` names `to` as their preferred partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PreferenceEdge {
    pub from: StudentNumber,
    pub to: StudentNumber,
}

impl PreferenceEdge {
    pub fn new(from: impl Into<StudentNumber>, to: impl Into<StudentNumber>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn is_self(&self) -> bool {
        self.from == self.to
    }
}

/// Two students who named each other. Always `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Pair {
    pub a: StudentNumber,
    pub b: StudentNumber,
}

impl Pair {
    /// Canonical pair for two distinct students; `None` for a self-pair.
    pub fn new(x: StudentNumber, y: StudentNumber) -> Option<Self> {
        match x.cmp(&y) {
            std::cmp::Ordering::Less => Some(Self { a: x, b: y }),
            std::cmp::Ordering::Greater => Some(Self { a: y, b: x }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn contains(&self, student: StudentNumber) -> bool {
        self.a == student || self.b == student
    }

    /// The other member, if `student` is in the pair.
    pub fn partner_of(&self, student: StudentNumber) -> Option<StudentNumber> {
        if self.a == student {
            Some(self.b)
        } else if self.b == student {
            Some(self.a)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairStatus {
    Matched,
    Mismatched,
    Single,
}

impl PairStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PairStatus::Matched => "matched",
            PairStatus::Mismatched => "mismatched",
            PairStatus::Single => "single",
        }
    }
}

impl fmt::Display for PairStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    /// `1a`/`1b` for pair rows, `3` for singles.
    pub label: String,
    pub student_number: StudentNumber,
    pub name: String,
    /// Group the student originates from (differs from the report group for mismatches).
    pub group: String,
    pub status: PairStatus,
}

impl ReportRow {
    /// Export cells `[label, student_number, name, group, status]`.
    pub fn cells(&self, status_label: &str) -> [String; 5] {
        [
            self.label.clone(),
            self.student_number.to_string(),
            self.name.clone(),
            self.group.clone(),
            status_label.to_string(),
        ]
    }
}

/// All rows for one target group, in export order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupReport {
    pub group: String,
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub matched_pairs: usize,
    pub mismatched_pairs: usize,
    pub singles: usize,
}
