use std::fmt;

use crate::model::StudentNumber;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TwinError {
    /// A student tried to name themselves as preferred partner.
    SelfPreference(StudentNumber),
    /// A student number that the roster does not know.
    UnknownStudent(StudentNumber),
}

impl fmt::Display for TwinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfPreference(n) => {
                write!(f, "student {n} cannot choose themselves as preference")
            }
            Self::UnknownStudent(n) => write!(f, "unknown student number {n}"),
        }
    }
}

impl std::error::Error for TwinError {}
