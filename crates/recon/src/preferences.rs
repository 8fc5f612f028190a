//! One outgoing preference per student, with reciprocity lookups.
//!
//! The book is the in-memory form of the preference table. Writes replace
//! the student's single outgoing edge; reads resolve names through any
//! [`Roster`].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::TwinError;
use crate::model::{PreferenceEdge, Roster, StudentNumber};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceBook {
    chosen: BTreeMap<StudentNumber, StudentNumber>,
}

/// Outcome of [`PreferenceBook::set`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceChange {
    Set,
    Replaced { previous: StudentNumber },
    Unchanged,
}

/// What a student sees for their own preference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreferenceView {
    pub student_number: StudentNumber,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reciprocal: Option<bool>,
}

/// Another student, flagged when they already chose the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassmateEntry {
    pub student_number: StudentNumber,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reciprocal: Option<bool>,
}

impl PreferenceBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later edges for the same student replace earlier ones. Self-edges are dropped.
    pub fn from_edges<'a>(edges: impl IntoIterator<Item = &'a PreferenceEdge>) -> Self {
        let mut book = Self::new();
        for edge in edges {
            if edge.is_self() {
                log::debug!("dropping self-preference of {}", edge.from);
                continue;
            }
            book.chosen.insert(edge.from, edge.to);
        }
        book
    }

    /// Replace `from`'s preference with `to`.
    pub fn set(&mut self, from: StudentNumber, to: StudentNumber) -> Result<PreferenceChange, TwinError> {
        if from == to {
            return Err(TwinError::SelfPreference(from));
        }
        Ok(match self.chosen.insert(from, to) {
            None => PreferenceChange::Set,
            Some(previous) if previous == to => PreferenceChange::Unchanged,
            Some(previous) => PreferenceChange::Replaced { previous },
        })
    }

    /// Remove `from`'s preference, returning who it pointed at.
    pub fn clear(&mut self, from: StudentNumber) -> Option<StudentNumber> {
        self.chosen.remove(&from)
    }

    pub fn preference_of(&self, from: StudentNumber) -> Option<StudentNumber> {
        self.chosen.get(&from).copied()
    }

    /// True when `from`'s choice also chose `from`.
    pub fn is_reciprocal(&self, from: StudentNumber) -> bool {
        self.preference_of(from)
            .is_some_and(|to| self.preference_of(to) == Some(from))
    }

    /// Drop every edge from or to `student`.
    pub fn remove_student(&mut self, student: StudentNumber) {
        self.chosen.remove(&student);
        self.chosen.retain(|_, to| *to != student);
    }

    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    /// Snapshot of all edges, ascending by `from`.
    pub fn edges(&self) -> Vec<PreferenceEdge> {
        self.chosen
            .iter()
            .map(|(&from, &to)| PreferenceEdge { from, to })
            .collect()
    }

    /// `from`'s preference with the partner's name. `None` when there is no
    /// preference or the partner is not on the roster.
    pub fn view<R: Roster + ?Sized>(&self, from: StudentNumber, roster: &R) -> Option<PreferenceView> {
        let to = self.preference_of(from)?;
        let name = roster.name_of(to)?;
        Some(PreferenceView {
            student_number: to,
            name: name.to_string(),
            reciprocal: self.is_reciprocal(from).then_some(true),
        })
    }

    /// Everyone on the roster except `of`, sorted by name, marking those who chose `of`.
    pub fn classmates<R: Roster + ?Sized>(&self, of: StudentNumber, roster: &R) -> Vec<ClassmateEntry> {
        let mut entries: Vec<ClassmateEntry> = roster
            .students()
            .into_iter()
            .filter(|(n, _)| *n != of)
            .map(|(n, name)| ClassmateEntry {
                student_number: n,
                name: name.to_string(),
                reciprocal: (self.preference_of(n) == Some(of)).then_some(true),
            })
            .collect();
        entries.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then(a.student_number.cmp(&b.student_number))
        });
        entries
    }
}
