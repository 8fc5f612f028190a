use std::collections::{HashMap, HashSet};

use crate::model::{
    ChangeKind, ChangedStudent, DeletedStudent, PersistedStudent, ReconciliationResult,
    StoreCommand, StudentNumber, StudentRecord,
};

/// Diff the roster source against the store.
///
/// Every roster record is tagged `insert` (unknown number), `update` (name or
/// email differ) or `nothing`; only inserts and updates are kept, in roster
/// order. Stored students whose number the roster never mentions are listed
/// as deletions, in store order. Neither input is modified.
pub fn reconcile(external: &[StudentRecord], stored: &[PersistedStudent]) -> ReconciliationResult {
    let stored_by_number: HashMap<StudentNumber, &PersistedStudent> =
        stored.iter().map(|s| (s.student_number, s)).collect();

    let mut changed = Vec::new();
    for record in external {
        let change = classify(record, stored_by_number.get(&record.student_number).copied());
        if change != ChangeKind::Nothing {
            changed.push(ChangedStudent {
                change,
                record: record.clone(),
            });
        }
    }

    let external_numbers: HashSet<StudentNumber> =
        external.iter().map(|r| r.student_number).collect();

    let deleted: Vec<DeletedStudent> = stored
        .iter()
        .filter(|s| !external_numbers.contains(&s.student_number))
        .map(|s| DeletedStudent {
            student_number: s.student_number,
            name: s.name.clone(),
        })
        .collect();

    log::debug!(
        "reconcile: {} roster records, {} stored, {} changed, {} deleted",
        external.len(),
        stored.len(),
        changed.len(),
        deleted.len()
    );

    ReconciliationResult { changed, deleted }
}

/// Change tag for one roster record against its stored counterpart.
pub fn classify(record: &StudentRecord, stored: Option<&PersistedStudent>) -> ChangeKind {
    match stored {
        None => ChangeKind::Insert,
        Some(s) if s.name == record.name && same_email(&s.email, &record.email) => {
            ChangeKind::Nothing
        }
        Some(_) => ChangeKind::Update,
    }
}

fn same_email(a: &Option<String>, b: &Option<String>) -> bool {
    email_value(a) == email_value(b)
}

fn email_value(email: &Option<String>) -> Option<&str> {
    email.as_deref().map(str::trim).filter(|e| !e.is_empty())
}

impl ReconciliationResult {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.deleted.is_empty()
    }

    pub fn inserts(&self) -> usize {
        self.count(ChangeKind::Insert)
    }

    pub fn updates(&self) -> usize {
        self.count(ChangeKind::Update)
    }

    fn count(&self, kind: ChangeKind) -> usize {
        self.changed.iter().filter(|c| c.change == kind).count()
    }

    /// Upserts for every changed record, then deletes, ready for the store.
    pub fn commands(&self) -> Vec<StoreCommand> {
        let upserts = self
            .changed
            .iter()
            .map(|c| StoreCommand::Upsert(c.record.to_persisted()));
        let deletes = self.deleted.iter().map(|d| StoreCommand::Delete {
            student_number: d.student_number,
        });
        upserts.chain(deletes).collect()
    }
}
