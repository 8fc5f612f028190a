use std::collections::HashSet;

use crate::model::{ChangedStudent, StudentGroup, StudentRecord};

/// Anything carrying a group label.
pub trait Grouped {
    fn group(&self) -> &str;
}

impl Grouped for StudentRecord {
    fn group(&self) -> &str {
        &self.group
    }
}

impl Grouped for ChangedStudent {
    fn group(&self) -> &str {
        &self.record.group
    }
}

/// Distinct group labels in first-seen order.
pub fn group_labels<T: Grouped>(items: &[T]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .map(Grouped::group)
        .filter(|g| seen.insert(*g))
        .map(str::to_string)
        .collect()
}

/// Split items by group label. Groups appear in first-seen order, members keep input order.
pub fn group_by_label<T: Grouped + Clone>(items: &[T]) -> Vec<StudentGroup<T>> {
    group_labels(items)
        .into_iter()
        .map(|group| {
            let students = items.iter().filter(|i| i.group() == group).cloned().collect();
            StudentGroup { group, students }
        })
        .collect()
}
