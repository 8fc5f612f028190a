use std::collections::{HashMap, HashSet};

use crate::grouping::group_labels;
use crate::model::{
    GroupReport, Pair, PairStatus, PreferenceEdge, ReportRow, ReportSummary, StudentNumber,
    StudentRecord,
};
use crate::pairing::{find_mutual_pairs, paired_students};

/// Build the report for one group.
///
/// `pairs` must be the pairs found over the complete roster, not just the
/// target group, so that cross-group pairs show up as mismatches. Rows come
/// in three phases that share one running number:
///
/// 1. matched pairs, both members in `target_group` (`{n}a`, `{n}b`)
/// 2. mismatched pairs, exactly one member in `target_group` (`{n}a`, `{n}b`,
///    each row carrying the member's own group)
/// 3. target-group students that are in no pair at all (`{n}`), roster order
pub fn build_group_report(
    all_students: &[StudentRecord],
    target_group: &str,
    pairs: &[Pair],
) -> GroupReport {
    let by_number: HashMap<StudentNumber, &StudentRecord> =
        all_students.iter().map(|s| (s.student_number, s)).collect();

    // Pairs we cannot render (member missing from the roster) are dropped up front.
    let renderable: Vec<(&StudentRecord, &StudentRecord)> = pairs
        .iter()
        .filter_map(|p| match (by_number.get(&p.a), by_number.get(&p.b)) {
            (Some(a), Some(b)) => Some((*a, *b)),
            _ => {
                log::warn!("pair {}-{} references a student outside the roster, skipped", p.a, p.b);
                None
            }
        })
        .collect();

    let in_target = |s: &StudentRecord| s.group == target_group;

    let mut rows = Vec::new();
    let mut counter = 1usize;

    for &(a, b) in renderable.iter().filter(|(a, b)| in_target(*a) && in_target(*b)) {
        push_pair(&mut rows, counter, a, b, PairStatus::Matched);
        counter += 1;
    }

    for &(a, b) in renderable.iter().filter(|(a, b)| in_target(*a) ^ in_target(*b)) {
        push_pair(&mut rows, counter, a, b, PairStatus::Mismatched);
        counter += 1;
    }

    let paired: HashSet<StudentNumber> = renderable
        .iter()
        .flat_map(|(a, b)| [a.student_number, b.student_number])
        .collect();

    for student in all_students
        .iter()
        .filter(|s| in_target(*s) && !paired.contains(&s.student_number))
    {
        rows.push(ReportRow {
            label: counter.to_string(),
            student_number: student.student_number,
            name: student.name.clone(),
            group: target_group.to_string(),
            status: PairStatus::Single,
        });
        counter += 1;
    }

    GroupReport {
        group: target_group.to_string(),
        rows,
    }
}

fn push_pair(
    rows: &mut Vec<ReportRow>,
    number: usize,
    a: &StudentRecord,
    b: &StudentRecord,
    status: PairStatus,
) {
    for (suffix, student) in [("a", a), ("b", b)] {
        rows.push(ReportRow {
            label: format!("{number}{suffix}"),
            student_number: student.student_number,
            name: student.name.clone(),
            group: student.group.clone(),
            status,
        });
    }
}

/// One report per group, groups in first-seen roster order.
///
/// Pairs are computed once over the whole roster.
pub fn build_reports(all_students: &[StudentRecord], edges: &[PreferenceEdge]) -> Vec<GroupReport> {
    let candidates: HashSet<StudentNumber> =
        all_students.iter().map(|s| s.student_number).collect();
    if candidates.len() != all_students.len() {
        log::warn!(
            "roster lists {} records for {} distinct student numbers",
            all_students.len(),
            candidates.len()
        );
    }

    let pairs = find_mutual_pairs(edges, &candidates);
    log::debug!("{} pairs, {} paired students", pairs.len(), paired_students(&pairs).len());

    group_labels(all_students)
        .iter()
        .map(|group| build_group_report(all_students, group, &pairs))
        .collect()
}

impl GroupReport {
    pub fn summary(&self) -> ReportSummary {
        let count = |status: PairStatus| self.rows.iter().filter(|r| r.status == status).count();
        ReportSummary {
            matched_pairs: count(PairStatus::Matched) / 2,
            mismatched_pairs: count(PairStatus::Mismatched) / 2,
            singles: count(PairStatus::Single),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<StudentRecord> {
        vec![
            StudentRecord::new(1, "Paul", None, "IN01"),
            StudentRecord::new(2, "Bart", None, "IN01"),
            StudentRecord::new(3, "Rein", None, "IN01"),
            StudentRecord::new(4, "Bob", None, "SWA13"),
            StudentRecord::new(5, "Stijn", None, "IN01"),
        ]
    }

    fn pair(x: u32, y: u32) -> Pair {
        Pair::new(StudentNumber(x), StudentNumber(y)).unwrap()
    }

    fn flat(report: &GroupReport) -> Vec<(String, u32, String, String, PairStatus)> {
        report
            .rows
            .iter()
            .map(|r| (r.label.clone(), r.student_number.0, r.name.clone(), r.group.clone(), r.status))
            .collect()
    }

    fn row(label: &str, n: u32, name: &str, group: &str, status: PairStatus) -> (String, u32, String, String, PairStatus) {
        (label.into(), n, name.into(), group.into(), status)
    }

    #[test]
    fn three_phases_for_target_group() {
        let report = build_group_report(&roster(), "IN01", &[pair(1, 2), pair(3, 4)]);
        assert_eq!(
            flat(&report),
            vec![
                row("1a", 1, "Paul", "IN01", PairStatus::Matched),
                row("1b", 2, "Bart", "IN01", PairStatus::Matched),
                row("2a", 3, "Rein", "IN01", PairStatus::Mismatched),
                row("2b", 4, "Bob", "SWA13", PairStatus::Mismatched),
                row("3", 5, "Stijn", "IN01", PairStatus::Single),
            ]
        );
        assert_eq!(
            report.summary(),
            ReportSummary {
                matched_pairs: 1,
                mismatched_pairs: 1,
                singles: 1,
            }
        );
    }

    #[test]
    fn other_side_of_a_mismatch() {
        let report = build_group_report(&roster(), "SWA13", &[pair(1, 2), pair(3, 4)]);
        assert_eq!(
            flat(&report),
            vec![
                row("1a", 3, "Rein", "IN01", PairStatus::Mismatched),
                row("1b", 4, "Bob", "SWA13", PairStatus::Mismatched),
            ]
        );
    }

    #[test]
    fn unknown_group_is_empty() {
        let report = build_group_report(&roster(), "XX99", &[pair(1, 2)]);
        assert!(report.is_empty());
        assert_eq!(report.group, "XX99");
    }

    #[test]
    fn no_pairs_all_single() {
        let report = build_group_report(&roster(), "IN01", &[]);
        let labels: Vec<&str> = report.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["1", "2", "3", "4"]);
        assert!(report.rows.iter().all(|r| r.status == PairStatus::Single));
    }

    #[test]
    fn pair_outside_roster_is_skipped() {
        let report = build_group_report(&roster(), "IN01", &[pair(1, 99), pair(2, 3)]);
        assert_eq!(
            flat(&report),
            vec![
                row("1a", 2, "Bart", "IN01", PairStatus::Matched),
                row("1b", 3, "Rein", "IN01", PairStatus::Matched),
                row("2", 1, "Paul", "IN01", PairStatus::Single),
                row("3", 5, "Stijn", "IN01", PairStatus::Single),
            ]
        );
    }

    #[test]
    fn reports_per_group_from_edges() {
        let edges = vec![
            PreferenceEdge::new(1, 2),
            PreferenceEdge::new(2, 1),
            PreferenceEdge::new(3, 4),
            PreferenceEdge::new(4, 3),
            PreferenceEdge::new(5, 1),
        ];
        let reports = build_reports(&roster(), &edges);
        let groups: Vec<&str> = reports.iter().map(|r| r.group.as_str()).collect();
        assert_eq!(groups, vec!["IN01", "SWA13"]);
        assert_eq!(reports[0].rows.len(), 5);
        assert_eq!(reports[1].rows.len(), 2);
    }

    #[test]
    fn deterministic() {
        let edges = vec![
            PreferenceEdge::new(4, 3),
            PreferenceEdge::new(2, 1),
            PreferenceEdge::new(3, 4),
            PreferenceEdge::new(1, 2),
        ];
        let first = build_reports(&roster(), &edges);
        for _ in 0..10 {
            assert_eq!(build_reports(&roster(), &edges), first);
        }
    }
}
