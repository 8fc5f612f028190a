use std::collections::{BTreeSet, HashSet};

use crate::model::{Pair, PreferenceEdge, StudentNumber};

/// Find every pair of candidates who named each other.
///
/// Each pair is reported once in canonical `a < b` form, ascending by `a`
/// then `b`. Self-edges are ignored, as is any edge touching a student outside
/// `candidates`.
pub fn find_mutual_pairs<'a, I>(edges: I, candidates: &HashSet<StudentNumber>) -> Vec<Pair>
where
    I: IntoIterator<Item = &'a PreferenceEdge>,
{
    let directed: HashSet<(StudentNumber, StudentNumber)> = edges
        .into_iter()
        .filter(|e| !e.is_self())
        .filter(|e| candidates.contains(&e.from) && candidates.contains(&e.to))
        .map(|e| (e.from, e.to))
        .collect();

    let pairs: BTreeSet<Pair> = directed
        .iter()
        .filter(|(from, to)| from < to && directed.contains(&(*to, *from)))
        .filter_map(|&(from, to)| Pair::new(from, to))
        .collect();

    log::debug!(
        "pairing: {} usable edges over {} candidates, {} mutual pairs",
        directed.len(),
        candidates.len(),
        pairs.len()
    );

    pairs.into_iter().collect()
}

/// Every student that appears in any of `pairs`.
pub fn paired_students(pairs: &[Pair]) -> HashSet<StudentNumber> {
    pairs.iter().flat_map(|p| [p.a, p.b]).collect()
}
