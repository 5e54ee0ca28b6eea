use std::collections::HashSet;

use crate::topology::CornerId;

/// Removes cycles that are rotations of an earlier cycle.
///
/// Every rotation of a candidate is looked up against the sequences already
/// accepted; the first occurrence wins. Empty cycles are dropped. A cycle and
/// its reversal are different faces and are both kept.
#[must_use]
pub fn remove_duplicate_cycles(cycles: Vec<Vec<CornerId>>) -> Vec<Vec<CornerId>> {
    let mut seen: HashSet<Vec<CornerId>> = HashSet::new();
    let mut result = Vec::new();

    for cycle in cycles {
        if cycle.is_empty() {
            continue;
        }
        let duplicate = (0..cycle.len()).any(|shift| {
            let mut rotated = cycle.clone();
            rotated.rotate_left(shift);
            seen.contains(&rotated)
        });
        if !duplicate {
            seen.insert(cycle.clone());
            result.push(cycle);
        }
    }

    result
}
