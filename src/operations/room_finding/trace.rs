use std::collections::HashSet;

use crate::error::TopologyError;
use crate::math::angle_2d::angle_2pi;
use crate::math::Point2;
use crate::topology::{CornerId, TopologyStore};

/// A pending step of the walk: the corner to visit and the path that led to it.
#[derive(Debug)]
struct Frame {
    corner: CornerId,
    previous: Vec<CornerId>,
}

/// Orders candidate next corners so the tightest turn comes last.
///
/// The turn for a candidate is `angle_2pi(prev - current, next - current)`,
/// the clockwise sweep from the way back to the way out; the smallest value
/// hugs the face on the left. Sorting descending puts it at the end, where a
/// LIFO stack pops it first. Equal turns keep their input order.
pub fn sort_by_turn<T>(prev: &Point2, current: &Point2, candidates: &mut [(T, Point2)]) {
    let back = prev - current;
    let theta = |p: &Point2| angle_2pi(&back, &(p - current));
    candidates.sort_by(|a, b| theta(&b.1).total_cmp(&theta(&a.1)));
}

/// Walks from `first` through `second` back to `first`, always trying the
/// tightest turn first.
///
/// Returns the cycle as `[first, second, ...]`, or an empty vector when the
/// walk cannot close (e.g. `second` leads only to dead ends).
///
/// # Errors
///
/// Returns an error if the graph references a missing corner or wall.
pub fn find_tightest_cycle(
    store: &TopologyStore,
    first: CornerId,
    second: CornerId,
) -> Result<Vec<CornerId>, TopologyError> {
    let mut stack: Vec<Frame> = Vec::new();
    let mut visited: HashSet<CornerId> = HashSet::from([first]);

    let mut next = Some(Frame {
        corner: second,
        previous: vec![first],
    });

    while let Some(frame) = next {
        let current = frame.corner;
        visited.insert(current);

        // Back at the start corner, having arrived from somewhere other than `second`.
        if current == first && current != second {
            tracing::trace!(len = frame.previous.len(), "closed cycle");
            return Ok(frame.previous);
        }

        let mut candidates: Vec<(CornerId, Point2)> = Vec::new();
        for adjacent in store.adjacent_corners(current)? {
            // The start corner may be re-entered once we have left `second`.
            let reopens_start = adjacent == first && current != second;
            if visited.contains(&adjacent) && !reopens_start {
                continue;
            }
            candidates.push((adjacent, store.corner(adjacent)?.position));
        }

        let mut previous = frame.previous.clone();
        previous.push(current);

        if candidates.len() > 1 {
            if let Some(&prev_corner) = frame.previous.last() {
                let prev_pos = store.corner(prev_corner)?.position;
                let cur_pos = store.corner(current)?.position;
                sort_by_turn(&prev_pos, &cur_pos, &mut candidates);
            }
        }

        for (corner, _) in candidates {
            stack.push(Frame {
                corner,
                previous: previous.clone(),
            });
        }

        next = stack.pop();
    }

    Ok(Vec::new())
}
