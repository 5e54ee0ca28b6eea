use crate::math::distance_2d::point_to_segment_dist;
use crate::math::Point2;
use crate::topology::{CornerId, TopologyStore, WallId};

/// Finds the first corner, in list order, strictly within `tolerance` of a point.
pub struct OverlappedCorner {
    point: Point2,
    tolerance: f64,
}

impl OverlappedCorner {
    /// Creates a new `OverlappedCorner` query.
    #[must_use]
    pub fn new(point: Point2, tolerance: f64) -> Self {
        Self { point, tolerance }
    }

    /// Executes the query.
    #[must_use]
    pub fn execute(&self, store: &TopologyStore) -> Option<CornerId> {
        store.corner_ids().iter().copied().find(|&id| {
            store
                .corner(id)
                .is_ok_and(|c| nalgebra::distance(&c.position, &self.point) < self.tolerance)
        })
    }
}

/// Finds the first wall, in list order, whose centerline passes strictly
/// within `tolerance` of a point.
pub struct OverlappedWall {
    point: Point2,
    tolerance: f64,
}

impl OverlappedWall {
    /// Creates a new `OverlappedWall` query.
    #[must_use]
    pub fn new(point: Point2, tolerance: f64) -> Self {
        Self { point, tolerance }
    }

    /// Executes the query.
    #[must_use]
    pub fn execute(&self, store: &TopologyStore) -> Option<WallId> {
        store.wall_ids().iter().copied().find(|&id| {
            let Ok(wall) = store.wall(id) else {
                return false;
            };
            match (store.corner(wall.start), store.corner(wall.end)) {
                (Ok(a), Ok(b)) => {
                    point_to_segment_dist(&self.point, &a.position, &b.position) < self.tolerance
                }
                _ => false,
            }
        })
    }
}
