use crate::math::{Point2, Vector2};
use crate::topology::TopologyStore;

/// An axis-aligned bounding box in plan coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb2 {
    /// Minimum corner of the bounding box.
    pub min: Point2,
    /// Maximum corner of the bounding box.
    pub max: Point2,
}

impl Aabb2 {
    #[must_use]
    pub fn center(&self) -> Point2 {
        nalgebra::center(&self.min, &self.max)
    }

    #[must_use]
    pub fn size(&self) -> Vector2 {
        self.max - self.min
    }

    /// Grows the box to contain `p`.
    pub fn include(&mut self, p: &Point2) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }
}

/// Computes the bounding box of every corner in the plan.
#[derive(Debug, Default)]
pub struct Dimensions;

impl Dimensions {
    /// Creates a new `Dimensions` query.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the query. Returns `None` for a plan with no corners.
    #[must_use]
    pub fn execute(&self, store: &TopologyStore) -> Option<Aabb2> {
        let mut positions = store
            .corner_ids()
            .iter()
            .filter_map(|&id| store.corner(id).ok().map(|c| c.position));
        let first = positions.next()?;
        let mut aabb = Aabb2 {
            min: first,
            max: first,
        };
        for p in positions {
            aabb.include(&p);
        }
        Some(aabb)
    }
}
