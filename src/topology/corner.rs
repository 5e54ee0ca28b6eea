use crate::math::Point2;

use super::wall::WallId;

slotmap::new_key_type! {
    /// Unique identifier for a corner in the topology store.
    pub struct CornerId;
}

/// Data associated with a corner (a node of the wall graph).
///
/// The wall lists are non-owning back-references; they must always agree
/// with the `start`/`end` fields of the walls they name.
#[derive(Debug, Clone)]
pub struct CornerData {
    /// Persistent identity, used by documents and room identities.
    pub uid: String,
    /// Position in the floor plane.
    pub position: Point2,
    /// Walls whose start is this corner, in attachment order.
    pub wall_starts: Vec<WallId>,
    /// Walls whose end is this corner, in attachment order.
    pub wall_ends: Vec<WallId>,
}

impl CornerData {
    /// Creates a detached corner.
    #[must_use]
    pub fn new(uid: String, position: Point2) -> Self {
        Self {
            uid,
            position,
            wall_starts: Vec::new(),
            wall_ends: Vec::new(),
        }
    }

    /// Returns the number of attached walls.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.wall_starts.len() + self.wall_ends.len()
    }

    /// Returns `true` if `wall` starts or ends here.
    #[must_use]
    pub fn is_attached(&self, wall: WallId) -> bool {
        self.wall_starts.contains(&wall) || self.wall_ends.contains(&wall)
    }

    /// Removes every reference to `wall`.
    pub fn detach(&mut self, wall: WallId) {
        self.wall_starts.retain(|&w| w != wall);
        self.wall_ends.retain(|&w| w != wall);
    }

    /// Distance from this corner to `(x, y)`.
    #[must_use]
    pub fn distance_from(&self, x: f64, y: f64) -> f64 {
        nalgebra::distance(&self.position, &Point2::new(x, y))
    }
}
