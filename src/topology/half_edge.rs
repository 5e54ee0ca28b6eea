use crate::error::TopologyError;
use crate::math::distance_2d::point_to_segment_dist;
use crate::math::miter_2d::half_angle_vector;
use crate::math::{Isometry2, Point2, Vector2};

use super::corner::CornerId;
use super::room::RoomId;
use super::wall::{WallData, WallId, WallSide, WallTexture};
use super::TopologyStore;

slotmap::new_key_type! {
    /// Unique identifier for a half-edge in the topology store.
    pub struct HalfEdgeId;
}

/// One directed side of a wall, as seen from the room it bounds.
///
/// A front half-edge runs from the wall's start to its end, a back half-edge
/// from end to start. The room lies to the left of the direction of travel;
/// "interior" points are offset toward it and "exterior" points away from it.
#[derive(Debug, Clone)]
pub struct HalfEdgeData {
    /// The wall this half-edge belongs to.
    pub wall: WallId,
    /// `true` for the start→end side of the wall.
    pub front: bool,
    /// Owning room; `None` for half-edges of orphan walls.
    pub room: Option<RoomId>,
    /// Successor around the room ring.
    pub next: Option<HalfEdgeId>,
    /// Predecessor around the room ring.
    pub prev: Option<HalfEdgeId>,
    /// Half of the wall thickness.
    pub offset: f64,
    /// Copied from the wall.
    pub height: f64,
    /// World → interior wall plane.
    pub interior_transform: Isometry2,
    /// Interior wall plane → world.
    pub inv_interior_transform: Isometry2,
    /// World → exterior wall plane.
    pub exterior_transform: Isometry2,
    /// Exterior wall plane → world.
    pub inv_exterior_transform: Isometry2,
}

impl HalfEdgeData {
    /// Creates an unlinked half-edge for one side of `wall`.
    #[must_use]
    pub fn new(wall: WallId, data: &WallData, front: bool, room: Option<RoomId>) -> Self {
        Self {
            wall,
            front,
            room,
            next: None,
            prev: None,
            offset: data.thickness / 2.0,
            height: data.height,
            interior_transform: Isometry2::identity(),
            inv_interior_transform: Isometry2::identity(),
            exterior_transform: Isometry2::identity(),
            inv_exterior_transform: Isometry2::identity(),
        }
    }

    /// Which side of the wall this half-edge represents.
    #[must_use]
    pub fn side(&self) -> WallSide {
        if self.front {
            WallSide::Front
        } else {
            WallSide::Back
        }
    }

    /// Returns the corner this half-edge leaves from.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall is not found in the store.
    pub fn start_corner(&self, store: &TopologyStore) -> Result<CornerId, TopologyError> {
        let wall = store.wall(self.wall)?;
        Ok(if self.front { wall.start } else { wall.end })
    }

    /// Returns the corner this half-edge arrives at.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall is not found in the store.
    pub fn end_corner(&self, store: &TopologyStore) -> Result<CornerId, TopologyError> {
        let wall = store.wall(self.wall)?;
        Ok(if self.front { wall.end } else { wall.start })
    }

    /// Returns the centerline endpoints in travel direction.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall or its corners are not found.
    pub fn segment(&self, store: &TopologyStore) -> Result<(Point2, Point2), TopologyError> {
        let start = store.corner(self.start_corner(store)?)?.position;
        let end = store.corner(self.end_corner(store)?)?.position;
        Ok((start, end))
    }

    /// Returns the texture of the wall side this half-edge represents.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall is not found in the store.
    pub fn texture<'a>(&self, store: &'a TopologyStore) -> Result<&'a WallTexture, TopologyError> {
        Ok(store.wall(self.wall)?.texture(self.side()))
    }

    /// Returns the half-edge on the other side of the same wall, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall is not found in the store.
    pub fn opposite_edge(&self, store: &TopologyStore) -> Result<Option<HalfEdgeId>, TopologyError> {
        let wall = store.wall(self.wall)?;
        Ok(if self.front {
            wall.back_edge
        } else {
            wall.front_edge
        })
    }

    /// Miter vector at the start corner, shared with `prev`.
    fn start_vector(&self, store: &TopologyStore) -> Result<Vector2, TopologyError> {
        let (start, end) = self.segment(store)?;
        let (prev_start, prev_end) = match self.prev {
            Some(prev) => store.half_edge(prev)?.segment(store)?,
            // Extrapolate backwards so the open end gets a square offset.
            None => (start - (end - start), start),
        };
        Ok(half_angle_vector(&prev_start, &prev_end, &start, &end, self.offset))
    }

    /// Miter vector at the end corner, shared with `next`.
    fn end_vector(&self, store: &TopologyStore) -> Result<Vector2, TopologyError> {
        let (start, end) = self.segment(store)?;
        let (next_start, next_end) = match self.next {
            Some(next) => store.half_edge(next)?.segment(store)?,
            None => (end, end + (end - start)),
        };
        Ok(half_angle_vector(&start, &end, &next_start, &next_end, self.offset))
    }

    /// Start of the boundary offset toward the room.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall, its corners, or a linked half-edge is missing.
    pub fn interior_start(&self, store: &TopologyStore) -> Result<Point2, TopologyError> {
        let (start, _) = self.segment(store)?;
        Ok(start + self.start_vector(store)?)
    }

    /// End of the boundary offset toward the room.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall, its corners, or a linked half-edge is missing.
    pub fn interior_end(&self, store: &TopologyStore) -> Result<Point2, TopologyError> {
        let (_, end) = self.segment(store)?;
        Ok(end + self.end_vector(store)?)
    }

    /// Start of the boundary offset away from the room.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall, its corners, or a linked half-edge is missing.
    pub fn exterior_start(&self, store: &TopologyStore) -> Result<Point2, TopologyError> {
        let (start, _) = self.segment(store)?;
        Ok(start - self.start_vector(store)?)
    }

    /// End of the boundary offset away from the room.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall, its corners, or a linked half-edge is missing.
    pub fn exterior_end(&self, store: &TopologyStore) -> Result<Point2, TopologyError> {
        let (_, end) = self.segment(store)?;
        Ok(end - self.end_vector(store)?)
    }

    /// Midpoint of the interior boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall, its corners, or a linked half-edge is missing.
    pub fn interior_center(&self, store: &TopologyStore) -> Result<Point2, TopologyError> {
        let start = self.interior_start(store)?;
        let end = self.interior_end(store)?;
        Ok(nalgebra::center(&start, &end))
    }

    /// Length of the interior boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall, its corners, or a linked half-edge is missing.
    pub fn interior_distance(&self, store: &TopologyStore) -> Result<f64, TopologyError> {
        let start = self.interior_start(store)?;
        let end = self.interior_end(store)?;
        Ok(nalgebra::distance(&start, &end))
    }

    /// Distance from `point` to the interior boundary segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall, its corners, or a linked half-edge is missing.
    pub fn distance_to(&self, store: &TopologyStore, point: &Point2) -> Result<f64, TopologyError> {
        let start = self.interior_start(store)?;
        let end = self.interior_end(store)?;
        Ok(point_to_segment_dist(point, &start, &end))
    }

    /// The wall-side footprint: interior start, interior end, exterior end,
    /// exterior start.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall, its corners, or a linked half-edge is missing.
    pub fn corners(&self, store: &TopologyStore) -> Result<[Point2; 4], TopologyError> {
        Ok([
            self.interior_start(store)?,
            self.interior_end(store)?,
            self.exterior_end(store)?,
            self.exterior_start(store)?,
        ])
    }

    /// Computes the four wall-plane transforms from the current geometry.
    ///
    /// Returns `(interior, inv_interior, exterior, inv_exterior)`; the caller
    /// stores them back with [`HalfEdgeData::set_transforms`].
    ///
    /// # Errors
    ///
    /// Returns an error if the wall, its corners, or a linked half-edge is missing.
    pub fn compute_transforms(
        &self,
        store: &TopologyStore,
    ) -> Result<[Isometry2; 4], TopologyError> {
        let (interior, inv_interior) =
            wall_plane_transform(&self.interior_start(store)?, &self.interior_end(store)?);
        let (exterior, inv_exterior) =
            wall_plane_transform(&self.exterior_start(store)?, &self.exterior_end(store)?);
        Ok([interior, inv_interior, exterior, inv_exterior])
    }

    pub fn set_transforms(&mut self, transforms: [Isometry2; 4]) {
        let [interior, inv_interior, exterior, inv_exterior] = transforms;
        self.interior_transform = interior;
        self.inv_interior_transform = inv_interior;
        self.exterior_transform = exterior;
        self.inv_exterior_transform = inv_exterior;
    }
}

/// Builds the world → wall-plane transform for a boundary segment and its inverse.
///
/// The segment start maps to the origin and its direction onto +x.
#[must_use]
pub fn wall_plane_transform(start: &Point2, end: &Point2) -> (Isometry2, Isometry2) {
    let d = end - start;
    let angle = d.y.atan2(d.x);
    let transform = Isometry2::rotation(-angle) * Isometry2::translation(-start.x, -start.y);
    (transform, transform.inverse())
}
