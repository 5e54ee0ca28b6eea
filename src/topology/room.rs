use serde::{Deserialize, Serialize};

use crate::error::TopologyError;
use crate::math::polygon_2d::signed_area_2d;
use crate::math::Point2;

use super::corner::CornerId;
use super::half_edge::{HalfEdgeData, HalfEdgeId};
use super::TopologyStore;

slotmap::new_key_type! {
    /// Unique identifier for a room in the topology store.
    pub struct RoomId;
}

/// Floor texture used by rooms without a stored setting.
pub const DEFAULT_FLOOR_TEXTURE_URL: &str = "rooms/textures/hardwood.png";

/// Scale of the default floor texture.
pub const DEFAULT_FLOOR_TEXTURE_SCALE: f64 = 400.0;

/// Texture reference for a room floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorTexture {
    pub url: String,
    pub scale: f64,
}

impl Default for FloorTexture {
    fn default() -> Self {
        Self {
            url: DEFAULT_FLOOR_TEXTURE_URL.to_owned(),
            scale: DEFAULT_FLOOR_TEXTURE_SCALE,
        }
    }
}

/// Data associated with a room: a bounded face of the wall graph.
#[derive(Debug, Clone)]
pub struct RoomData {
    /// Boundary corners, counter-clockwise.
    pub corners: Vec<CornerId>,
    /// First half-edge of the boundary ring.
    pub edge_pointer: Option<HalfEdgeId>,
    /// Boundary inset by each wall's half-thickness.
    pub interior_corners: Vec<Point2>,
}

impl RoomData {
    /// Builds a room over a counter-clockwise corner cycle.
    ///
    /// Creates one half-edge per consecutive corner pair, links them into a
    /// closed ring (a doubly connected edge list), registers each half-edge
    /// on its wall, then collects the interior polygon and computes each
    /// half-edge's wall-plane transforms.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::DisconnectedRoomCorners` if two consecutive
    /// corners are not joined by a wall, or `EntityNotFound` if the cycle
    /// names a dead corner.
    pub fn build(store: &mut TopologyStore, corners: Vec<CornerId>) -> Result<RoomId, TopologyError> {
        let room = store.add_room(RoomData {
            corners,
            edge_pointer: None,
            interior_corners: Vec::new(),
        });
        update_walls(store, room)?;
        update_interior_corners(store, room)?;
        Ok(room)
    }

    /// Room identity: corner uids, sorted and comma-joined.
    ///
    /// Stable across rebuilds as long as the same corners bound the room.
    ///
    /// # Errors
    ///
    /// Returns an error if a boundary corner is not found.
    pub fn uid(&self, store: &TopologyStore) -> Result<String, TopologyError> {
        room_uid(store, &self.corners)
    }

    /// Raw (centerline) boundary positions.
    ///
    /// # Errors
    ///
    /// Returns an error if a boundary corner is not found.
    pub fn corner_points(&self, store: &TopologyStore) -> Result<Vec<Point2>, TopologyError> {
        self.corners
            .iter()
            .map(|&c| store.corner(c).map(|data| data.position))
            .collect()
    }

    /// Area of the interior (inset) floor polygon.
    #[must_use]
    pub fn floor_area(&self) -> f64 {
        signed_area_2d(&self.interior_corners).abs()
    }

    /// Half-edges of the boundary ring, starting at `edge_pointer`.
    ///
    /// # Errors
    ///
    /// Returns an error if the ring references a missing half-edge.
    pub fn edges(&self, store: &TopologyStore) -> Result<Vec<HalfEdgeId>, TopologyError> {
        let mut result = Vec::new();
        let Some(first) = self.edge_pointer else {
            return Ok(result);
        };
        let mut edge = first;
        loop {
            result.push(edge);
            match store.half_edge(edge)?.next {
                Some(next) if next != first && result.len() < self.corners.len() => edge = next,
                _ => break,
            }
        }
        Ok(result)
    }
}

/// Computes a room identity from its corners.
///
/// # Errors
///
/// Returns an error if a corner is not found.
pub fn room_uid(store: &TopologyStore, corners: &[CornerId]) -> Result<String, TopologyError> {
    let mut uids = corners
        .iter()
        .map(|&c| store.corner(c).map(|data| data.uid.clone()))
        .collect::<Result<Vec<_>, _>>()?;
    uids.sort();
    Ok(uids.join(","))
}

/// Creates the half-edge ring for `room`.
fn update_walls(store: &mut TopologyStore, room: RoomId) -> Result<(), TopologyError> {
    let corners = store.room(room)?.corners.clone();
    let n = corners.len();

    let mut first_edge: Option<HalfEdgeId> = None;
    let mut prev_edge: Option<HalfEdgeId> = None;

    for i in 0..n {
        let first_corner = corners[i];
        let second_corner = corners[(i + 1) % n];

        // Find whether the wall runs in the direction of travel.
        let (wall, front) = if let Some(wall) = store.wall_to(first_corner, second_corner)? {
            (wall, true)
        } else if let Some(wall) = store.wall_from(first_corner, second_corner)? {
            (wall, false)
        } else {
            let from = store.corner(first_corner)?.uid.clone();
            let to = store.corner(second_corner)?.uid.clone();
            tracing::error!(%from, %to, "room corners are not connected by a wall");
            return Err(TopologyError::DisconnectedRoomCorners { from, to });
        };

        let data = HalfEdgeData::new(wall, store.wall(wall)?, front, Some(room));
        let edge = store.add_half_edge(data);
        let wall_data = store.wall_mut(wall)?;
        if front {
            wall_data.front_edge = Some(edge);
        } else {
            wall_data.back_edge = Some(edge);
        }

        if let Some(prev) = prev_edge {
            store.half_edge_mut(edge)?.prev = Some(prev);
            store.half_edge_mut(prev)?.next = Some(edge);
        } else {
            first_edge = Some(edge);
        }
        prev_edge = Some(edge);
    }

    // Close the ring.
    if let (Some(first), Some(last)) = (first_edge, prev_edge) {
        store.half_edge_mut(first)?.prev = Some(last);
        store.half_edge_mut(last)?.next = Some(first);
    }

    store.room_mut(room)?.edge_pointer = first_edge;
    Ok(())
}

/// Collects the interior polygon and refreshes each half-edge's transforms.
fn update_interior_corners(store: &mut TopologyStore, room: RoomId) -> Result<(), TopologyError> {
    let edges = store.room(room)?.edges(store)?;
    let mut interior = Vec::with_capacity(edges.len());
    for edge in edges {
        let data = store.half_edge(edge)?;
        interior.push(data.interior_start(store)?);
        let transforms = data.compute_transforms(store)?;
        store.half_edge_mut(edge)?.set_transforms(transforms);
    }
    store.room_mut(room)?.interior_corners = interior;
    Ok(())
}
