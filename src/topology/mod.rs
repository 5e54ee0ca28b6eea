pub mod corner;
pub mod half_edge;
pub mod room;
pub mod wall;

pub use corner::{CornerData, CornerId};
pub use half_edge::{HalfEdgeData, HalfEdgeId};
pub use room::{FloorTexture, RoomData, RoomId};
pub use wall::{FixtureHandle, FixtureMount, WallData, WallId, WallSide, WallTexture};

use crate::error::TopologyError;
use slotmap::SlotMap;

/// Central arena that owns all corners, walls, half-edges and rooms.
///
/// Entities reference each other via typed IDs (generational indices),
/// avoiding self-referential structures and enabling safe mutation.
/// Corners, walls and rooms additionally keep their insertion order, which
/// decides tie-breaks in merging and room finding.
#[derive(Debug, Default)]
pub struct TopologyStore {
    corners: SlotMap<CornerId, CornerData>,
    corner_order: Vec<CornerId>,
    walls: SlotMap<WallId, WallData>,
    wall_order: Vec<WallId>,
    half_edges: SlotMap<HalfEdgeId, HalfEdgeData>,
    rooms: SlotMap<RoomId, RoomData>,
    room_order: Vec<RoomId>,
}

impl TopologyStore {
    /// Creates a new, empty topology store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Corner operations ---

    /// Inserts a corner and returns its ID.
    pub fn add_corner(&mut self, data: CornerData) -> CornerId {
        let id = self.corners.insert(data);
        self.corner_order.push(id);
        id
    }

    /// Returns a reference to the corner data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn corner(&self, id: CornerId) -> Result<&CornerData, TopologyError> {
        self.corners
            .get(id)
            .ok_or(TopologyError::EntityNotFound("corner"))
    }

    /// Returns a mutable reference to the corner data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn corner_mut(&mut self, id: CornerId) -> Result<&mut CornerData, TopologyError> {
        self.corners
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("corner"))
    }

    /// Removes a corner, returning its data if it was live.
    ///
    /// Does not touch walls; callers detach them first.
    pub fn remove_corner(&mut self, id: CornerId) -> Option<CornerData> {
        let data = self.corners.remove(id)?;
        self.corner_order.retain(|&c| c != id);
        Some(data)
    }

    #[must_use]
    pub fn contains_corner(&self, id: CornerId) -> bool {
        self.corners.contains_key(id)
    }

    /// Live corner IDs in insertion order.
    #[must_use]
    pub fn corner_ids(&self) -> &[CornerId] {
        &self.corner_order
    }

    /// Finds a corner by its persistent uid.
    #[must_use]
    pub fn corner_by_uid(&self, uid: &str) -> Option<CornerId> {
        self.corner_order
            .iter()
            .copied()
            .find(|&id| self.corners.get(id).is_some_and(|c| c.uid == uid))
    }

    // --- Wall operations ---

    /// Inserts a wall and returns its ID.
    ///
    /// Does not attach the wall to its corners.
    pub fn add_wall(&mut self, data: WallData) -> WallId {
        let id = self.walls.insert(data);
        self.wall_order.push(id);
        id
    }

    /// Returns a reference to the wall data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn wall(&self, id: WallId) -> Result<&WallData, TopologyError> {
        self.walls
            .get(id)
            .ok_or(TopologyError::EntityNotFound("wall"))
    }

    /// Returns a mutable reference to the wall data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn wall_mut(&mut self, id: WallId) -> Result<&mut WallData, TopologyError> {
        self.walls
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("wall"))
    }

    /// Removes a wall, returning its data if it was live.
    ///
    /// Does not touch corners; callers detach first.
    pub fn remove_wall(&mut self, id: WallId) -> Option<WallData> {
        let data = self.walls.remove(id)?;
        self.wall_order.retain(|&w| w != id);
        Some(data)
    }

    #[must_use]
    pub fn contains_wall(&self, id: WallId) -> bool {
        self.walls.contains_key(id)
    }

    /// Live wall IDs in insertion order.
    #[must_use]
    pub fn wall_ids(&self) -> &[WallId] {
        &self.wall_order
    }

    // --- Half-edge operations ---

    /// Inserts a half-edge and returns its ID.
    pub fn add_half_edge(&mut self, data: HalfEdgeData) -> HalfEdgeId {
        self.half_edges.insert(data)
    }

    /// Returns a reference to the half-edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn half_edge(&self, id: HalfEdgeId) -> Result<&HalfEdgeData, TopologyError> {
        self.half_edges
            .get(id)
            .ok_or(TopologyError::EntityNotFound("half-edge"))
    }

    /// Returns a mutable reference to the half-edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn half_edge_mut(&mut self, id: HalfEdgeId) -> Result<&mut HalfEdgeData, TopologyError> {
        self.half_edges
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("half-edge"))
    }

    // --- Room operations ---

    /// Inserts a room and returns its ID.
    pub fn add_room(&mut self, data: RoomData) -> RoomId {
        let id = self.rooms.insert(data);
        self.room_order.push(id);
        id
    }

    /// Returns a reference to the room data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn room(&self, id: RoomId) -> Result<&RoomData, TopologyError> {
        self.rooms
            .get(id)
            .ok_or(TopologyError::EntityNotFound("room"))
    }

    /// Returns a mutable reference to the room data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn room_mut(&mut self, id: RoomId) -> Result<&mut RoomData, TopologyError> {
        self.rooms
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("room"))
    }

    /// Live room IDs in construction order.
    #[must_use]
    pub fn room_ids(&self) -> &[RoomId] {
        &self.room_order
    }

    /// Removes every entity. Ids issued before the call stay invalid.
    pub fn clear(&mut self) {
        self.corners.clear();
        self.corner_order.clear();
        self.walls.clear();
        self.wall_order.clear();
        self.half_edges.clear();
        self.rooms.clear();
        self.room_order.clear();
    }

    /// Drops every room and half-edge and clears the walls' half-edge slots.
    pub fn clear_derived(&mut self) {
        self.rooms.clear();
        self.room_order.clear();
        self.half_edges.clear();
        for wall in self.walls.values_mut() {
            wall.reset_front_back();
        }
    }

    // --- Graph traversal ---

    /// Walls attached to a corner: starts first, then ends, each in attachment order.
    ///
    /// # Errors
    ///
    /// Returns an error if the corner is not found.
    pub fn walls_of(&self, corner: CornerId) -> Result<Vec<WallId>, TopologyError> {
        let data = self.corner(corner)?;
        Ok(data
            .wall_starts
            .iter()
            .chain(data.wall_ends.iter())
            .copied()
            .collect())
    }

    /// Corners one wall away: ends of starting walls, then starts of ending walls.
    ///
    /// # Errors
    ///
    /// Returns an error if the corner or one of its walls is not found.
    pub fn adjacent_corners(&self, corner: CornerId) -> Result<Vec<CornerId>, TopologyError> {
        let data = self.corner(corner)?;
        let mut result = Vec::with_capacity(data.degree());
        for &wall in &data.wall_starts {
            result.push(self.wall(wall)?.end);
        }
        for &wall in &data.wall_ends {
            result.push(self.wall(wall)?.start);
        }
        Ok(result)
    }

    /// Wall running from `from` to `to`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if `from` or one of its walls is not found.
    pub fn wall_to(&self, from: CornerId, to: CornerId) -> Result<Option<WallId>, TopologyError> {
        for &wall in &self.corner(from)?.wall_starts {
            if self.wall(wall)?.end == to {
                return Ok(Some(wall));
            }
        }
        Ok(None)
    }

    /// Wall running from `from` into `corner`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if `corner` or one of its walls is not found.
    pub fn wall_from(&self, corner: CornerId, from: CornerId) -> Result<Option<WallId>, TopologyError> {
        for &wall in &self.corner(corner)?.wall_ends {
            if self.wall(wall)?.start == from {
                return Ok(Some(wall));
            }
        }
        Ok(None)
    }

    /// Wall joining the two corners in either direction, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if `a` or one of its walls is not found.
    pub fn wall_to_or_from(&self, a: CornerId, b: CornerId) -> Result<Option<WallId>, TopologyError> {
        Ok(self.wall_to(a, b)?.or(self.wall_from(a, b)?))
    }
}
