mod edit;
mod persist;

pub use edit::{AxisSnap, MergeOutcome};
pub use persist::{CornerRecord, FloorplanDocument, WallRecord};

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::config::FloorplanConfig;
use crate::error::{OperationError, Result, TopologyError};
use crate::events::{dispatch_pending, EventBus, SubscriptionId};
use crate::math::distance_2d::point_to_segment_dist;
use crate::math::{Point2, Vector2};
use crate::operations::query::{Aabb2, Dimensions, OverlappedCorner, OverlappedWall};
use crate::operations::room_finding::FindRooms;
use crate::topology::{
    CornerData, CornerId, FixtureHandle, FixtureMount, FloorTexture, HalfEdgeData, HalfEdgeId,
    RoomData, RoomId, TopologyStore, WallData, WallId, WallSide, WallTexture,
};

/// Notifications emitted by a [`Floorplan`].
///
/// Events are delivered after the operation that produced them has fully
/// completed, including any rebuild it triggered.
#[derive(Debug, Clone, PartialEq)]
pub enum FloorplanEvent {
    NewCorner(CornerId),
    NewWall(WallId),
    /// A corner was moved; `position` is where it ended up after snapping.
    CornerMoved { corner: CornerId, position: Point2 },
    /// A wall's geometry changed (an endpoint moved or was reassigned).
    WallMoved(WallId),
    /// A wall's appearance changed and should be redrawn.
    WallRedraw(WallId),
    CornerDeleted(CornerId),
    WallDeleted(WallId),
    /// `update()` finished; rooms and half-edges are fresh.
    RoomsUpdated,
    /// A document finished loading.
    RoomsLoaded,
    /// The floor texture of the room with this uid changed.
    FloorTextureChanged(String),
}

/// Which endpoint of a wall an edit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WallEnd {
    Start,
    End,
}

/// Interior face of one half-edge, as consumed by picking and rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallPlane {
    pub edge: HalfEdgeId,
    pub start: Point2,
    pub end: Point2,
    pub height: f64,
}

/// Floor polygon of one room.
#[derive(Debug, Clone, PartialEq)]
pub struct FloorPlane {
    pub room: RoomId,
    pub polygon: Vec<Point2>,
}

/// The aggregate root: all corners and walls, and the rooms derived from them.
///
/// `rooms` reflect the graph as of the last [`Floorplan::update`]. Edit
/// commands that change the topology (new/removed walls, merges, splits)
/// rebuild on their own; plain moves and endpoint reassignment do not.
#[derive(Debug, Default)]
pub struct Floorplan {
    store: TopologyStore,
    config: FloorplanConfig,
    /// Floor textures by room uid; kept here because rooms are rebuilt wholesale.
    floor_textures: BTreeMap<String, FloorTexture>,
    events: EventBus<Floorplan, FloorplanEvent>,
}

impl Floorplan {
    /// Creates an empty floorplan with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty floorplan with the given configuration.
    #[must_use]
    pub fn with_config(config: FloorplanConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn config(&self) -> &FloorplanConfig {
        &self.config
    }

    /// Read access to the underlying arena, for half-edge and room geometry queries.
    #[must_use]
    pub fn store(&self) -> &TopologyStore {
        &self.store
    }

    // --- Events ---

    /// Registers an event handler. Handlers may edit the floorplan.
    pub fn subscribe(
        &mut self,
        handler: impl FnMut(&mut Floorplan, &FloorplanEvent) + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(handler)
    }

    /// Removes an event handler. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Delivers queued events, then hands back the operation's result.
    fn finish<T>(&mut self, result: Result<T>) -> Result<T> {
        dispatch_pending(self, |plan| &mut plan.events);
        result
    }

    // --- Lookups ---

    /// Live corners in creation order.
    #[must_use]
    pub fn corner_ids(&self) -> &[CornerId] {
        self.store.corner_ids()
    }

    /// Live walls in creation order.
    #[must_use]
    pub fn wall_ids(&self) -> &[WallId] {
        self.store.wall_ids()
    }

    /// Rooms from the last rebuild.
    #[must_use]
    pub fn room_ids(&self) -> &[RoomId] {
        self.store.room_ids()
    }

    /// # Errors
    ///
    /// Returns an error if the corner is not live.
    pub fn corner(&self, id: CornerId) -> Result<&CornerData> {
        Ok(self.store.corner(id)?)
    }

    /// # Errors
    ///
    /// Returns an error if the wall is not live.
    pub fn wall(&self, id: WallId) -> Result<&WallData> {
        Ok(self.store.wall(id)?)
    }

    /// # Errors
    ///
    /// Returns an error if the room is not from the last rebuild.
    pub fn room(&self, id: RoomId) -> Result<&RoomData> {
        Ok(self.store.room(id)?)
    }

    /// # Errors
    ///
    /// Returns an error if the half-edge is not from the last rebuild.
    pub fn half_edge(&self, id: HalfEdgeId) -> Result<&HalfEdgeData> {
        Ok(self.store.half_edge(id)?)
    }

    /// Corners one wall away from `corner`.
    ///
    /// # Errors
    ///
    /// Returns an error if the corner is not live.
    pub fn adjacent_corners(&self, corner: CornerId) -> Result<Vec<CornerId>> {
        Ok(self.store.adjacent_corners(corner)?)
    }

    /// Wall running from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns an error if `from` is not live.
    pub fn wall_to(&self, from: CornerId, to: CornerId) -> Result<Option<WallId>> {
        Ok(self.store.wall_to(from, to)?)
    }

    /// Wall running from `from` into `corner`.
    ///
    /// # Errors
    ///
    /// Returns an error if `corner` is not live.
    pub fn wall_from(&self, corner: CornerId, from: CornerId) -> Result<Option<WallId>> {
        Ok(self.store.wall_from(corner, from)?)
    }

    /// Straight-line distance between two corners.
    ///
    /// # Errors
    ///
    /// Returns an error if either corner is not live.
    pub fn distance_from_corner(&self, corner: CornerId, other: CornerId) -> Result<f64> {
        let target = self.store.corner(other)?.position;
        Ok(self.store.corner(corner)?.distance_from(target.x, target.y))
    }

    /// Wall joining two corners in either direction.
    ///
    /// # Errors
    ///
    /// Returns an error if `a` is not live.
    pub fn wall_between(&self, a: CornerId, b: CornerId) -> Result<Option<WallId>> {
        Ok(self.store.wall_to_or_from(a, b)?)
    }

    /// Distance from `(x, y)` to a wall's centerline segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall or its corners are not live.
    pub fn wall_distance_from(&self, wall: WallId, x: f64, y: f64) -> Result<f64> {
        let data = self.store.wall(wall)?;
        let start = self.store.corner(data.start)?.position;
        let end = self.store.corner(data.end)?.position;
        Ok(point_to_segment_dist(&Point2::new(x, y), &start, &end))
    }

    /// Room identity: sorted corner uids joined by commas.
    ///
    /// # Errors
    ///
    /// Returns an error if the room is not from the last rebuild.
    pub fn room_uid(&self, room: RoomId) -> Result<String> {
        Ok(self.store.room(room)?.uid(&self.store)?)
    }

    // --- Creation and removal ---

    /// Creates a corner with a freshly generated uid. Does not merge or rebuild.
    pub fn new_corner(&mut self, x: f64, y: f64) -> CornerId {
        let id = self.insert_corner(x, y, None);
        dispatch_pending(self, |plan| &mut plan.events);
        id
    }

    /// Creates a corner with a caller-chosen uid. Does not merge or rebuild.
    pub fn new_corner_with_uid(&mut self, x: f64, y: f64, uid: impl Into<String>) -> CornerId {
        let id = self.insert_corner(x, y, Some(uid.into()));
        dispatch_pending(self, |plan| &mut plan.events);
        id
    }

    /// Creates a wall between two corners and rebuilds.
    ///
    /// If a wall already joins the two corners (in either direction) it is
    /// returned instead of creating a duplicate.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if `start == end`, or a topology
    /// error if either corner is not live.
    pub fn new_wall(&mut self, start: CornerId, end: CornerId) -> Result<WallId> {
        let result = self.insert_wall(start, end).and_then(|wall| {
            self.update_inner()?;
            Ok(wall)
        });
        self.finish(result)
    }

    /// Removes a wall, and any endpoint left without walls, then rebuilds.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall is not live.
    pub fn remove_wall(&mut self, wall: WallId) -> Result<()> {
        let result = self.detach_wall(wall).and_then(|()| self.update_inner());
        self.finish(result)
    }

    /// Removes a corner.
    ///
    /// With `cascade`, every attached wall is removed first (which may also
    /// remove neighbouring corners left without walls). Without it, a corner
    /// that still has walls is refused.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::CornerInUse` when refusing, or an error if the
    /// corner is not live.
    pub fn remove_corner(&mut self, corner: CornerId, cascade: bool) -> Result<()> {
        let result = self.remove_corner_inner(corner, cascade);
        self.finish(result)
    }

    fn remove_corner_inner(&mut self, corner: CornerId, cascade: bool) -> Result<()> {
        let degree = self.store.corner(corner)?.degree();
        if degree > 0 && !cascade {
            return Err(TopologyError::CornerInUse(degree).into());
        }
        for wall in self.store.walls_of(corner)? {
            if self.store.contains_wall(wall) {
                self.detach_wall(wall)?;
            }
        }
        if self.store.contains_corner(corner) {
            self.delete_corner(corner);
        }
        self.update_inner()
    }

    /// Re-points a wall's start to another corner. Does not rebuild.
    ///
    /// The previous start corner is removed if it is left without walls.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall or corner is not live.
    pub fn set_wall_start(&mut self, wall: WallId, corner: CornerId) -> Result<()> {
        let result = self.reattach(wall, corner, WallEnd::Start);
        self.finish(result)
    }

    /// Re-points a wall's end to another corner. Does not rebuild.
    ///
    /// The previous end corner is removed if it is left without walls.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall or corner is not live.
    pub fn set_wall_end(&mut self, wall: WallId, corner: CornerId) -> Result<()> {
        let result = self.reattach(wall, corner, WallEnd::End);
        self.finish(result)
    }

    pub(crate) fn insert_corner(&mut self, x: f64, y: f64, uid: Option<String>) -> CornerId {
        let uid = uid.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let id = self.store.add_corner(CornerData::new(uid, Point2::new(x, y)));
        self.events.emit(FloorplanEvent::NewCorner(id));
        id
    }

    pub(crate) fn insert_wall(&mut self, start: CornerId, end: CornerId) -> Result<WallId> {
        if start == end {
            return Err(OperationError::InvalidInput(
                "wall endpoints must be distinct corners".to_owned(),
            )
            .into());
        }
        let end_uid = self.store.corner(end)?.uid.clone();
        if let Some(existing) = self.store.wall_to_or_from(start, end)? {
            debug!(?existing, "corners already joined; reusing wall");
            return Ok(existing);
        }

        let uid = format!("{},{}", self.store.corner(start)?.uid, end_uid);
        let wall = self.store.add_wall(WallData::new(
            uid,
            start,
            end,
            self.config.wall_thickness,
            self.config.wall_height,
        ));
        self.store.corner_mut(start)?.wall_starts.push(wall);
        self.store.corner_mut(end)?.wall_ends.push(wall);
        self.events.emit(FloorplanEvent::NewWall(wall));
        Ok(wall)
    }

    /// Removes a wall from the store and both endpoints, deleting endpoints
    /// left without walls. Does not rebuild.
    pub(crate) fn detach_wall(&mut self, wall: WallId) -> Result<()> {
        let data = self.store.wall(wall)?;
        let (start, end) = (data.start, data.end);
        self.store.remove_wall(wall);

        for corner in [start, end] {
            let Ok(data) = self.store.corner_mut(corner) else {
                continue;
            };
            data.detach(wall);
            if data.degree() == 0 {
                self.delete_corner(corner);
            }
        }
        self.events.emit(FloorplanEvent::WallDeleted(wall));
        Ok(())
    }

    pub(crate) fn delete_corner(&mut self, corner: CornerId) {
        if self.store.remove_corner(corner).is_some() {
            self.events.emit(FloorplanEvent::CornerDeleted(corner));
        }
    }

    /// Moves one end of a wall to `corner`.
    pub(crate) fn reattach(&mut self, wall: WallId, corner: CornerId, which: WallEnd) -> Result<()> {
        self.store.corner(corner)?;
        let data = self.store.wall(wall)?;
        let old = match which {
            WallEnd::Start => data.start,
            WallEnd::End => data.end,
        };
        if old == corner {
            return Ok(());
        }

        if let Ok(old_data) = self.store.corner_mut(old) {
            match which {
                WallEnd::Start => old_data.wall_starts.retain(|&w| w != wall),
                WallEnd::End => old_data.wall_ends.retain(|&w| w != wall),
            }
            if old_data.degree() == 0 {
                self.delete_corner(old);
            }
        }

        let new_data = self.store.corner_mut(corner)?;
        match which {
            WallEnd::Start => new_data.wall_starts.push(wall),
            WallEnd::End => new_data.wall_ends.push(wall),
        }
        let data = self.store.wall_mut(wall)?;
        match which {
            WallEnd::Start => data.start = corner,
            WallEnd::End => data.end = corner,
        }
        self.events.emit(FloorplanEvent::WallMoved(wall));
        Ok(())
    }

    // --- Rebuild ---

    /// Recomputes rooms and half-edges from the current graph.
    ///
    /// Safe to call repeatedly; the result depends only on the graph.
    ///
    /// # Errors
    ///
    /// Returns a topology error if the derived rooms disagree with the graph,
    /// which indicates a bug in an edit sequence.
    pub fn update(&mut self) -> Result<()> {
        let result = self.update_inner();
        self.finish(result)
    }

    pub(crate) fn update_inner(&mut self) -> Result<()> {
        self.store.clear_derived();

        let cycles = FindRooms::all(&self.store).execute(&self.store)?;
        for cycle in cycles {
            RoomData::build(&mut self.store, cycle)?;
        }
        let orphans = self.assign_orphan_edges()?;
        self.update_floor_textures()?;

        debug!(
            corners = self.store.corner_ids().len(),
            walls = self.store.wall_ids().len(),
            rooms = self.store.room_ids().len(),
            orphans,
            "floorplan rebuilt"
        );
        self.events.emit(FloorplanEvent::RoomsUpdated);
        Ok(())
    }

    /// Gives walls that bound no room a pair of unlinked half-edges so they
    /// still have offset geometry. Returns the number of orphan walls.
    fn assign_orphan_edges(&mut self) -> Result<usize> {
        let mut count = 0;
        for wall in self.store.wall_ids().to_vec() {
            let data = self.store.wall(wall)?;
            if data.front_edge.is_some() || data.back_edge.is_some() {
                continue;
            }
            let back = HalfEdgeData::new(wall, data, false, None);
            let front = HalfEdgeData::new(wall, data, true, None);
            let back = self.store.add_half_edge(back);
            let front = self.store.add_half_edge(front);

            let data = self.store.wall_mut(wall)?;
            data.orphan = true;
            data.back_edge = Some(back);
            data.front_edge = Some(front);

            for edge in [back, front] {
                let transforms = self.store.half_edge(edge)?.compute_transforms(&self.store)?;
                self.store.half_edge_mut(edge)?.set_transforms(transforms);
            }
            count += 1;
        }
        Ok(count)
    }

    /// Drops floor textures of rooms that no longer exist.
    fn update_floor_textures(&mut self) -> Result<()> {
        let live = self
            .store
            .room_ids()
            .iter()
            .map(|&room| self.store.room(room).and_then(|data| data.uid(&self.store)))
            .collect::<std::result::Result<HashSet<String>, TopologyError>>()?;
        self.floor_textures.retain(|uid, _| live.contains(uid));
        Ok(())
    }

    // --- Derived geometry ---

    /// Every half-edge, front then back for each wall in wall order.
    #[must_use]
    pub fn wall_edges(&self) -> Vec<HalfEdgeId> {
        self.store
            .wall_ids()
            .iter()
            .filter_map(|&wall| self.store.wall(wall).ok())
            .flat_map(|data| [data.front_edge, data.back_edge])
            .flatten()
            .collect()
    }

    /// Interior face of every half-edge.
    ///
    /// # Errors
    ///
    /// Returns an error if a half-edge references missing entities.
    pub fn wall_edge_planes(&self) -> Result<Vec<WallPlane>> {
        self.wall_edges()
            .into_iter()
            .map(|edge| {
                let data = self.store.half_edge(edge)?;
                Ok(WallPlane {
                    edge,
                    start: data.interior_start(&self.store)?,
                    end: data.interior_end(&self.store)?,
                    height: data.height,
                })
            })
            .collect()
    }

    /// Floor polygon of every room.
    #[must_use]
    pub fn floor_planes(&self) -> Vec<FloorPlane> {
        self.store
            .room_ids()
            .iter()
            .filter_map(|&room| {
                self.store.room(room).ok().map(|data| FloorPlane {
                    room,
                    polygon: data.interior_corners.clone(),
                })
            })
            .collect()
    }

    /// Front half-edge of a wall.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::MissingHalfEdge` if the wall was created or
    /// changed after the last rebuild.
    pub fn front_edge(&self, wall: WallId) -> Result<HalfEdgeId> {
        Ok(self
            .store
            .wall(wall)?
            .front_edge
            .ok_or(TopologyError::MissingHalfEdge("front"))?)
    }

    /// Back half-edge of a wall.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::MissingHalfEdge` if the wall was created or
    /// changed after the last rebuild.
    pub fn back_edge(&self, wall: WallId) -> Result<HalfEdgeId> {
        Ok(self
            .store
            .wall(wall)?
            .back_edge
            .ok_or(TopologyError::MissingHalfEdge("back"))?)
    }

    /// Bounding box of all corners; a zero box at the origin when empty.
    #[must_use]
    pub fn dimensions(&self) -> Aabb2 {
        Dimensions::new().execute(&self.store).unwrap_or(Aabb2 {
            min: Point2::origin(),
            max: Point2::origin(),
        })
    }

    /// Bounding-box center of all corners.
    #[must_use]
    pub fn center(&self) -> Point2 {
        self.dimensions().center()
    }

    /// Bounding-box size of all corners.
    #[must_use]
    pub fn size(&self) -> Vector2 {
        self.dimensions().size()
    }

    /// First corner (in list order) within `tolerance` of `(x, y)`.
    ///
    /// `None` uses the configured overlap tolerance.
    #[must_use]
    pub fn overlapped_corner(&self, x: f64, y: f64, tolerance: Option<f64>) -> Option<CornerId> {
        let tolerance = tolerance.unwrap_or(self.config.overlap_tolerance);
        OverlappedCorner::new(Point2::new(x, y), tolerance).execute(&self.store)
    }

    /// First wall (in list order) within `tolerance` of `(x, y)`.
    ///
    /// `None` uses the configured overlap tolerance.
    #[must_use]
    pub fn overlapped_wall(&self, x: f64, y: f64, tolerance: Option<f64>) -> Option<WallId> {
        let tolerance = tolerance.unwrap_or(self.config.overlap_tolerance);
        OverlappedWall::new(Point2::new(x, y), tolerance).execute(&self.store)
    }

    // --- Textures ---

    /// Stored floor texture for a room uid, if one was set.
    #[must_use]
    pub fn floor_texture(&self, room_uid: &str) -> Option<&FloorTexture> {
        self.floor_textures.get(room_uid)
    }

    /// Floor texture of a room, falling back to the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the room is not from the last rebuild.
    pub fn room_floor_texture(&self, room: RoomId) -> Result<FloorTexture> {
        let uid = self.room_uid(room)?;
        Ok(self.floor_texture(&uid).cloned().unwrap_or_default())
    }

    /// Stores the floor texture for a room uid.
    pub fn set_floor_texture(&mut self, room_uid: &str, url: impl Into<String>, scale: f64) {
        self.floor_textures.insert(
            room_uid.to_owned(),
            FloorTexture {
                url: url.into(),
                scale,
            },
        );
        self.events
            .emit(FloorplanEvent::FloorTextureChanged(room_uid.to_owned()));
        dispatch_pending(self, |plan| &mut plan.events);
    }

    /// All stored floor textures, by room uid.
    #[must_use]
    pub fn floor_textures(&self) -> &BTreeMap<String, FloorTexture> {
        &self.floor_textures
    }

    /// Sets the texture of one side of a wall and requests a redraw.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall is not live.
    pub fn set_wall_texture(&mut self, wall: WallId, side: WallSide, texture: WallTexture) -> Result<()> {
        let result = self.store.wall_mut(wall).map(|data| {
            data.set_texture(side, texture);
        });
        if result.is_ok() {
            self.events.emit(FloorplanEvent::WallRedraw(wall));
        }
        self.finish(result.map_err(Into::into))
    }

    /// Sets the texture of the wall side a half-edge represents.
    ///
    /// # Errors
    ///
    /// Returns an error if the half-edge is not from the last rebuild.
    pub fn set_edge_texture(&mut self, edge: HalfEdgeId, texture: WallTexture) -> Result<()> {
        let data = self.store.half_edge(edge)?;
        let (wall, side) = (data.wall, data.side());
        self.set_wall_texture(wall, side, texture)
    }

    /// Requests a redraw of a wall without changing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall is not live.
    pub fn redraw_wall(&mut self, wall: WallId) -> Result<()> {
        self.store.wall(wall)?;
        self.events.emit(FloorplanEvent::WallRedraw(wall));
        self.finish(Ok(()))
    }

    // --- Fixtures ---

    /// Records a fixture as attached to a wall.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall is not live.
    pub fn attach_fixture(&mut self, wall: WallId, fixture: FixtureHandle, mount: FixtureMount) -> Result<()> {
        let list = self.store.wall_mut(wall)?.fixtures_mut(mount);
        if !list.contains(&fixture) {
            list.push(fixture);
        }
        Ok(())
    }

    /// Removes a fixture from a wall. Returns `false` if it was not attached.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall is not live.
    pub fn detach_fixture(&mut self, wall: WallId, fixture: FixtureHandle, mount: FixtureMount) -> Result<bool> {
        let list = self.store.wall_mut(wall)?.fixtures_mut(mount);
        let before = list.len();
        list.retain(|&f| f != fixture);
        Ok(list.len() != before)
    }
}
