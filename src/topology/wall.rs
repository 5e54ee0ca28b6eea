use serde::{Deserialize, Serialize};

use super::corner::CornerId;
use super::half_edge::HalfEdgeId;

slotmap::new_key_type! {
    /// Unique identifier for a wall in the topology store.
    pub struct WallId;
}

/// Default texture applied to both sides of a new wall.
pub const DEFAULT_WALL_TEXTURE_URL: &str = "rooms/textures/wallmap.png";

/// Texture reference for one side of a wall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallTexture {
    pub url: String,
    pub stretch: bool,
    pub scale: f64,
}

impl Default for WallTexture {
    fn default() -> Self {
        Self {
            url: DEFAULT_WALL_TEXTURE_URL.to_owned(),
            stretch: true,
            scale: 0.0,
        }
    }
}

/// Opaque handle to a fixture (door, window, cabinet...) owned by a collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixtureHandle(pub u64);

/// How a fixture is attached to a wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureMount {
    /// Mounted on the wall surface.
    Wall,
    /// Standing on the floor against the wall.
    Floor,
}

/// Which face of a wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallSide {
    /// The side seen when walking from start to end with the room on the left.
    Front,
    /// The opposite side.
    Back,
}

/// Data associated with a wall (an edge of the wall graph).
#[derive(Debug, Clone)]
pub struct WallData {
    /// Identity derived from the endpoint uids at creation time.
    pub uid: String,
    /// Start corner.
    pub start: CornerId,
    /// End corner.
    pub end: CornerId,
    pub thickness: f64,
    pub height: f64,
    pub front_texture: WallTexture,
    pub back_texture: WallTexture,
    /// Fixtures mounted on the wall.
    pub items: Vec<FixtureHandle>,
    /// Fixtures standing on the floor against the wall.
    pub on_items: Vec<FixtureHandle>,
    /// Front half-edge, set while the wall bounds a room (or is an orphan).
    pub front_edge: Option<HalfEdgeId>,
    /// Back half-edge, set while the wall bounds a room (or is an orphan).
    pub back_edge: Option<HalfEdgeId>,
    /// `true` when the last rebuild found no room on either side.
    pub orphan: bool,
}

impl WallData {
    /// Creates a wall between two corners with default textures.
    #[must_use]
    pub fn new(uid: String, start: CornerId, end: CornerId, thickness: f64, height: f64) -> Self {
        Self {
            uid,
            start,
            end,
            thickness,
            height,
            front_texture: WallTexture::default(),
            back_texture: WallTexture::default(),
            items: Vec::new(),
            on_items: Vec::new(),
            front_edge: None,
            back_edge: None,
            orphan: false,
        }
    }

    /// Clears both half-edge slots and the orphan flag.
    pub fn reset_front_back(&mut self) {
        self.front_edge = None;
        self.back_edge = None;
        self.orphan = false;
    }

    /// Returns the corner at the other end of the wall, if `corner` is an endpoint.
    #[must_use]
    pub fn opposite_corner(&self, corner: CornerId) -> Option<CornerId> {
        if self.start == corner {
            Some(self.end)
        } else if self.end == corner {
            Some(self.start)
        } else {
            None
        }
    }

    /// Returns `true` if the wall joins `a` and `b` in either direction.
    #[must_use]
    pub fn connects(&self, a: CornerId, b: CornerId) -> bool {
        (self.start == a && self.end == b) || (self.start == b && self.end == a)
    }

    #[must_use]
    pub fn texture(&self, side: WallSide) -> &WallTexture {
        match side {
            WallSide::Front => &self.front_texture,
            WallSide::Back => &self.back_texture,
        }
    }

    pub fn set_texture(&mut self, side: WallSide, texture: WallTexture) {
        match side {
            WallSide::Front => self.front_texture = texture,
            WallSide::Back => self.back_texture = texture,
        }
    }

    /// Returns the fixture list for a mount kind.
    #[must_use]
    pub fn fixtures(&self, mount: FixtureMount) -> &[FixtureHandle] {
        match mount {
            FixtureMount::Wall => &self.items,
            FixtureMount::Floor => &self.on_items,
        }
    }

    pub(crate) fn fixtures_mut(&mut self, mount: FixtureMount) -> &mut Vec<FixtureHandle> {
        match mount {
            FixtureMount::Wall => &mut self.items,
            FixtureMount::Floor => &mut self.on_items,
        }
    }
}
