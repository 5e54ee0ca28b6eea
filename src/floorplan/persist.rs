//! JSON document format.
//!
//! ```json
//! {
//!   "corners": { "<uid>": { "x": 0.0, "y": 0.0 } },
//!   "walls": [ { "corner1": "<uid>", "corner2": "<uid>",
//!                "frontTexture": { "url": "...", "stretch": true, "scale": 0.0 },
//!                "backTexture":  { "url": "...", "stretch": true, "scale": 0.0 } } ],
//!   "wallTextures": [],
//!   "floorTextures": {},
//!   "newFloorTextures": { "<room uid>": { "url": "...", "scale": 400.0 } }
//! }
//! ```

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PersistError, Result};
use crate::topology::{CornerId, FloorTexture, TopologyStore, WallSide, WallTexture};

use super::{Floorplan, FloorplanEvent};

/// Serialized corner position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerRecord {
    pub x: f64,
    pub y: f64,
}

/// Serialized wall: endpoint uids and side textures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallRecord {
    pub corner1: String,
    pub corner2: String,
    #[serde(rename = "frontTexture", default, skip_serializing_if = "Option::is_none")]
    pub front_texture: Option<WallTexture>,
    #[serde(rename = "backTexture", default, skip_serializing_if = "Option::is_none")]
    pub back_texture: Option<WallTexture>,
}

/// A saved floorplan.
///
/// A document missing `corners` or `walls` loads as an empty plan. Corners
/// keep their list order, which decides merge tie-breaks.
/// `floorTextures` is the older name for `newFloorTextures`; it is read when
/// the newer key is absent and always written empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FloorplanDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corners: Option<IndexMap<String, CornerRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walls: Option<Vec<WallRecord>>,
    #[serde(rename = "wallTextures", default)]
    pub wall_textures: Vec<serde_json::Value>,
    #[serde(rename = "floorTextures", default)]
    pub floor_textures: BTreeMap<String, FloorTexture>,
    #[serde(rename = "newFloorTextures", default, skip_serializing_if = "Option::is_none")]
    pub new_floor_textures: Option<BTreeMap<String, FloorTexture>>,
}

impl Floorplan {
    /// Captures the plan as a document.
    ///
    /// # Errors
    ///
    /// Returns an error if a wall references a missing corner.
    pub fn save(&self) -> Result<FloorplanDocument> {
        let store = &self.store;
        let mut corners = IndexMap::with_capacity(store.corner_ids().len());
        for &corner in store.corner_ids() {
            let data = store.corner(corner)?;
            corners.insert(
                data.uid.clone(),
                CornerRecord {
                    x: data.position.x,
                    y: data.position.y,
                },
            );
        }

        let mut walls = Vec::with_capacity(store.wall_ids().len());
        for &wall in store.wall_ids() {
            let data = store.wall(wall)?;
            walls.push(WallRecord {
                corner1: uid_of(store, data.start)?,
                corner2: uid_of(store, data.end)?,
                front_texture: Some(data.front_texture.clone()),
                back_texture: Some(data.back_texture.clone()),
            });
        }

        Ok(FloorplanDocument {
            corners: Some(corners),
            walls: Some(walls),
            wall_textures: Vec::new(),
            floor_textures: BTreeMap::new(),
            new_floor_textures: Some(self.floor_textures.clone()),
        })
    }

    /// Serializes the plan to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the plan is inconsistent or serialization fails.
    pub fn to_json(&self) -> Result<String> {
        let document = self.save()?;
        Ok(serde_json::to_string(&document).map_err(PersistError::from)?)
    }

    /// Replaces the plan with the contents of `document` and rebuilds.
    ///
    /// The current plan is cleared first, emitting deletion events. Corners
    /// are created in document order. Walls whose two endpoints name the same
    /// corner are skipped.
    ///
    /// # Errors
    ///
    /// Returns `PersistError::UnknownCorner` if a wall names a corner the
    /// document does not define; the plan is left empty.
    pub fn load(&mut self, document: &FloorplanDocument) -> Result<()> {
        let result = self.load_inner(document);
        self.finish(result)
    }

    /// Parses a JSON document and loads it.
    ///
    /// # Errors
    ///
    /// Returns `PersistError::Json` if the text is not a valid document (the
    /// plan is unchanged), or any error from [`Floorplan::load`].
    pub fn load_json(&mut self, json: &str) -> Result<()> {
        let document: FloorplanDocument = serde_json::from_str(json).map_err(PersistError::from)?;
        self.load(&document)
    }

    fn load_inner(&mut self, document: &FloorplanDocument) -> Result<()> {
        self.reset();

        let (Some(corners), Some(walls)) = (&document.corners, &document.walls) else {
            debug!("document has no corners or walls; loaded empty plan");
            return self.update_inner();
        };

        if let Some(missing) = walls
            .iter()
            .flat_map(|w| [&w.corner1, &w.corner2])
            .find(|uid| !corners.contains_key(uid.as_str()))
        {
            self.update_inner()?;
            return Err(PersistError::UnknownCorner(missing.clone()).into());
        }

        let mut ids: HashMap<&str, CornerId> = HashMap::with_capacity(corners.len());
        for (uid, record) in corners {
            let id = self.insert_corner(record.x, record.y, Some(uid.clone()));
            ids.insert(uid.as_str(), id);
        }

        for record in walls {
            let (Some(&start), Some(&end)) = (
                ids.get(record.corner1.as_str()),
                ids.get(record.corner2.as_str()),
            ) else {
                continue;
            };
            if start == end {
                warn!(corner = %record.corner1, "skipping wall with identical endpoints");
                continue;
            }
            let wall = self.insert_wall(start, end)?;
            let data = self.store.wall_mut(wall)?;
            if let Some(texture) = &record.front_texture {
                data.set_texture(WallSide::Front, texture.clone());
            }
            if let Some(texture) = &record.back_texture {
                data.set_texture(WallSide::Back, texture.clone());
            }
        }

        self.floor_textures = document
            .new_floor_textures
            .clone()
            .unwrap_or_else(|| document.floor_textures.clone());

        self.update_inner()?;
        debug!(
            corners = self.store.corner_ids().len(),
            walls = self.store.wall_ids().len(),
            "floorplan loaded"
        );
        self.events.emit(FloorplanEvent::RoomsLoaded);
        Ok(())
    }

    /// Empties the plan, emitting a deletion event for every wall and corner.
    fn reset(&mut self) {
        for &wall in self.store.wall_ids() {
            self.events.emit(FloorplanEvent::WallDeleted(wall));
        }
        for &corner in self.store.corner_ids() {
            self.events.emit(FloorplanEvent::CornerDeleted(corner));
        }
        self.store.clear();
        self.floor_textures.clear();
    }
}

fn uid_of(store: &TopologyStore, corner: CornerId) -> Result<String> {
    Ok(store.corner(corner)?.uid.clone())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::tests::square;
    use super::*;
    use crate::error::{FloorgraphError, TopologyError};
    use crate::topology::FixtureMount;

    fn wall_pairs(plan: &Floorplan) -> Vec<(String, String)> {
        let mut pairs: Vec<_> = plan
            .wall_ids()
            .iter()
            .map(|&w| {
                let data = plan.wall(w).unwrap();
                (
                    plan.corner(data.start).unwrap().uid.clone(),
                    plan.corner(data.end).unwrap().uid.clone(),
                )
            })
            .collect();
        pairs.sort();
        pairs
    }

    #[test]
    fn round_trip_preserves_graph_and_textures() {
        let mut plan = Floorplan::new();
        let [a, b, _, _] = square(&mut plan);
        let ab = plan.wall_between(a, b).unwrap().unwrap();
        let brick = WallTexture {
            url: "brick.png".into(),
            stretch: false,
            scale: 120.0,
        };
        plan.set_wall_texture(ab, WallSide::Back, brick.clone()).unwrap();
        let room_uid = plan.room_uid(plan.room_ids()[0]).unwrap();
        plan.set_floor_texture(&room_uid, "oak.png", 300.0);

        let json = plan.to_json().unwrap();
        let mut restored = Floorplan::new();
        restored.load_json(&json).unwrap();

        assert_eq!(restored.corner_ids().len(), 4);
        for &corner in plan.corner_ids() {
            let saved = plan.corner(corner).unwrap();
            let copy = restored
                .store()
                .corner_by_uid(&saved.uid)
                .map(|id| restored.corner(id).unwrap())
                .unwrap();
            assert_eq!(copy.position, saved.position);
        }
        assert_eq!(wall_pairs(&restored), wall_pairs(&plan));

        let restored_ab = restored
            .wall_ids()
            .iter()
            .copied()
            .find(|&w| restored.wall(w).unwrap().uid == plan.wall(ab).unwrap().uid)
            .unwrap();
        assert_eq!(restored.wall(restored_ab).unwrap().back_texture, brick);
        assert_eq!(
            restored.wall(restored_ab).unwrap().front_texture,
            WallTexture::default()
        );

        assert_eq!(restored.room_ids().len(), 1);
        assert_eq!(restored.floor_texture(&room_uid).unwrap().url, "oak.png");
    }

    #[test]
    fn saved_document_uses_expected_keys() {
        let mut plan = Floorplan::new();
        let a = plan.new_corner_with_uid(0.0, 0.0, "a");
        let b = plan.new_corner_with_uid(100.0, 0.0, "b");
        plan.new_wall(a, b).unwrap();

        let value: serde_json::Value = serde_json::from_str(&plan.to_json().unwrap()).unwrap();
        assert_eq!(value["corners"]["a"]["x"], 0.0);
        assert_eq!(value["corners"]["b"]["x"], 100.0);
        assert_eq!(value["walls"][0]["corner1"], "a");
        assert_eq!(value["walls"][0]["corner2"], "b");
        assert_eq!(
            value["walls"][0]["frontTexture"]["url"],
            crate::topology::wall::DEFAULT_WALL_TEXTURE_URL
        );
        assert!(value["wallTextures"].as_array().unwrap().is_empty());
        assert!(value["floorTextures"].as_object().unwrap().is_empty());
        assert!(value["newFloorTextures"].is_object());
    }

    fn corner_uids(plan: &Floorplan) -> Vec<String> {
        plan.corner_ids()
            .iter()
            .map(|&c| plan.corner(c).unwrap().uid.clone())
            .collect()
    }

    #[test]
    fn corner_order_survives_round_trip() {
        let mut plan = Floorplan::new();
        let z = plan.new_corner_with_uid(0.0, 0.0, "zz");
        let a = plan.new_corner_with_uid(300.0, 0.0, "aa");
        let m = plan.new_corner_with_uid(150.0, 200.0, "mm");
        plan.new_wall(z, a).unwrap();
        plan.new_wall(a, m).unwrap();

        let mut restored = Floorplan::new();
        restored.load_json(&plan.to_json().unwrap()).unwrap();
        assert_eq!(corner_uids(&restored), vec!["zz", "aa", "mm"]);
    }

    #[test]
    fn corners_load_in_document_order() {
        let mut plan = Floorplan::new();
        let json = r#"{
            "corners": {"b": {"x": 0, "y": 0}, "c": {"x": 50, "y": 0}, "a": {"x": 100, "y": 0}},
            "walls": []
        }"#;
        plan.load_json(json).unwrap();
        assert_eq!(corner_uids(&plan), vec!["b", "c", "a"]);
    }

    #[test]
    fn ids_from_before_a_load_stay_dead() {
        let mut plan = Floorplan::new();
        let a = plan.new_corner(0.0, 0.0);
        let b = plan.new_corner(100.0, 0.0);
        let wall = plan.new_wall(a, b).unwrap();

        let json = r#"{
            "corners": {"x": {"x": 0, "y": 0}, "y": {"x": 100, "y": 0}},
            "walls": [{"corner1": "x", "corner2": "y"}]
        }"#;
        plan.load_json(json).unwrap();

        assert_eq!(plan.corner_ids().len(), 2);
        assert!(matches!(
            plan.corner(a),
            Err(FloorgraphError::Topology(TopologyError::EntityNotFound(_)))
        ));
        assert!(matches!(
            plan.wall(wall),
            Err(FloorgraphError::Topology(TopologyError::EntityNotFound(_)))
        ));
    }

    #[test]
    fn missing_keys_load_an_empty_plan() {
        let mut plan = Floorplan::new();
        square(&mut plan);

        plan.load_json(r#"{"corners": {"a": {"x": 0, "y": 0}}}"#).unwrap();
        assert!(plan.corner_ids().is_empty());
        assert!(plan.wall_ids().is_empty());
        assert!(plan.room_ids().is_empty());

        plan.load_json("{}").unwrap();
        assert!(plan.corner_ids().is_empty());
    }

    #[test]
    fn unknown_corner_is_an_error() {
        let mut plan = Floorplan::new();
        let json = r#"{
            "corners": {"a": {"x": 0, "y": 0}},
            "walls": [{"corner1": "a", "corner2": "ghost"}]
        }"#;
        let err = plan.load_json(json).unwrap_err();
        assert!(matches!(
            err,
            FloorgraphError::Persist(PersistError::UnknownCorner(ref uid)) if uid == "ghost"
        ));
        assert!(plan.corner_ids().is_empty());
    }

    #[test]
    fn malformed_json_leaves_plan_untouched() {
        let mut plan = Floorplan::new();
        square(&mut plan);
        let err = plan.load_json("{ not json").unwrap_err();
        assert!(matches!(err, FloorgraphError::Persist(PersistError::Json(_))));
        assert_eq!(plan.corner_ids().len(), 4);
    }

    #[test]
    fn self_loop_walls_are_skipped() {
        let mut plan = Floorplan::new();
        let json = r#"{
            "corners": {"a": {"x": 0, "y": 0}, "b": {"x": 100, "y": 0}},
            "walls": [{"corner1": "a", "corner2": "a"}, {"corner1": "a", "corner2": "b"}]
        }"#;
        plan.load_json(json).unwrap();
        assert_eq!(plan.wall_ids().len(), 1);
        assert_eq!(plan.wall(plan.wall_ids()[0]).unwrap().uid, "a,b");
    }

    #[test]
    fn legacy_floor_textures_are_read() {
        let json = r#"{
            "corners": {
                "a": {"x": 0, "y": 0}, "b": {"x": 300, "y": 0}, "c": {"x": 0, "y": 300}
            },
            "walls": [
                {"corner1": "a", "corner2": "b"},
                {"corner1": "b", "corner2": "c"},
                {"corner1": "c", "corner2": "a"}
            ],
            "floorTextures": {
                "a,b,c": {"url": "tiles.png", "scale": 50},
                "x,y,z": {"url": "gone.png", "scale": 50}
            }
        }"#;
        let mut plan = Floorplan::new();
        plan.load_json(json).unwrap();

        assert_eq!(plan.room_ids().len(), 1);
        assert_eq!(plan.floor_texture("a,b,c").unwrap().url, "tiles.png");
        // Textures of rooms that do not exist are dropped on rebuild.
        assert!(plan.floor_texture("x,y,z").is_none());
    }

    #[test]
    fn load_emits_deletions_then_loaded() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let mut plan = Floorplan::new();
        let a = plan.new_corner(0.0, 0.0);
        let b = plan.new_corner(100.0, 0.0);
        let wall = plan.new_wall(a, b).unwrap();
        plan.attach_fixture(wall, crate::topology::FixtureHandle(1), FixtureMount::Wall)
            .unwrap();

        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        plan.subscribe(move |_, event| sink.borrow_mut().push(event.clone()));
        plan.load(&FloorplanDocument::default()).unwrap();

        let events = events.borrow();
        assert_eq!(events[0], FloorplanEvent::WallDeleted(wall));
        assert!(events.contains(&FloorplanEvent::CornerDeleted(a)));
        assert!(events.contains(&FloorplanEvent::CornerDeleted(b)));
        assert_eq!(events.last(), Some(&FloorplanEvent::RoomsUpdated));
    }
}
