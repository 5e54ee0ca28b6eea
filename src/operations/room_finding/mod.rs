mod dedup;
mod trace;

pub use dedup::remove_duplicate_cycles;
pub use trace::{find_tightest_cycle, sort_by_turn};

use crate::error::TopologyError;
use crate::math::polygon_2d::is_clockwise;
use crate::math::Point2;
use crate::topology::{CornerId, TopologyStore};

/// Finds the rooms of the wall graph: its minimal bounded faces.
///
/// For every corner and each of its neighbours, walks the tightest cycle
/// through that edge. The union of walks is deduplicated by rotation and
/// clockwise cycles (the unbounded outside face, or loops traced from the
/// outside) are dropped. The result lists each room as a counter-clockwise
/// corner cycle.
#[derive(Debug)]
pub struct FindRooms {
    corners: Vec<CornerId>,
}

impl FindRooms {
    /// Creates a room-finding pass over the given corners.
    #[must_use]
    pub fn new(corners: Vec<CornerId>) -> Self {
        Self { corners }
    }

    /// Creates a room-finding pass over every corner in the store, in list order.
    #[must_use]
    pub fn all(store: &TopologyStore) -> Self {
        Self::new(store.corner_ids().to_vec())
    }

    /// Executes the search.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph references a missing corner or wall.
    pub fn execute(&self, store: &TopologyStore) -> Result<Vec<Vec<CornerId>>, TopologyError> {
        let mut loops: Vec<Vec<CornerId>> = Vec::new();
        for &first in &self.corners {
            for second in store.adjacent_corners(first)? {
                loops.push(find_tightest_cycle(store, first, second)?);
            }
        }

        let unique = remove_duplicate_cycles(loops);

        let mut rooms = Vec::with_capacity(unique.len());
        for cycle in unique {
            let points = cycle
                .iter()
                .map(|&c| store.corner(c).map(|d| d.position))
                .collect::<Result<Vec<Point2>, _>>()?;
            if !is_clockwise(&points) {
                rooms.push(cycle);
            }
        }

        tracing::trace!(rooms = rooms.len(), "room finding done");
        Ok(rooms)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::{CornerData, WallData};

    fn corner(store: &mut TopologyStore, x: f64, y: f64) -> CornerId {
        let uid = format!("{x},{y}");
        store.add_corner(CornerData::new(uid, Point2::new(x, y)))
    }

    fn wall(store: &mut TopologyStore, a: CornerId, b: CornerId) {
        let id = store.add_wall(WallData::new(String::new(), a, b, 10.0, 250.0));
        store.corner_mut(a).unwrap().wall_starts.push(id);
        store.corner_mut(b).unwrap().wall_ends.push(id);
    }

    fn positions(store: &TopologyStore, cycle: &[CornerId]) -> Vec<Point2> {
        cycle.iter().map(|&c| store.corner(c).unwrap().position).collect()
    }

    #[test]
    fn square_gives_one_ccw_room() {
        let mut store = TopologyStore::new();
        let a = corner(&mut store, 0.0, 0.0);
        let b = corner(&mut store, 0.0, 400.0);
        let c = corner(&mut store, 400.0, 400.0);
        let d = corner(&mut store, 400.0, 0.0);
        wall(&mut store, a, b);
        wall(&mut store, b, c);
        wall(&mut store, c, d);
        wall(&mut store, d, a);

        let rooms = FindRooms::all(&store).execute(&store).unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].len(), 4);
        assert!(!is_clockwise(&positions(&store, &rooms[0])));
    }

    #[test]
    fn divided_rectangle_gives_two_rooms() {
        // 800 x 400 rectangle split by a wall at x = 400.
        let mut store = TopologyStore::new();
        let a = corner(&mut store, 0.0, 0.0);
        let m0 = corner(&mut store, 400.0, 0.0);
        let b = corner(&mut store, 800.0, 0.0);
        let c = corner(&mut store, 800.0, 400.0);
        let m1 = corner(&mut store, 400.0, 400.0);
        let d = corner(&mut store, 0.0, 400.0);
        wall(&mut store, a, m0);
        wall(&mut store, m0, b);
        wall(&mut store, b, c);
        wall(&mut store, c, m1);
        wall(&mut store, m1, d);
        wall(&mut store, d, a);
        wall(&mut store, m0, m1);

        let rooms = FindRooms::all(&store).execute(&store).unwrap();
        assert_eq!(rooms.len(), 2, "rooms={rooms:?}");
        for room in &rooms {
            assert_eq!(room.len(), 4);
            assert!(room.contains(&m0) && room.contains(&m1));
            assert!(!is_clockwise(&positions(&store, room)));
        }
    }

    #[test]
    fn dangling_wall_adds_no_room() {
        let mut store = TopologyStore::new();
        let a = corner(&mut store, 0.0, 0.0);
        let b = corner(&mut store, 300.0, 0.0);
        let c = corner(&mut store, 0.0, 300.0);
        let spur = corner(&mut store, -200.0, -200.0);
        wall(&mut store, a, b);
        wall(&mut store, b, c);
        wall(&mut store, c, a);
        wall(&mut store, a, spur);

        let rooms = FindRooms::all(&store).execute(&store).unwrap();
        assert_eq!(rooms.len(), 1);
        assert!(!rooms[0].contains(&spur));
    }

    #[test]
    fn disconnected_loops_found_independently() {
        let mut store = TopologyStore::new();
        for offset in [0.0, 1000.0] {
            let a = corner(&mut store, offset, 0.0);
            let b = corner(&mut store, offset + 300.0, 0.0);
            let c = corner(&mut store, offset + 300.0, 300.0);
            let d = corner(&mut store, offset, 300.0);
            wall(&mut store, a, b);
            wall(&mut store, b, c);
            wall(&mut store, c, d);
            wall(&mut store, d, a);
        }
        let rooms = FindRooms::all(&store).execute(&store).unwrap();
        assert_eq!(rooms.len(), 2);
    }

    #[test]
    fn loops_sharing_a_corner() {
        // Two triangles touching at the origin.
        let mut store = TopologyStore::new();
        let o = corner(&mut store, 0.0, 0.0);
        let a = corner(&mut store, 300.0, 0.0);
        let b = corner(&mut store, 300.0, 300.0);
        let c = corner(&mut store, -300.0, 0.0);
        let d = corner(&mut store, -300.0, -300.0);
        wall(&mut store, o, a);
        wall(&mut store, a, b);
        wall(&mut store, b, o);
        wall(&mut store, o, c);
        wall(&mut store, c, d);
        wall(&mut store, d, o);

        let rooms = FindRooms::all(&store).execute(&store).unwrap();
        assert_eq!(rooms.len(), 2, "rooms={rooms:?}");
        assert!(rooms.iter().all(|r| r.len() == 3 && r.contains(&o)));
    }

    #[test]
    fn repeat_runs_are_identical() {
        let mut store = TopologyStore::new();
        let a = corner(&mut store, 0.0, 0.0);
        let b = corner(&mut store, 500.0, 0.0);
        let c = corner(&mut store, 250.0, 400.0);
        wall(&mut store, a, b);
        wall(&mut store, b, c);
        wall(&mut store, c, a);

        let first = FindRooms::all(&store).execute(&store).unwrap();
        let second = FindRooms::all(&store).execute(&store).unwrap();
        assert_eq!(first, second);
    }
}
