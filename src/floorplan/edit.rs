//! Corner and wall edit commands.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{OperationError, Result};
use crate::math::distance_2d::{closest_point_on_segment, point_to_segment_dist};
use crate::math::Point2;
use crate::topology::{CornerId, WallId};

use super::{Floorplan, FloorplanEvent, WallEnd};

/// What a corner move ended up doing to the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Nothing within tolerance; the corner just moved.
    None,
    /// The moved corner absorbed `absorbed`, which no longer exists.
    Combined { absorbed: CornerId },
    /// The moved corner snapped onto `wall`, which now ends at the corner;
    /// `remainder` runs from the corner to the wall's former end.
    ///
    /// If the corner was already joined to either end of `wall`, the
    /// duplicate is pruned and `wall` or `remainder` may no longer exist.
    SplitWall { wall: WallId, remainder: WallId },
}

/// Which coordinates an axis snap changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisSnap {
    pub x: bool,
    pub y: bool,
}

impl AxisSnap {
    #[must_use]
    pub fn any(self) -> bool {
        self.x || self.y
    }
}

impl Floorplan {
    /// Moves a corner, then merges it with a nearby corner or wall.
    ///
    /// # Errors
    ///
    /// Returns an error if the corner is not live.
    pub fn move_corner(&mut self, corner: CornerId, x: f64, y: f64) -> Result<MergeOutcome> {
        let result = self.move_corner_inner(corner, x, y);
        self.finish(result)
    }

    /// Moves a corner by an offset, then merges as [`Floorplan::move_corner`] does.
    ///
    /// # Errors
    ///
    /// Returns an error if the corner is not live.
    pub fn relative_move_corner(&mut self, corner: CornerId, dx: f64, dy: f64) -> Result<MergeOutcome> {
        let result = self.relative_move_corner_inner(corner, dx, dy);
        self.finish(result)
    }

    fn relative_move_corner_inner(&mut self, corner: CornerId, dx: f64, dy: f64) -> Result<MergeOutcome> {
        let position = self.store.corner(corner)?.position;
        self.move_corner_inner(corner, position.x + dx, position.y + dy)
    }

    fn move_corner_inner(&mut self, corner: CornerId, x: f64, y: f64) -> Result<MergeOutcome> {
        self.store.corner_mut(corner)?.position = Point2::new(x, y);
        let outcome = self.merge_inner(corner)?;

        // A combine keeps this corner, so it is still live here.
        if let Ok(data) = self.store.corner(corner) {
            let position = data.position;
            self.events
                .emit(FloorplanEvent::CornerMoved { corner, position });
            for wall in self.store.walls_of(corner)? {
                self.events.emit(FloorplanEvent::WallMoved(wall));
            }
        }
        Ok(outcome)
    }

    /// Merges a corner into the first other corner within tolerance, or failing
    /// that splits the first wall within tolerance at the corner.
    ///
    /// Corners are tried before walls; candidates are tried in list order.
    ///
    /// # Errors
    ///
    /// Returns an error if the corner is not live.
    pub fn merge_with_intersected(&mut self, corner: CornerId) -> Result<MergeOutcome> {
        let result = self.merge_inner(corner);
        self.finish(result)
    }

    fn merge_inner(&mut self, corner: CornerId) -> Result<MergeOutcome> {
        let tolerance = self.config.corner_tolerance;
        let here = self.store.corner(corner)?.position;

        let mut target = None;
        for &other in self.store.corner_ids() {
            if other != corner && nalgebra::distance(&self.store.corner(other)?.position, &here) < tolerance {
                target = Some(other);
                break;
            }
        }
        if let Some(other) = target {
            self.combine_inner(corner, other)?;
            return Ok(MergeOutcome::Combined { absorbed: other });
        }

        let mut hit = None;
        let attached = self.store.corner(corner)?;
        for &wall in self.store.wall_ids() {
            if attached.is_attached(wall) {
                continue;
            }
            let data = self.store.wall(wall)?;
            let start = self.store.corner(data.start)?.position;
            let end = self.store.corner(data.end)?.position;
            if point_to_segment_dist(&here, &start, &end) < tolerance {
                hit = Some((wall, data.end, closest_point_on_segment(&here, &start, &end)));
                break;
            }
        }
        let Some((wall, old_end, snapped)) = hit else {
            return Ok(MergeOutcome::None);
        };

        self.store.corner_mut(corner)?.position = snapped;
        let remainder = self.insert_wall(corner, old_end)?;
        self.reattach(wall, corner, WallEnd::End)?;
        self.prune_duplicate_walls(corner)?;
        self.update_inner()?;
        debug!(?corner, ?wall, ?remainder, "corner split wall");
        Ok(MergeOutcome::SplitWall { wall, remainder })
    }

    /// Absorbs `other` into `corner`: `corner` moves onto `other`, takes over
    /// its walls, and `other` is deleted. Duplicate and zero-length walls that
    /// result are pruned, then the plan is rebuilt.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if the corners are the same, or
    /// an error if either is not live.
    pub fn combine_with_corner(&mut self, corner: CornerId, other: CornerId) -> Result<()> {
        let result = if corner == other {
            Err(OperationError::InvalidInput("cannot combine a corner with itself".to_owned()).into())
        } else {
            self.combine_inner(corner, other)
        };
        self.finish(result)
    }

    fn combine_inner(&mut self, corner: CornerId, other: CornerId) -> Result<()> {
        self.store.corner(corner)?;
        let absorbed = self.store.corner(other)?;
        let position = absorbed.position;
        let starts = absorbed.wall_starts.clone();
        let ends = absorbed.wall_ends.clone();

        self.store.corner_mut(corner)?.position = position;
        for wall in starts {
            self.reattach(wall, corner, WallEnd::Start)?;
        }
        for wall in ends {
            self.reattach(wall, corner, WallEnd::End)?;
        }
        // Reattaching the last wall already deleted it unless it had none.
        self.delete_corner(other);

        self.prune_duplicate_walls(corner)?;
        self.update_inner()?;
        debug!(?corner, ?other, "corners combined");
        Ok(())
    }

    /// Removes zero-length walls at a corner and walls that duplicate an
    /// earlier wall to the same neighbour, then rebuilds.
    ///
    /// Walls are scanned starts first, then ends, in attachment order; the
    /// first wall to reach a given neighbour is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the corner is not live.
    pub fn remove_duplicate_walls(&mut self, corner: CornerId) -> Result<()> {
        let result = self
            .prune_duplicate_walls(corner)
            .and_then(|_| self.update_inner());
        self.finish(result)
    }

    /// Returns the number of walls removed.
    pub(crate) fn prune_duplicate_walls(&mut self, corner: CornerId) -> Result<usize> {
        let mut seen: HashSet<CornerId> = HashSet::new();
        let mut removed = 0;
        for wall in self.store.walls_of(corner)? {
            if !self.store.contains_corner(corner) {
                break;
            }
            // A zero-length wall is listed twice and may already be gone.
            let Ok(data) = self.store.wall(wall) else {
                continue;
            };
            let duplicate = match data.opposite_corner(corner) {
                _ if data.start == data.end => true,
                Some(opposite) => !seen.insert(opposite),
                None => false,
            };
            if duplicate {
                self.detach_wall(wall)?;
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(?corner, removed, "pruned duplicate walls");
        }
        Ok(removed)
    }

    /// Aligns a corner with its neighbours: each coordinate within `tolerance`
    /// of a neighbour's is set equal to it. Does not merge or rebuild.
    ///
    /// # Errors
    ///
    /// Returns an error if the corner is not live.
    pub fn snap_corner_to_axis(&mut self, corner: CornerId, tolerance: f64) -> Result<AxisSnap> {
        let mut snap = AxisSnap::default();
        for neighbour in self.store.adjacent_corners(corner)? {
            let target = self.store.corner(neighbour)?.position;
            let data = self.store.corner_mut(corner)?;
            if (data.position.x - target.x).abs() < tolerance {
                data.position.x = target.x;
                snap.x = true;
            }
            if (data.position.y - target.y).abs() < tolerance {
                data.position.y = target.y;
                snap.y = true;
            }
        }
        Ok(snap)
    }

    /// Snaps both endpoints of a wall to their neighbours' axes.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall or its corners are not live.
    pub fn snap_wall_to_axis(&mut self, wall: WallId, tolerance: f64) -> Result<(AxisSnap, AxisSnap)> {
        let data = self.store.wall(wall)?;
        let (start, end) = (data.start, data.end);
        Ok((
            self.snap_corner_to_axis(start, tolerance)?,
            self.snap_corner_to_axis(end, tolerance)?,
        ))
    }

    /// Translates both endpoints of a wall, merging each as it lands.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall is not live.
    pub fn relative_move_wall(&mut self, wall: WallId, dx: f64, dy: f64) -> Result<()> {
        let result = self.relative_move_wall_inner(wall, dx, dy);
        self.finish(result)
    }

    fn relative_move_wall_inner(&mut self, wall: WallId, dx: f64, dy: f64) -> Result<()> {
        let data = self.store.wall(wall)?;
        let (start, end) = (data.start, data.end);
        self.relative_move_corner_inner(start, dx, dy)?;
        // The first move may have absorbed or deleted the far corner.
        if self.store.contains_corner(end) {
            self.relative_move_corner_inner(end, dx, dy)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::super::tests::square;
    use super::*;
    use crate::math::polygon_2d::is_clockwise;

    const TOL: f64 = 1e-9;

    #[test]
    fn moving_onto_a_corner_combines() {
        let mut plan = Floorplan::new();
        let a = plan.new_corner(0.0, 0.0);
        let b = plan.new_corner(300.0, 0.0);
        plan.new_wall(a, b).unwrap();
        let c = plan.new_corner(500.0, 500.0);

        let outcome = plan.move_corner(c, 5.0, 0.0).unwrap();
        assert_eq!(outcome, MergeOutcome::Combined { absorbed: a });
        assert_eq!(plan.corner_ids(), &[b, c]);
        assert_eq!(plan.corner(c).unwrap().position, Point2::new(0.0, 0.0));

        let wall = plan.wall_ids()[0];
        assert!(plan.wall(wall).unwrap().connects(c, b));
    }

    #[test]
    fn corner_near_wall_splits_it() {
        let mut plan = Floorplan::new();
        let a = plan.new_corner(0.0, 0.0);
        let b = plan.new_corner(400.0, 0.0);
        let ab = plan.new_wall(a, b).unwrap();
        let c = plan.new_corner(200.0, 300.0);

        let outcome = plan.move_corner(c, 200.0, 5.0).unwrap();
        let MergeOutcome::SplitWall { wall, remainder } = outcome else {
            panic!("expected a split, got {outcome:?}");
        };
        assert_eq!(wall, ab);
        assert_eq!(plan.corner(c).unwrap().position, Point2::new(200.0, 0.0));

        let first = plan.wall(wall).unwrap();
        assert_eq!((first.start, first.end), (a, c));
        let second = plan.wall(remainder).unwrap();
        assert_eq!((second.start, second.end), (c, b));
        assert_eq!(plan.wall_ids().len(), 2);
    }

    #[test]
    fn split_onto_a_wall_already_joined_prunes_duplicate() {
        let mut plan = Floorplan::new();
        let a = plan.new_corner(0.0, 0.0);
        let b = plan.new_corner(400.0, 0.0);
        let c = plan.new_corner(200.0, 300.0);
        let ab = plan.new_wall(a, b).unwrap();
        let ac = plan.new_wall(a, c).unwrap();

        let outcome = plan.move_corner(c, 200.0, 5.0).unwrap();
        assert!(matches!(outcome, MergeOutcome::SplitWall { wall, .. } if wall == ab));
        plan.update().unwrap();

        let joining: Vec<WallId> = plan
            .wall_ids()
            .iter()
            .copied()
            .filter(|&w| plan.wall(w).unwrap().connects(a, c))
            .collect();
        assert_eq!(joining, vec![ac]);
        assert!(plan.wall(ab).is_err());
        assert_eq!(plan.wall_ids().len(), 2);
        assert!(plan.wall_between(c, b).unwrap().is_some());
    }

    #[test]
    fn splits_that_close_a_partition_add_a_room() {
        // An inner wall dragged onto both long sides of a rectangle.
        let mut plan = Floorplan::new();
        let a = plan.new_corner(0.0, 0.0);
        let b = plan.new_corner(800.0, 0.0);
        let c = plan.new_corner(800.0, 400.0);
        let d = plan.new_corner(0.0, 400.0);
        for (start, end) in [(a, b), (b, c), (c, d), (d, a)] {
            plan.new_wall(start, end).unwrap();
        }
        assert_eq!(plan.room_ids().len(), 1);

        let e = plan.new_corner(400.0, 100.0);
        let f = plan.new_corner(400.0, 300.0);
        plan.new_wall(e, f).unwrap();

        let top = plan.move_corner(f, 400.0, 395.0).unwrap();
        assert!(matches!(top, MergeOutcome::SplitWall { .. }));
        let bottom = plan.move_corner(e, 400.0, 5.0).unwrap();
        assert!(matches!(bottom, MergeOutcome::SplitWall { .. }));

        assert_eq!(plan.wall_ids().len(), 7);
        assert_eq!(plan.room_ids().len(), 2);
        for &room in plan.room_ids() {
            let corners = &plan.room(room).unwrap().corners;
            assert_eq!(corners.len(), 4);
            assert!(corners.contains(&e) && corners.contains(&f));
        }
    }

    #[test]
    fn far_move_leaves_graph_alone() {
        let mut plan = Floorplan::new();
        let [a, _, _, _] = square(&mut plan);
        let outcome = plan.move_corner(a, -50.0, -50.0).unwrap();
        assert_eq!(outcome, MergeOutcome::None);
        assert_eq!(plan.corner_ids().len(), 4);
        assert_eq!(plan.wall_ids().len(), 4);
    }

    #[test]
    fn merging_neighbours_removes_the_shared_wall() {
        // Collapsing one side of a square leaves a triangle.
        let mut plan = Floorplan::new();
        let [a, b, _, _] = square(&mut plan);

        let outcome = plan.move_corner(b, 0.0, 10.0).unwrap();
        assert_eq!(outcome, MergeOutcome::Combined { absorbed: a });
        assert_eq!(plan.corner_ids().len(), 3);
        assert_eq!(plan.wall_ids().len(), 3);
        for &wall in plan.wall_ids() {
            let data = plan.wall(wall).unwrap();
            assert_ne!(data.start, data.end);
        }
        assert_eq!(plan.room_ids().len(), 1);
    }

    #[test]
    fn combine_prunes_parallel_walls() {
        // a-b and d-c side by side; merging c into a and d into b leaves one wall.
        let mut plan = Floorplan::new();
        let a = plan.new_corner(0.0, 0.0);
        let b = plan.new_corner(300.0, 0.0);
        let c = plan.new_corner(0.0, 100.0);
        let d = plan.new_corner(300.0, 100.0);
        plan.new_wall(a, b).unwrap();
        let dc = plan.new_wall(d, c).unwrap();

        plan.combine_with_corner(a, c).unwrap();
        assert_eq!(plan.wall_ids().len(), 2);
        plan.combine_with_corner(b, d).unwrap();

        // At b the inherited wall is now a start, so it is scanned first and kept.
        assert_eq!(plan.wall_ids(), &[dc]);
        assert_eq!(plan.corner_ids(), &[a, b]);
        let kept = plan.wall(dc).unwrap();
        assert_eq!((kept.start, kept.end), (b, a));
        assert!(kept.orphan);
        assert_eq!(plan.corner(b).unwrap().position, Point2::new(300.0, 100.0));
    }

    #[test]
    fn combine_with_self_is_rejected() {
        let mut plan = Floorplan::new();
        let a = plan.new_corner(0.0, 0.0);
        assert!(plan.combine_with_corner(a, a).is_err());
        assert!(plan.corner(a).is_ok());
    }

    #[test]
    fn remove_duplicate_walls_keeps_first() {
        let mut plan = Floorplan::new();
        let a = plan.new_corner(0.0, 0.0);
        let b = plan.new_corner(300.0, 0.0);
        let c = plan.new_corner(300.0, 100.0);
        let ab = plan.new_wall(a, b).unwrap();
        let cb = plan.new_wall(c, b).unwrap();
        // Re-point c-b onto a by hand, producing a second a-b wall.
        plan.set_wall_start(cb, a).unwrap();
        assert!(plan.corner(c).is_err());
        assert_eq!(plan.wall_ids().len(), 2);

        plan.remove_duplicate_walls(a).unwrap();
        assert_eq!(plan.wall_ids(), &[ab]);
    }

    #[test]
    fn relative_moves_translate() {
        let mut plan = Floorplan::new();
        let a = plan.new_corner(0.0, 0.0);
        let b = plan.new_corner(300.0, 0.0);
        let wall = plan.new_wall(a, b).unwrap();

        plan.relative_move_corner(a, 0.0, -100.0).unwrap();
        assert_eq!(plan.corner(a).unwrap().position, Point2::new(0.0, -100.0));

        plan.relative_move_wall(wall, 50.0, 50.0).unwrap();
        assert_eq!(plan.corner(a).unwrap().position, Point2::new(50.0, -50.0));
        assert_eq!(plan.corner(b).unwrap().position, Point2::new(350.0, 50.0));
    }

    #[test]
    fn moved_room_keeps_orientation_after_update() {
        let mut plan = Floorplan::new();
        let [_, _, c, _] = square(&mut plan);
        plan.move_corner(c, 600.0, 500.0).unwrap();
        plan.update().unwrap();

        let room = plan.room(plan.room_ids()[0]).unwrap();
        assert!(!is_clockwise(&room.interior_corners));
        assert!(room.interior_corners.iter().any(|p| p.x > 400.0));
    }

    #[test]
    fn snap_to_axis() {
        let mut plan = Floorplan::new();
        let a = plan.new_corner(0.0, 0.0);
        let b = plan.new_corner(3.0, 200.0);
        let wall = plan.new_wall(a, b).unwrap();

        let (start, end) = plan.snap_wall_to_axis(wall, 5.0).unwrap();
        assert_eq!(start, AxisSnap { x: true, y: false });
        // Already aligned coordinates still count as snapped.
        assert_eq!(end, AxisSnap { x: true, y: false });
        assert!((plan.corner(a).unwrap().position.x - 3.0).abs() < TOL);
        assert!((plan.corner(b).unwrap().position.x - 3.0).abs() < TOL);

        let snap = plan.snap_corner_to_axis(b, 1.0).unwrap();
        assert!(snap.any());
        assert!(!plan.snap_corner_to_axis(b, 0.0).unwrap().any());
    }

    #[test]
    fn move_reports_final_position() {
        let mut plan = Floorplan::new();
        let a = plan.new_corner(0.0, 0.0);
        let b = plan.new_corner(400.0, 0.0);
        let ab = plan.new_wall(a, b).unwrap();
        let c = plan.new_corner(200.0, 300.0);

        let moves = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&moves);
        plan.subscribe(move |_, event| {
            if let FloorplanEvent::CornerMoved { corner, position } = event {
                sink.borrow_mut().push((*corner, *position));
            }
        });
        plan.move_corner(c, 200.0, 5.0).unwrap();
        assert_eq!(*moves.borrow(), vec![(c, Point2::new(200.0, 0.0))]);
        assert!(plan.wall(ab).is_ok());
    }
}
