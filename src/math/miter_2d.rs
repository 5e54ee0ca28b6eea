use super::angle_2d::angle_2pi;
use super::{Point2, Vector2, TOLERANCE};

/// Computes the miter (half-angle) offset vector at the joint between two
/// consecutive directed segments.
///
/// The joint is `incoming_end`. The returned vector bisects the angle between
/// the reversed incoming direction and the outgoing direction, scaled so that
/// its perpendicular distance to both segment lines equals `offset`. For two
/// segments continuing straight on, this is the left normal of the outgoing
/// direction times `offset`.
///
/// Joints where either direction has zero length, or where the outgoing
/// segment folds straight back, fall back to a plain left-normal offset.
#[must_use]
pub fn half_angle_vector(
    incoming_start: &Point2,
    incoming_end: &Point2,
    outgoing_start: &Point2,
    outgoing_end: &Point2,
    offset: f64,
) -> Vector2 {
    let back = incoming_start - incoming_end;
    let out = outgoing_end - incoming_end;

    // CCW angle between edges.
    let theta = angle_2pi(&back, &out);
    let cs = (theta / 2.0).cos();
    let sn = (theta / 2.0).sin();

    let dir = outgoing_end - outgoing_start;
    let rotated = Vector2::new(dir.x * cs - dir.y * sn, dir.x * sn + dir.y * cs);
    let mag = rotated.norm();

    if mag < TOLERANCE || sn.abs() < TOLERANCE {
        return fallback_normal(&dir, &(incoming_end - incoming_start), offset);
    }

    rotated * (offset / sn / mag)
}

/// Left normal of the first non-degenerate direction, scaled to `offset`.
fn fallback_normal(primary: &Vector2, secondary: &Vector2, offset: f64) -> Vector2 {
    let dir = if primary.norm() >= TOLERANCE {
        primary
    } else if secondary.norm() >= TOLERANCE {
        secondary
    } else {
        return Vector2::zeros();
    };
    let unit = dir.normalize();
    Vector2::new(-unit.y, unit.x) * offset
}
