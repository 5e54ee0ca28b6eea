use std::f64::consts::PI;

use super::Vector2;

/// Signed angle swept clockwise from `a` to `b`, in `(-pi, pi]`.
///
/// Positive when `b` lies clockwise of `a`.
#[must_use]
pub fn angle(a: &Vector2, b: &Vector2) -> f64 {
    let dot = a.x * b.x + a.y * b.y;
    let det = a.x * b.y - a.y * b.x;
    -det.atan2(dot)
}

/// Same as [`angle`], shifted into `[0, 2pi)`.
#[must_use]
pub fn angle_2pi(a: &Vector2, b: &Vector2) -> f64 {
    let theta = angle(a, b);
    if theta < 0.0 {
        theta + 2.0 * PI
    } else {
        theta
    }
}
