use super::Point2;

/// Computes the signed area of a polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Returns `true` if the closed polygon winds clockwise.
///
/// Uses the edge sum `Σ(x2 − x1)(y2 + y1)`; zero-area polygons count as
/// clockwise.
#[must_use]
pub fn is_clockwise(points: &[Point2]) -> bool {
    let n = points.len();
    let mut sum = 0.0;
    for i in 0..n {
        let c1 = points[i];
        let c2 = points[(i + 1) % n];
        sum += (c2.x - c1.x) * (c2.y + c1.y);
    }
    sum >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::TOLERANCE;

    fn ccw_square() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn signed_area_ccw_square() {
        let area = signed_area_2d(&ccw_square());
        assert!((area - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_cw_square() {
        let mut pts = ccw_square();
        pts.reverse();
        let area = signed_area_2d(&pts);
        assert!((area + 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_degenerate() {
        assert!((signed_area_2d(&[Point2::new(0.0, 0.0)])).abs() < TOLERANCE);
        assert!((signed_area_2d(&[])).abs() < TOLERANCE);
    }

    #[test]
    fn winding_matches_area_sign() {
        let mut pts = ccw_square();
        assert!(!is_clockwise(&pts));
        pts.reverse();
        assert!(is_clockwise(&pts));
    }

    #[test]
    fn winding_independent_of_negative_coordinates() {
        let pts = vec![
            Point2::new(-500.0, -500.0),
            Point2::new(-100.0, -500.0),
            Point2::new(-100.0, -100.0),
        ];
        assert!(!is_clockwise(&pts));
    }

    #[test]
    fn collinear_counts_as_clockwise() {
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        ];
        assert!(is_clockwise(&pts));
    }
}
