//! Tolerances and wall defaults for a floorplan.

use serde::{Deserialize, Serialize};

/// Distance under which a moved corner merges into another corner or wall.
pub const DEFAULT_CORNER_TOLERANCE: f64 = 20.0;

/// Default pick radius for corner/wall hit tests.
pub const DEFAULT_OVERLAP_TOLERANCE: f64 = 10.0;

/// Thickness given to new walls.
pub const DEFAULT_WALL_THICKNESS: f64 = 10.0;

/// Height given to new walls.
pub const DEFAULT_WALL_HEIGHT: f64 = 250.0;

/// Floorplan configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorplanConfig {
    /// Merge distance for corner moves
    pub corner_tolerance: f64,
    /// Hit-test radius used when none is given
    pub overlap_tolerance: f64,
    /// Thickness of newly created walls
    pub wall_thickness: f64,
    /// Height of newly created walls
    pub wall_height: f64,
}

impl Default for FloorplanConfig {
    fn default() -> Self {
        Self {
            corner_tolerance: DEFAULT_CORNER_TOLERANCE,
            overlap_tolerance: DEFAULT_OVERLAP_TOLERANCE,
            wall_thickness: DEFAULT_WALL_THICKNESS,
            wall_height: DEFAULT_WALL_HEIGHT,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FloorplanConfig::default();
        assert_eq!(config.corner_tolerance, DEFAULT_CORNER_TOLERANCE);
        assert_eq!(config.wall_thickness, DEFAULT_WALL_THICKNESS);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: FloorplanConfig = serde_json::from_str(r#"{"wall_thickness": 24.0}"#).unwrap();
        assert_eq!(config.wall_thickness, 24.0);
        assert_eq!(config.wall_height, DEFAULT_WALL_HEIGHT);
        assert_eq!(config.overlap_tolerance, DEFAULT_OVERLAP_TOLERANCE);
    }
}
