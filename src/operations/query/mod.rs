mod dimensions;
mod overlap;

pub use dimensions::{Aabb2, Dimensions};
pub use overlap::{OverlappedCorner, OverlappedWall};
