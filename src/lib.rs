pub mod config;
pub mod error;
pub mod events;
pub mod floorplan;
pub mod math;
pub mod operations;
pub mod topology;

pub use config::FloorplanConfig;
pub use error::{FloorgraphError, Result};
pub use floorplan::{Floorplan, FloorplanDocument, FloorplanEvent, MergeOutcome};
