use thiserror::Error;

/// Top-level error type for the floorgraph engine.
#[derive(Debug, Error)]
pub enum FloorgraphError {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Errors raised when the corner/wall graph or its derived rooms are inconsistent.
///
/// These indicate a bug in an edit or rebuild sequence rather than bad user input.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(&'static str),

    #[error("corner still has {0} attached wall(s)")]
    CornerInUse(usize),

    #[error("room corners {from} and {to} are not connected by a wall")]
    DisconnectedRoomCorners { from: String, to: String },

    #[error("wall has no {0} half-edge; call update() after mutating the graph")]
    MissingHalfEdge(&'static str),
}

/// Errors related to edit commands.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors related to loading and saving floorplan documents.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("wall references unknown corner {0:?}")]
    UnknownCorner(String),

    #[error("malformed floorplan document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for results using [`FloorgraphError`].
pub type Result<T> = std::result::Result<T, FloorgraphError>;
