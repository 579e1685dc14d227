//! Error types for maze construction and scene compilation

use thiserror::Error;

/// Fatal configuration failures. None of these are recoverable: the
/// environment cannot be built from a structure that violates them.
#[derive(Debug, Error)]
pub enum MazeError {
    /// The maze identifier does not name a known layout
    #[error("unrecognized maze id: {0}")]
    UnknownMazeId(String),

    /// The structural grid contains no robot start cell
    #[error("no robot start cell in maze structure")]
    MissingRobotStart,

    /// A geom was emitted without a name
    #[error("unnamed geom on body '{body}'")]
    UnnamedGeom { body: String },

    /// Two geoms in the compiled scene share a name
    #[error("duplicate geom name in compiled scene: {0}")]
    DuplicateGeomName(String),
}
