//! Environment-level errors

use meiro_scene::MazeError;
use thiserror::Error;

/// Fatal construction failures. The environment is unusable after any
/// of these; there is no retry policy.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error(transparent)]
    Maze(#[from] MazeError),

    /// Scene document could not be serialized
    #[error("failed to serialize scene document")]
    SceneEncode(#[from] ron::Error),

    /// Scene file could not be written
    #[error("failed to write scene file")]
    SceneWrite(#[from] std::io::Error),

    /// The engine loader refused the compiled scene
    #[error("physics engine rejected the compiled scene")]
    Engine(#[source] anyhow::Error),

    /// A compiled body name is missing from the engine's body table
    #[error("compiled scene body '{0}' missing from engine body table")]
    MissingBody(String),

    /// No agent model was supplied to the builder
    #[error("no agent model supplied")]
    AgentModelMissing,
}
