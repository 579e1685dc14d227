//! Maze environment layer for Meiro
//!
//! Wraps a physics engine behind the [`PhysicsEngine`] trait and layers
//! the maze semantics on top: egocentric range sensors, the top-down
//! occupancy view, manual collision rollback, and multi-start resets.

mod engine;
mod error;
mod maze_env;
pub mod sensors;
mod spaces;
mod view;

pub use engine::{BodyHandle, EngineStep, PhysicsEngine, RenderMode};
pub use error::EnvError;
pub use maze_env::{MazeEnv, MazeEnvConfig, Step};
pub use sensors::{SegmentKind, SensorConfig};
pub use spaces::BoxSpace;
pub use view::TopDownView;
