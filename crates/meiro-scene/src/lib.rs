//! Maze structures and scene compilation for Meiro
//!
//! This crate is the data layer for maze environments:
//! - Maze layouts and the structural grid (`MazeId`, `Cell`, `MazeGrid`)
//! - Movable-block variants and their build-parameter table (`MoveVariant`)
//! - The scene document consumed by the physics engine (`scene` module)
//! - The grid-to-scene compiler (`compile`)

mod compiler;
mod error;
mod grid;
pub mod scene;

pub use compiler::{compile, CompileConfig, CompiledScene, MovableBlock};
pub use error::MazeError;
pub use grid::{BlockDynamics, Cell, MazeGrid, MazeId, MoveVariant};
