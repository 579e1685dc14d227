//! Maze structure grid and layout catalog
//!
//! A maze is a small row-major grid of cell tags. Cell (i, j) maps to
//! world coordinates as `world_x = j * scale - origin_x`,
//! `world_y = i * scale - origin_y`, where the origin is the world
//! position of the robot start cell. Grids are immutable once built.

use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::MazeError;

/// Which slide/spin degrees of freedom a movable block possesses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveVariant {
    SlideX,
    SlideY,
    SlideZ,
    SlideXY,
    SlideXZ,
    SlideYZ,
    SlideXYZ,
    SpinXY,
}

/// Build parameters for one block variant, resolved in a single table
/// instead of branching at every emission site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockDynamics {
    pub slide_x: bool,
    pub slide_y: bool,
    pub slide_z: bool,
    pub spin: bool,
    /// Footprint shrink factor applied to the block geom
    pub shrink: f32,
    /// Height shrink factor applied to the block geom
    pub height_shrink: f32,
    /// Geom mass; fall-capable blocks are heavier so they drop through
    /// platform gaps instead of resting on the rim
    pub mass: f32,
}

impl MoveVariant {
    /// The variant's physical build parameters
    pub fn dynamics(self) -> BlockDynamics {
        use MoveVariant::*;
        let (slide_x, slide_y, slide_z, spin) = match self {
            SlideX => (true, false, false, false),
            SlideY => (false, true, false, false),
            SlideZ => (false, false, true, false),
            SlideXY => (true, true, false, false),
            SlideXZ => (true, false, true, false),
            SlideYZ => (false, true, true, false),
            SlideXYZ => (true, true, true, false),
            SpinXY => (true, true, false, true),
        };
        let (shrink, height_shrink) = if spin {
            (0.1, 0.1)
        } else if slide_z {
            (0.99, 1.0)
        } else {
            (1.0, 1.0)
        };
        let mass = if slide_z { 0.001 } else { 0.0002 };
        BlockDynamics {
            slide_x,
            slide_y,
            slide_z,
            spin,
            shrink,
            height_shrink,
            mass,
        }
    }

    pub fn can_slide_x(self) -> bool {
        self.dynamics().slide_x
    }

    pub fn can_slide_y(self) -> bool {
        self.dynamics().slide_y
    }

    pub fn can_slide_z(self) -> bool {
        self.dynamics().slide_z
    }

    pub fn can_spin(self) -> bool {
        self.dynamics().spin
    }
}

/// One cell of the structural grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    /// Walkable floor
    Open,
    /// Immovable wall block
    Wall,
    /// Drop-off the agent can fall into
    Chasm,
    /// Robot start position
    Start,
    /// Movable block with the given degrees of freedom
    Block(MoveVariant),
}

impl Cell {
    pub fn is_wall(self) -> bool {
        self == Cell::Wall
    }

    pub fn is_chasm(self) -> bool {
        self == Cell::Chasm
    }

    pub fn is_start(self) -> bool {
        self == Cell::Start
    }

    /// The block variant if this cell holds a movable block
    pub fn movable(self) -> Option<MoveVariant> {
        match self {
            Cell::Block(variant) => Some(variant),
            _ => None,
        }
    }
}

/// Immutable 2-D grid of cell tags, indexed (row, column)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MazeGrid {
    cells: Vec<Cell>,
    rows: usize,
    cols: usize,
}

impl MazeGrid {
    /// Build a grid from row vectors. All rows must have equal length.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        assert!(!rows.is_empty(), "maze structure must have at least one row");
        let cols = rows[0].len();
        assert!(cols > 0, "maze structure must have at least one column");
        assert!(
            rows.iter().all(|row| row.len() == cols),
            "maze structure rows must all have the same length"
        );
        let row_count = rows.len();
        let cells = rows.into_iter().flatten().collect();
        Self {
            cells,
            rows: row_count,
            cols,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, i: usize, j: usize) -> Cell {
        self.cells[i * self.cols + j]
    }

    /// Iterate cells in row-major order as (row, col, cell)
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Cell)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, &cell)| (idx / cols, idx % cols, cell))
    }

    /// A grid is elevated when it contains at least one chasm; elevated
    /// grids stand on platforms so the agent can fall off them.
    pub fn elevated(&self) -> bool {
        self.cells.iter().any(|cell| cell.is_chasm())
    }

    pub fn has_movable_blocks(&self) -> bool {
        self.cells.iter().any(|cell| cell.movable().is_some())
    }

    /// World coordinates of the first robot start cell, scaled by the
    /// cell size. Errors when the structure has no start cell.
    pub fn find_robot(&self, scale: f32) -> Result<Vec2, MazeError> {
        self.iter()
            .find(|&(_, _, cell)| cell.is_start())
            .map(|(i, j, _)| Vec2::new(j as f32 * scale, i as f32 * scale))
            .ok_or(MazeError::MissingRobotStart)
    }

    /// World coordinates of every robot start cell, scaled by the cell
    /// size, in row-major order.
    pub fn find_all_robots(&self, scale: f32) -> Vec<Vec2> {
        self.iter()
            .filter(|&(_, _, cell)| cell.is_start())
            .map(|(i, j, _)| Vec2::new(j as f32 * scale, i as f32 * scale))
            .collect()
    }
}

/// Identifier of a predefined maze layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MazeId {
    Maze,
    Push,
    Fall,
    Block,
    BlockMaze,
}

impl MazeId {
    /// The structural grid for this layout. Pure and deterministic.
    pub fn structure(self) -> MazeGrid {
        use Cell::{Open as O, Start as R, Wall as W};
        let rows = match self {
            MazeId::Maze => vec![
                vec![W, W, W, W, W],
                vec![W, R, O, O, W],
                vec![W, W, W, O, W],
                vec![W, O, O, O, W],
                vec![W, W, W, W, W],
            ],
            MazeId::Push => vec![
                vec![W, W, W, W, W],
                vec![W, O, R, W, W],
                vec![W, O, Cell::Block(MoveVariant::SlideXY), O, W],
                vec![W, W, O, W, W],
                vec![W, W, W, W, W],
            ],
            MazeId::Fall => vec![
                vec![W, W, W, W],
                vec![W, R, O, W],
                vec![W, O, Cell::Block(MoveVariant::SlideYZ), W],
                vec![W, Cell::Chasm, Cell::Chasm, W],
                vec![W, O, O, W],
                vec![W, W, W, W],
            ],
            MazeId::Block => vec![
                vec![W, W, W, W, W],
                vec![W, R, O, O, W],
                vec![W, O, O, O, W],
                vec![W, O, O, O, W],
                vec![W, W, W, W, W],
            ],
            MazeId::BlockMaze => vec![
                vec![W, W, W, W],
                vec![W, R, O, W],
                vec![W, W, O, W],
                vec![W, O, O, W],
                vec![W, W, W, W],
            ],
        };
        MazeGrid::from_rows(rows)
    }
}

impl fmt::Display for MazeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MazeId::Maze => "Maze",
            MazeId::Push => "Push",
            MazeId::Fall => "Fall",
            MazeId::Block => "Block",
            MazeId::BlockMaze => "BlockMaze",
        };
        f.write_str(name)
    }
}

impl FromStr for MazeId {
    type Err = MazeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Maze" => Ok(MazeId::Maze),
            "Push" => Ok(MazeId::Push),
            "Fall" => Ok(MazeId::Fall),
            "Block" => Ok(MazeId::Block),
            "BlockMaze" => Ok(MazeId::BlockMaze),
            other => Err(MazeError::UnknownMazeId(other.to_string())),
        }
    }
}
