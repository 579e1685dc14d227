//! Grid-to-scene compiler
//!
//! Walks the maze grid in row-major order and emits the physics scene:
//! elevated platforms, wall boxes, and movable-block bodies with the
//! joints their variant allows. All coordinates are offset so the robot
//! start cell maps to the world origin. The compiler only describes the
//! scene; it never simulates.

use std::collections::HashSet;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::MazeError;
use crate::grid::{Cell, MazeGrid, MoveVariant};
use crate::scene::{Body, ContactTuning, Geom, Joint, Scene};

/// Build parameters for scene compilation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileConfig {
    /// Wall/platform height as a fraction of one cell
    pub maze_height: f32,
    /// World size of one grid cell
    pub size_scaling: f32,
    /// Reinterpret the robot start cell as a spinnable block
    pub put_spin_near_agent: bool,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            maze_height: 0.5,
            size_scaling: 8.0,
            put_spin_near_agent: false,
        }
    }
}

/// A movable block emitted by the compiler. The environment layer
/// resolves the name against the engine's body table once, at
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovableBlock {
    pub name: String,
    pub variant: MoveVariant,
}

/// Compiler output: the scene plus everything the environment layer
/// needs to interpret it.
#[derive(Debug, Clone)]
pub struct CompiledScene {
    pub scene: Scene,
    /// World position of the robot start cell; subtracted from all
    /// emitted geometry so the agent starts at the origin
    pub origin: Vec2,
    /// Extra z applied to everything standing on elevated platforms
    pub height_offset: f32,
    /// Movable blocks in emission (row-major) order
    pub blocks: Vec<MovableBlock>,
}

/// Compile a maze grid into a physics scene around the given agent
/// model. The agent's root body is its torso; every torso geom must be
/// named, and all geom names in the result must be unique.
pub fn compile(
    grid: &MazeGrid,
    config: &CompileConfig,
    agent: Body,
) -> Result<CompiledScene, MazeError> {
    let scale = config.size_scaling;
    let height = config.maze_height;
    let origin = grid.find_robot(scale)?;
    let elevated = grid.elevated();
    let height_offset = if elevated { height * scale } else { 0.0 };

    let mut agent = agent;
    if elevated {
        // Agent starts on top of the platform layer
        agent.pos.z += height_offset;
    }

    let mut statics = Vec::new();
    let mut bodies = Vec::new();
    let mut blocks = Vec::new();

    for (i, j, cell) in grid.iter() {
        let cell = if cell.is_start() && config.put_spin_near_agent {
            Cell::Block(MoveVariant::SpinXY)
        } else {
            cell
        };
        let center = Vec2::new(j as f32 * scale - origin.x, i as f32 * scale - origin.y);

        if elevated && !cell.is_chasm() {
            statics.push(Geom {
                name: format!("elevated_{i}_{j}"),
                pos: Vec3::new(center.x, center.y, height / 2.0 * scale),
                half_extents: Vec3::new(0.5 * scale, 0.5 * scale, height / 2.0 * scale),
                rgba: [0.9, 0.9, 0.9, 1.0],
                mass: None,
            });
        }

        match cell {
            Cell::Wall => {
                statics.push(Geom {
                    name: format!("block_{i}_{j}"),
                    pos: Vec3::new(center.x, center.y, height_offset + height / 2.0 * scale),
                    half_extents: Vec3::new(0.5 * scale, 0.5 * scale, height / 2.0 * scale),
                    rgba: [
                        i as f32 / grid.rows() as f32,
                        j as f32 / grid.cols() as f32,
                        0.4,
                        1.0,
                    ],
                    mass: None,
                });
            }
            Cell::Block(variant) => {
                bodies.push(build_block(
                    i,
                    j,
                    variant,
                    center,
                    scale,
                    height,
                    height_offset,
                ));
                blocks.push(MovableBlock {
                    name: format!("movable_{i}_{j}"),
                    variant,
                });
            }
            _ => {}
        }
    }

    let contact = if blocks.is_empty() {
        None
    } else {
        Some(ContactTuning::SOFT_BLOCKS)
    };
    let scene = Scene {
        agent,
        statics,
        bodies,
        contact,
    };
    validate_geom_names(&scene)?;

    log::info!(
        "compiled {}x{} maze: {} static geoms, {} movable blocks{}",
        grid.rows(),
        grid.cols(),
        scene.statics.len(),
        blocks.len(),
        if elevated { " (elevated)" } else { "" },
    );

    Ok(CompiledScene {
        scene,
        origin,
        height_offset,
        blocks,
    })
}

fn build_block(
    i: usize,
    j: usize,
    variant: MoveVariant,
    center: Vec2,
    scale: f32,
    height: f32,
    height_offset: f32,
) -> Body {
    let dynamics = variant.dynamics();
    let x_offset = if dynamics.spin { 0.25 * scale } else { 0.0 };

    let mut body = Body::new(
        format!("movable_{i}_{j}"),
        Vec3::new(
            center.x + x_offset,
            center.y,
            height_offset + height / 2.0 * scale * dynamics.height_shrink,
        ),
    );
    body.geoms.push(Geom {
        name: format!("block_{i}_{j}"),
        pos: Vec3::ZERO,
        half_extents: Vec3::new(
            0.5 * scale * dynamics.shrink,
            0.5 * scale * dynamics.shrink,
            height / 2.0 * scale * dynamics.height_shrink,
        ),
        rgba: [0.9, 0.1, 0.1, 1.0],
        mass: Some(dynamics.mass),
    });

    // Fall-capable blocks keep their horizontal travel bounded to one cell
    let xy_range = if dynamics.slide_z {
        Some((-scale, scale))
    } else {
        None
    };
    if dynamics.slide_x {
        body.joints
            .push(Joint::slide(format!("movable_x_{i}_{j}"), Vec3::X, xy_range));
    }
    if dynamics.slide_y {
        body.joints
            .push(Joint::slide(format!("movable_y_{i}_{j}"), Vec3::Y, xy_range));
    }
    if dynamics.slide_z {
        // Blocks may fall below their spawn height but never rise above it
        body.joints.push(Joint::slide(
            format!("movable_z_{i}_{j}"),
            Vec3::Z,
            Some((-height_offset, 0.0)),
        ));
    }
    if dynamics.spin {
        body.joints.push(Joint::ball(format!("spinable_{i}_{j}")));
    }
    body
}

fn validate_geom_names(scene: &Scene) -> Result<(), MazeError> {
    let mut seen = HashSet::new();
    for (body, geom) in scene.geoms() {
        if geom.name.is_empty() {
            return Err(MazeError::UnnamedGeom {
                body: body.to_string(),
            });
        }
        if !seen.insert(geom.name.as_str()) {
            return Err(MazeError::DuplicateGeomName(geom.name.clone()));
        }
    }
    Ok(())
}
