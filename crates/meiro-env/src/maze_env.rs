//! Maze environment
//!
//! Owns one physics engine for its lifetime and layers the maze
//! semantics on top: scene compilation and loading at construction,
//! observation composition, manual collision rollback and multi-start
//! resets. Step and reset run to completion; engine failures during
//! simulation propagate to the caller uncaught.

use std::io::Write;
use std::path::Path;

use glam::{Vec2, Vec3};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use meiro_scene::scene::Body;
use meiro_scene::{compile, CompileConfig, MazeGrid, MazeId, MovableBlock};

use crate::engine::{BodyHandle, PhysicsEngine, RenderMode};
use crate::error::EnvError;
use crate::sensors::{self, SensorConfig};
use crate::spaces::BoxSpace;
use crate::view::TopDownView;

/// Environment construction parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MazeEnvConfig {
    /// Which predefined layout to build
    pub maze_id: MazeId,
    /// Wall/platform height as a fraction of one cell
    pub maze_height: f32,
    /// World size of one grid cell
    pub size_scaling: f32,
    /// Number of range-sensor rays
    pub n_bins: usize,
    /// Sensor range in cells; scaled by `size_scaling` at construction
    pub sensor_range: f32,
    /// Sensor field of view in radians
    pub sensor_span: f32,
    /// Splice movable-block positions into the observation
    pub observe_blocks: bool,
    /// Reinterpret the robot start cell as a spinnable block
    pub put_spin_near_agent: bool,
    /// Prepend the flattened top-down view to the observation
    pub top_down_view: bool,
    /// Side length of the top-down view in pixels
    pub view_size: usize,
    /// Detect wall collisions here and roll the position back, instead
    /// of relying on the engine's contact response
    pub manual_collision: bool,
    /// Seed for the start-position RNG
    pub seed: u64,
}

impl Default for MazeEnvConfig {
    fn default() -> Self {
        Self {
            maze_id: MazeId::Maze,
            maze_height: 0.5,
            size_scaling: 8.0,
            n_bins: 0,
            sensor_range: 3.0,
            sensor_span: std::f32::consts::TAU,
            observe_blocks: false,
            put_spin_near_agent: false,
            top_down_view: false,
            view_size: 5,
            manual_collision: false,
            seed: 0,
        }
    }
}

/// Outcome of one environment step. Reward and info pass through from
/// the engine unmodified; `done` is always false at this layer, which
/// defines no episode-termination policy of its own.
#[derive(Debug, Clone)]
pub struct Step<I> {
    pub observation: Vec<f32>,
    pub reward: f32,
    pub done: bool,
    pub info: I,
}

/// A maze task wrapped around a physics engine
pub struct MazeEnv<E: PhysicsEngine> {
    config: MazeEnvConfig,
    engine: E,
    grid: MazeGrid,
    /// World position of the robot start cell; all scene geometry was
    /// offset by it at compile time
    origin: Vec2,
    torso: BodyHandle,
    blocks: Vec<(MovableBlock, BodyHandle)>,
    /// Start offsets relative to the origin, for multi-start resets
    init_positions: Vec<Vec2>,
    sensor: SensorConfig,
    view: TopDownView,
    observation_space: BoxSpace,
    rng: Xoshiro256PlusPlus,
    /// Steps taken since the last reset
    t: u64,
    /// Post-step agent positions since the last reset
    trajectory: Vec<Vec2>,
}

impl<E: PhysicsEngine> MazeEnv<E> {
    /// Build the environment for the configured layout. The scene is
    /// compiled around `agent`, written to a temporary file, and handed
    /// to `loader` to construct the engine; the file is discarded once
    /// the engine holds the scene.
    pub fn build<F>(config: MazeEnvConfig, agent: Option<Body>, loader: F) -> Result<Self, EnvError>
    where
        F: FnOnce(&Path) -> anyhow::Result<E>,
    {
        let grid = config.maze_id.structure();
        Self::from_grid(grid, config, agent, loader)
    }

    /// Build the environment from an explicit structural grid
    pub fn from_grid<F>(
        grid: MazeGrid,
        config: MazeEnvConfig,
        agent: Option<Body>,
        loader: F,
    ) -> Result<Self, EnvError>
    where
        F: FnOnce(&Path) -> anyhow::Result<E>,
    {
        let agent = agent.ok_or(EnvError::AgentModelMissing)?;
        let compiled = compile(
            &grid,
            &CompileConfig {
                maze_height: config.maze_height,
                size_scaling: config.size_scaling,
                put_spin_near_agent: config.put_spin_near_agent,
            },
            agent,
        )?;

        let document = ron::ser::to_string_pretty(&compiled.scene, ron::ser::PrettyConfig::default())?;
        let mut scene_file = tempfile::NamedTempFile::new()?;
        scene_file.write_all(document.as_bytes())?;
        scene_file.flush()?;
        let engine = loader(scene_file.path()).map_err(EnvError::Engine)?;

        let torso = engine
            .lookup_body(&compiled.scene.agent.name)
            .ok_or_else(|| EnvError::MissingBody(compiled.scene.agent.name.clone()))?;
        let mut blocks = Vec::with_capacity(compiled.blocks.len());
        for block in compiled.blocks {
            let handle = engine
                .lookup_body(&block.name)
                .ok_or_else(|| EnvError::MissingBody(block.name.clone()))?;
            blocks.push((block, handle));
        }

        let init_positions: Vec<Vec2> = grid
            .find_all_robots(config.size_scaling)
            .into_iter()
            .map(|p| p - compiled.origin)
            .collect();

        let sensor = SensorConfig {
            n_bins: config.n_bins,
            sensor_range: config.sensor_range * config.size_scaling,
            sensor_span: config.sensor_span,
        };

        let mut env = Self {
            engine,
            grid,
            origin: compiled.origin,
            torso,
            blocks,
            init_positions,
            sensor,
            view: TopDownView::new(config.view_size),
            observation_space: BoxSpace::unbounded(0),
            rng: Xoshiro256PlusPlus::seed_from_u64(config.seed),
            t: 0,
            trajectory: Vec::new(),
            config,
        };

        // Probe one observation to fix the space shape for the
        // lifetime of the environment
        let probe = env.compose_observation();
        env.observation_space = BoxSpace::unbounded(probe.len());

        log::info!(
            "maze environment ready: {} ({} starts, {} blocks, {} observation values)",
            env.config.maze_id,
            env.init_positions.len(),
            env.blocks.len(),
            probe.len(),
        );
        Ok(env)
    }

    /// Advance the simulation by one action. Under manual collision
    /// mode, a step whose resulting position lands inside a wall cell
    /// is rolled back to the pre-step position; the engine's velocities
    /// are left as computed.
    pub fn step(&mut self, action: &[f32]) -> Step<E::Info> {
        self.t += 1;

        let result = if self.config.manual_collision {
            let old_pos = self.engine.position_xy();
            let result = self.engine.step(action);
            let new_pos = self.engine.position_xy();
            if self.in_collision(new_pos) {
                log::debug!("wall collision at ({:.2}, {:.2}), rolling back", new_pos.x, new_pos.y);
                self.engine.set_position_xy(old_pos);
            }
            result
        } else {
            self.engine.step(action)
        };

        self.trajectory.push(self.engine.position_xy());
        let observation = self.compose_observation();

        // Episode termination is the task layer's call, never the
        // engine's: done is unconditionally false here
        Step {
            observation,
            reward: result.reward,
            done: false,
            info: result.info,
        }
    }

    /// Restore the initial state and return the first observation. With
    /// several start cells, one is chosen uniformly at random.
    pub fn reset(&mut self) -> Vec<f32> {
        self.t = 0;
        self.trajectory.clear();
        self.engine.reset();
        if self.init_positions.len() > 1 {
            if let Some(&start) = self.init_positions.choose(&mut self.rng) {
                self.engine.set_position_xy(start);
            }
        }
        self.compose_observation()
    }

    /// Assemble the observation vector: optional top-down view, the
    /// proprioceptive readout with optional block positions spliced in
    /// after its first three components, flattened sensor readings, and
    /// the scaled step counter. The order is fixed; the composed length
    /// always matches the probed observation space.
    fn compose_observation(&mut self) -> Vec<f32> {
        let proprio = self.engine.observe();
        let robot_xy = self.engine.position_xy();
        let robot_z = self.engine.body_position(self.torso).z;
        let ori = self.engine.orientation();
        let block_positions: Vec<Vec3> = self
            .blocks
            .iter()
            .map(|&(_, handle)| self.engine.body_position(handle))
            .collect();

        let mut obs = Vec::new();

        if self.config.top_down_view {
            let block_xy: Vec<Vec2> = block_positions.iter().map(|p| p.truncate()).collect();
            self.view.render(
                robot_xy,
                &self.grid,
                self.origin,
                self.config.size_scaling,
                &block_xy,
            );
            obs.extend_from_slice(self.view.data());
        }

        let (head, tail) = proprio.split_at(proprio.len().min(3));
        obs.extend_from_slice(head);
        if self.config.observe_blocks {
            for pos in &block_positions {
                obs.extend_from_slice(&pos.to_array());
            }
        }
        obs.extend_from_slice(tail);

        let segments = sensors::collect_segments(
            &self.grid,
            self.origin,
            self.config.size_scaling,
            self.config.maze_height,
            &block_positions,
            robot_z,
        );
        for reading in sensors::range_sensor_obs(&self.sensor, robot_xy, ori, &segments) {
            obs.extend_from_slice(&reading);
        }

        obs.push(self.t as f32 * 0.001);
        obs
    }

    /// Whether `pos` lies inside any wall cell's footprint
    fn in_collision(&self, pos: Vec2) -> bool {
        let scale = self.config.size_scaling;
        self.grid.iter().any(|(i, j, cell)| {
            if !cell.is_wall() {
                return false;
            }
            let min_x = j as f32 * scale - 0.5 * scale - self.origin.x;
            let max_x = j as f32 * scale + 0.5 * scale - self.origin.x;
            let min_y = i as f32 * scale - 0.5 * scale - self.origin.y;
            let max_y = i as f32 * scale + 0.5 * scale - self.origin.y;
            (min_x..=max_x).contains(&pos.x) && (min_y..=max_y).contains(&pos.y)
        })
    }

    /// Render through to the engine
    pub fn render(&mut self, mode: RenderMode, width: u32, height: u32) -> Vec<u8> {
        self.engine.render(mode, width, height)
    }

    pub fn observation_space(&self) -> &BoxSpace {
        &self.observation_space
    }

    pub fn action_space(&self) -> BoxSpace {
        self.engine.action_space()
    }

    pub fn config(&self) -> &MazeEnvConfig {
        &self.config
    }

    /// Movable blocks in compiler (row-major) order
    pub fn movable_blocks(&self) -> impl Iterator<Item = &MovableBlock> {
        self.blocks.iter().map(|(block, _)| block)
    }

    /// Steps taken since the last reset
    pub fn elapsed_steps(&self) -> u64 {
        self.t
    }

    /// Post-step agent positions since the last reset
    pub fn trajectory(&self) -> &[Vec2] {
        &self.trajectory
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}
