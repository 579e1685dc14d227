//! Integration tests for the maze environment
//!
//! These drive `MazeEnv` end to end against a scripted engine double
//! that loads the compiled scene document the same way a real solver
//! would, so construction, observation composition and the collision
//! and reset contracts are all exercised through the public surface.

use std::path::Path;

use glam::{Vec2, Vec3};

use meiro_env::{BodyHandle, BoxSpace, EngineStep, EnvError, MazeEnv, MazeEnvConfig, PhysicsEngine, RenderMode};
use meiro_scene::scene::{Body, Geom, Scene};
use meiro_scene::{Cell, MazeGrid, MazeId};

/// Scripted engine: bodies come from the parsed scene document, the
/// agent drifts by a fixed offset per step, and the underlying task
/// always reports done so the wrapper's done-override is visible.
struct ScriptedEngine {
    bodies: Vec<(String, Vec3)>,
    position: Vec2,
    orientation: f32,
    proprio: Vec<f32>,
    reward: f32,
    drift: Vec2,
    steps: u32,
}

impl ScriptedEngine {
    fn from_scene(scene: &Scene, drift: Vec2) -> Self {
        let mut bodies = vec![(scene.agent.name.clone(), scene.agent.pos)];
        for body in &scene.bodies {
            bodies.push((body.name.clone(), body.pos));
        }
        Self {
            bodies,
            position: Vec2::ZERO,
            orientation: 0.0,
            proprio: vec![0.5, 1.5, 2.5, 3.5, 4.5, 5.5, 6.5],
            reward: 1.25,
            drift,
            steps: 0,
        }
    }

    fn load(path: &Path, drift: Vec2) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let scene: Scene = ron::from_str(&text)?;
        Ok(Self::from_scene(&scene, drift))
    }
}

impl PhysicsEngine for ScriptedEngine {
    type Info = u32;

    fn step(&mut self, _action: &[f32]) -> EngineStep<u32> {
        self.position += self.drift;
        self.steps += 1;
        EngineStep {
            reward: self.reward,
            done: true,
            info: self.steps,
        }
    }

    fn reset(&mut self) {
        self.position = Vec2::ZERO;
        self.steps = 0;
    }

    fn lookup_body(&self, name: &str) -> Option<BodyHandle> {
        self.bodies
            .iter()
            .position(|(n, _)| n == name)
            .map(|idx| BodyHandle(idx as u32))
    }

    fn body_position(&self, body: BodyHandle) -> Vec3 {
        let (_, pos) = &self.bodies[body.0 as usize];
        if body.0 == 0 {
            // The agent torso tracks the current planar position
            Vec3::new(self.position.x, self.position.y, pos.z)
        } else {
            *pos
        }
    }

    fn orientation(&self) -> f32 {
        self.orientation
    }

    fn position_xy(&self) -> Vec2 {
        self.position
    }

    fn set_position_xy(&mut self, xy: Vec2) {
        self.position = xy;
    }

    fn observe(&self) -> Vec<f32> {
        self.proprio.clone()
    }

    fn action_space(&self) -> BoxSpace {
        BoxSpace::uniform(8, -1.0, 1.0)
    }

    fn render(&mut self, _mode: RenderMode, width: u32, height: u32) -> Vec<u8> {
        vec![0; (width * height * 3) as usize]
    }
}

fn test_agent() -> Body {
    let mut agent = Body::new("torso", Vec3::new(0.0, 0.0, 0.75));
    agent.geoms.push(Geom {
        name: "torso_geom".to_string(),
        pos: Vec3::ZERO,
        half_extents: Vec3::splat(0.25),
        rgba: [0.8, 0.6, 0.4, 1.0],
        mass: Some(1.0),
    });
    agent
}

fn build(config: MazeEnvConfig, drift: Vec2) -> MazeEnv<ScriptedEngine> {
    MazeEnv::build(config, Some(test_agent()), |path| {
        ScriptedEngine::load(path, drift)
    })
    .unwrap()
}

#[test]
fn test_build_hands_parseable_scene_to_loader() {
    let mut statics = 0;
    let env = MazeEnv::build(MazeEnvConfig::default(), Some(test_agent()), |path| {
        let text = std::fs::read_to_string(path)?;
        let scene: Scene = ron::from_str(&text)?;
        statics = scene.statics.len();
        Ok(ScriptedEngine::from_scene(&scene, Vec2::ZERO))
    })
    .unwrap();

    // The Maze layout compiles to 18 wall boxes
    assert_eq!(statics, 18);
    assert_eq!(env.movable_blocks().count(), 0);
    assert_eq!(env.action_space().len(), 8);
}

#[test]
fn test_missing_agent_model_is_fatal() {
    let result = MazeEnv::<ScriptedEngine>::build(MazeEnvConfig::default(), None, |path| {
        ScriptedEngine::load(path, Vec2::ZERO)
    });
    assert!(matches!(result, Err(EnvError::AgentModelMissing)));
}

#[test]
fn test_unknown_body_name_is_fatal() {
    let result = MazeEnv::build(MazeEnvConfig::default(), Some(test_agent()), |_path| {
        // An engine with an empty body table cannot resolve the torso
        Ok(ScriptedEngine {
            bodies: Vec::new(),
            position: Vec2::ZERO,
            orientation: 0.0,
            proprio: vec![0.0; 7],
            reward: 0.0,
            drift: Vec2::ZERO,
            steps: 0,
        })
    });
    assert!(matches!(result, Err(EnvError::MissingBody(ref name)) if name == "torso"));
}

#[test]
fn test_minimal_observation_is_proprio_plus_counter() {
    let mut env = build(MazeEnvConfig::default(), Vec2::ZERO);
    let obs = env.reset();

    // No view, no blocks, no rays: proprioception plus the counter
    assert_eq!(obs.len(), 7 + 1);
    assert_eq!(env.observation_space().len(), obs.len());
    assert_eq!(obs[..7], [0.5, 1.5, 2.5, 3.5, 4.5, 5.5, 6.5]);
    assert_eq!(obs[7], 0.0);
}

#[test]
fn test_observation_layout_with_all_segments() {
    let config = MazeEnvConfig {
        maze_id: MazeId::Push,
        top_down_view: true,
        observe_blocks: true,
        n_bins: 4,
        ..MazeEnvConfig::default()
    };
    let mut env = build(config, Vec2::ZERO);

    // view 5*5*3 + proprio head 3 + one block xyz + proprio tail 4
    // + 4 rays * 3 channels + step counter
    let expected = 75 + 3 + 3 + 4 + 12 + 1;
    assert_eq!(env.observation_space().len(), expected);

    let obs = env.reset();
    assert_eq!(obs.len(), expected);

    // Proprioception head, then the block's world position. The Push
    // block sits one cell below the start, at (0, 8, 2).
    assert_eq!(obs[75..78], [0.5, 1.5, 2.5]);
    assert_eq!(obs[78..81], [0.0, 8.0, 2.0]);
    assert_eq!(obs[81..85], [3.5, 4.5, 5.5, 6.5]);

    // Every ray sees something inside the ring wall
    let readings = &obs[85..97];
    for ray in readings.chunks(3) {
        assert!(ray.iter().any(|&v| v > 0.0), "ray read nothing: {ray:?}");
        assert!(ray.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }
}

#[test]
fn test_step_counter_scales_by_a_thousandth() {
    let mut env = build(MazeEnvConfig::default(), Vec2::ZERO);
    env.reset();
    for _ in 0..3 {
        env.step(&[0.0; 8]);
    }
    let step = env.step(&[0.0; 8]);
    assert_eq!(step.observation[7], 4.0 * 0.001);
    assert_eq!(env.elapsed_steps(), 4);
}

#[test]
fn test_done_forced_false_with_passthrough() {
    let mut env = build(MazeEnvConfig::default(), Vec2::ZERO);
    env.reset();
    let step = env.step(&[0.0; 8]);

    // The engine reported done and a reward; only done is overridden
    assert!(!step.done);
    assert_eq!(step.reward, 1.25);
    assert_eq!(step.info, 1);
}

#[test]
fn test_manual_collision_rolls_position_back() {
    let config = MazeEnvConfig {
        manual_collision: true,
        ..MazeEnvConfig::default()
    };
    // Drifting a full cell toward the top ring wall lands inside it
    let mut env = build(config, Vec2::new(0.0, -8.0));
    env.reset();
    let step = env.step(&[0.0; 8]);

    assert_eq!(env.engine().position_xy(), Vec2::ZERO);
    assert!(!step.done);
    assert_eq!(env.trajectory(), &[Vec2::ZERO]);
}

#[test]
fn test_collision_free_step_keeps_engine_position() {
    let config = MazeEnvConfig {
        manual_collision: true,
        ..MazeEnvConfig::default()
    };
    let mut env = build(config, Vec2::new(1.0, 0.0));
    env.reset();
    env.step(&[0.0; 8]);

    assert_eq!(env.engine().position_xy(), Vec2::new(1.0, 0.0));
    assert_eq!(env.trajectory(), &[Vec2::new(1.0, 0.0)]);
}

#[test]
fn test_reset_clears_counter_and_trajectory() {
    let mut env = build(MazeEnvConfig::default(), Vec2::new(1.0, 0.0));
    env.reset();
    env.step(&[0.0; 8]);
    env.step(&[0.0; 8]);
    assert_eq!(env.trajectory().len(), 2);

    let obs = env.reset();
    assert_eq!(env.elapsed_steps(), 0);
    assert!(env.trajectory().is_empty());
    assert_eq!(obs[7], 0.0);
}

#[test]
fn test_multi_start_reset_is_roughly_uniform() {
    use Cell::{Open as O, Start as R, Wall as W};
    let grid = MazeGrid::from_rows(vec![
        vec![W, W, W, W, W],
        vec![W, R, O, R, W],
        vec![W, W, W, W, W],
    ]);
    let mut env = MazeEnv::from_grid(
        grid,
        MazeEnvConfig { seed: 7, ..MazeEnvConfig::default() },
        Some(test_agent()),
        |path| ScriptedEngine::load(path, Vec2::ZERO),
    )
    .unwrap();

    // Starts are at the origin and two cells to its right
    let mut at_origin = 0;
    let mut at_offset = 0;
    for _ in 0..400 {
        env.reset();
        match env.engine().position_xy() {
            p if p == Vec2::ZERO => at_origin += 1,
            p if p == Vec2::new(16.0, 0.0) => at_offset += 1,
            p => panic!("reset to unexpected position {p:?}"),
        }
    }
    assert_eq!(at_origin + at_offset, 400);
    assert!(at_origin > 140, "origin start underrepresented: {at_origin}");
    assert!(at_offset > 140, "offset start underrepresented: {at_offset}");
}

#[test]
fn test_single_start_reset_leaves_engine_placement() {
    let mut env = build(MazeEnvConfig::default(), Vec2::new(3.0, 0.0));
    env.step(&[0.0; 8]);
    env.reset();
    // One start cell: the engine's own reset placement stands
    assert_eq!(env.engine().position_xy(), Vec2::ZERO);
}

#[test]
fn test_render_delegates_to_engine() {
    let mut env = build(MazeEnvConfig::default(), Vec2::ZERO);
    let frame = env.render(RenderMode::RgbArray, 16, 8);
    assert_eq!(frame.len(), 16 * 8 * 3);
}
