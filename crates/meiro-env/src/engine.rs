//! Physics-engine collaborator seam
//!
//! The environment never talks to a concrete solver; it reaches the
//! loaded scene through this trait. One engine instance is exclusively
//! owned by one environment for its lifetime. Failures inside the
//! engine are the engine's to surface; this layer does not catch them.

use glam::{Vec2, Vec3};

use crate::spaces::BoxSpace;

/// Typed index into the engine's body table, resolved once at
/// environment construction and reused every step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub u32);

/// Outcome of one engine step. `info` carries engine-defined
/// diagnostics and is passed through to the caller untouched.
#[derive(Debug, Clone)]
pub struct EngineStep<I> {
    pub reward: f32,
    pub done: bool,
    pub info: I,
}

/// Rendering target requested from the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Human,
    RgbArray,
}

/// Access to a loaded physics scene
pub trait PhysicsEngine {
    /// Engine-defined per-step diagnostics
    type Info;

    /// Advance the simulation by one action
    fn step(&mut self, action: &[f32]) -> EngineStep<Self::Info>;

    /// Restore the initial simulation state
    fn reset(&mut self);

    /// Resolve a body name from the compiled scene into a handle
    fn lookup_body(&self, name: &str) -> Option<BodyHandle>;

    /// Current world position of a body's center of mass
    fn body_position(&self, body: BodyHandle) -> Vec3;

    /// Agent heading in radians
    fn orientation(&self) -> f32;

    /// Agent (x, y)
    fn position_xy(&self) -> Vec2;

    /// Force-set the agent (x, y); velocities are left untouched
    fn set_position_xy(&mut self, xy: Vec2);

    /// Proprioceptive observation vector
    fn observe(&self) -> Vec<f32>;

    /// Bounds of the engine's action vector
    fn action_space(&self) -> BoxSpace;

    /// Render a frame; pixel layout is engine-defined
    fn render(&mut self, mode: RenderMode, width: u32, height: u32) -> Vec<u8>;
}
