//! Scene document consumed by the physics engine
//!
//! A typed, serializable description of static geometry, dynamic bodies
//! and their joints. The compiler produces one scene per environment;
//! it is serialized once, handed to the engine, and never mutated
//! afterwards.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Box geometry attached to the world or to a body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geom {
    pub name: String,
    /// Center position: world coordinates for static geometry,
    /// body-local otherwise
    pub pos: Vec3,
    pub half_extents: Vec3,
    pub rgba: [f32; 4],
    /// None for static geometry
    pub mass: Option<f32>,
}

/// Degrees of freedom granted to a body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum JointKind {
    /// Translation along `axis`, optionally range-limited
    Slide {
        axis: Vec3,
        range: Option<(f32, f32)>,
    },
    /// Free rotation
    Ball,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Joint {
    pub name: String,
    pub kind: JointKind,
    pub damping: f32,
    pub armature: f32,
    pub margin: f32,
}

impl Joint {
    /// Slide joint with the build constants shared by all maze joints
    pub fn slide(name: impl Into<String>, axis: Vec3, range: Option<(f32, f32)>) -> Self {
        Self {
            name: name.into(),
            kind: JointKind::Slide { axis, range },
            damping: 0.0,
            armature: 0.0,
            margin: 0.01,
        }
    }

    /// Unlimited rotational joint
    pub fn ball(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: JointKind::Ball,
            damping: 0.0,
            armature: 0.0,
            margin: 0.0,
        }
    }
}

/// A dynamic body: geometry, joints and child bodies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub name: String,
    pub pos: Vec3,
    pub geoms: Vec<Geom>,
    pub joints: Vec<Joint>,
    pub children: Vec<Body>,
}

impl Body {
    pub fn new(name: impl Into<String>, pos: Vec3) -> Self {
        Self {
            name: name.into(),
            pos,
            geoms: Vec::new(),
            joints: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// Contact-solver softening applied when movable blocks are present, so
/// light blocks register contacts reliably.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactTuning {
    pub impedance: [f32; 3],
}

impl ContactTuning {
    pub const SOFT_BLOCKS: ContactTuning = ContactTuning {
        impedance: [0.995, 0.995, 0.01],
    };
}

/// Complete scene description: the agent model, static maze geometry and
/// the movable-block bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub agent: Body,
    pub statics: Vec<Geom>,
    pub bodies: Vec<Body>,
    pub contact: Option<ContactTuning>,
}

impl Scene {
    /// Every geom in the scene paired with the name of the body carrying
    /// it. Static geometry is reported under the world body.
    pub fn geoms(&self) -> Vec<(&str, &Geom)> {
        fn walk<'a>(body: &'a Body, out: &mut Vec<(&'a str, &'a Geom)>) {
            for geom in &body.geoms {
                out.push((body.name.as_str(), geom));
            }
            for child in &body.children {
                walk(child, out);
            }
        }

        let mut out = Vec::new();
        for geom in &self.statics {
            out.push(("world", geom));
        }
        walk(&self.agent, &mut out);
        for body in &self.bodies {
            walk(body, &mut out);
        }
        out
    }
}
