//! Egocentric range sensors
//!
//! Rays fan out from the agent's heading and are intersected against the
//! outlines of wall cells, chasm cells, and any movable block sharing
//! the agent's vertical band. The segment list is rebuilt on every call
//! because blocks move; nothing here is cached.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use meiro_scene::{Cell, MazeGrid};

/// Determinant cutoff below which a ray and segment count as parallel
const DET_TOLERANCE: f32 = 1e-7;

/// What a ray can hit. The discriminant doubles as the reading channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Wall = 0,
    Chasm = 1,
    Block = 2,
}

/// Sensor parameters. `sensor_range` is in world units: the environment
/// scales the configured cell-relative range by the cell size before
/// building this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Number of rays
    pub n_bins: usize,
    /// Maximum perception distance
    pub sensor_range: f32,
    /// Field of view in radians, centered on the agent heading
    pub sensor_span: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            n_bins: 0,
            sensor_range: 3.0,
            sensor_span: std::f32::consts::TAU,
        }
    }
}

/// One obstacle outline edge
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
    pub kind: SegmentKind,
}

/// Push the four boundary segments of an axis-aligned cell footprint
fn cell_outline(center: Vec2, half: f32, kind: SegmentKind, out: &mut Vec<Segment>) {
    let (x1, x2) = (center.x - half, center.x + half);
    let (y1, y2) = (center.y - half, center.y + half);
    let corners = [
        Vec2::new(x1, y1),
        Vec2::new(x2, y1),
        Vec2::new(x2, y2),
        Vec2::new(x1, y2),
    ];
    for k in 0..4 {
        out.push(Segment {
            a: corners[k],
            b: corners[(k + 1) % 4],
            kind,
        });
    }
}

/// Obstacle outlines visible this step: every wall and chasm cell, plus
/// movable blocks whose z-extent overlaps the agent's z. Blocks outside
/// that band (fallen into a chasm, say) cast no segments.
pub fn collect_segments(
    grid: &MazeGrid,
    origin: Vec2,
    size_scaling: f32,
    maze_height: f32,
    block_positions: &[Vec3],
    robot_z: f32,
) -> Vec<Segment> {
    let mut segments = Vec::new();
    let half = 0.5 * size_scaling;

    for (i, j, cell) in grid.iter() {
        let kind = match cell {
            Cell::Wall => SegmentKind::Wall,
            Cell::Chasm => SegmentKind::Chasm,
            _ => continue,
        };
        let center = Vec2::new(
            j as f32 * size_scaling - origin.x,
            i as f32 * size_scaling - origin.y,
        );
        cell_outline(center, half, kind, &mut segments);
    }

    let half_height = maze_height * size_scaling / 2.0;
    for pos in block_positions {
        if pos.z + half_height >= robot_z && robot_z >= pos.z - half_height {
            cell_outline(Vec2::new(pos.x, pos.y), half, SegmentKind::Block, &mut segments);
        }
    }
    segments
}

/// Heading of ray `k` of `n`, fanned evenly across `span` centered on
/// the agent heading `ori`.
pub fn ray_angle(ori: f32, span: f32, k: usize, n: usize) -> f32 {
    ori - span * 0.5 + (2 * k + 1) as f32 / (2 * n) as f32 * span
}

/// Intersection of the ray from `origin` at angle `theta` with the
/// segment `a`-`b`, if any.
pub fn ray_segment_intersect(origin: Vec2, theta: f32, a: Vec2, b: Vec2) -> Option<Vec2> {
    let dir = Vec2::from_angle(theta);
    let edge = b - a;
    let det = dir.y * edge.x - dir.x * edge.y;
    if det.abs() < DET_TOLERANCE {
        return None;
    }
    let rel = a - origin;
    let r = (edge.x * rel.y - edge.y * rel.x) / det;
    let s = (dir.x * rel.y - dir.y * rel.x) / det;
    if r >= 0.0 && (0.0..=1.0).contains(&s) {
        Some(origin + dir * r)
    } else {
        None
    }
}

/// N×3 reading matrix: per ray, the proximity strength of the nearest
/// in-range obstacle in the channel of its kind. Rays that hit nothing
/// within range leave all three channels at zero. Equidistant hits
/// resolve to the earliest segment in list order.
pub fn range_sensor_obs(
    config: &SensorConfig,
    position: Vec2,
    ori: f32,
    segments: &[Segment],
) -> Vec<[f32; 3]> {
    let mut readings = vec![[0.0f32; 3]; config.n_bins];
    for (k, reading) in readings.iter_mut().enumerate() {
        let theta = ray_angle(ori, config.sensor_span, k, config.n_bins);
        let mut nearest: Option<(f32, SegmentKind)> = None;
        for segment in segments {
            if let Some(hit) = ray_segment_intersect(position, theta, segment.a, segment.b) {
                let distance = position.distance(hit);
                if nearest.map_or(true, |(best, _)| distance < best) {
                    nearest = Some((distance, segment.kind));
                }
            }
        }
        if let Some((distance, kind)) = nearest {
            if distance <= config.sensor_range {
                reading[kind as usize] = (config.sensor_range - distance) / config.sensor_range;
            }
        }
    }
    readings
}
