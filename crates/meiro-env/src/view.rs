//! Top-down occupancy view
//!
//! A small egocentric grid centered on the agent with one channel per
//! obstacle kind. The buffer is overwritten on every render; drawn
//! points spread their unit of coverage over a 3x3 pixel neighborhood
//! by fractional row/column overlap, so a point sitting between pixels
//! contributes partially to each.

use glam::Vec2;

use meiro_scene::{Cell, MazeGrid};

use crate::sensors::SegmentKind;

/// Fixed-shape `size x size x 3` occupancy buffer
#[derive(Debug, Clone)]
pub struct TopDownView {
    size: usize,
    data: Vec<f32>,
}

impl TopDownView {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            data: vec![0.0; size * size * 3],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of values, as contributed to the observation vector
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flattened buffer in (row, col, channel) order
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn get(&self, row: usize, col: usize, kind: SegmentKind) -> f32 {
        self.data[(row * self.size + col) * 3 + kind as usize]
    }

    fn add(&mut self, row: isize, col: isize, kind: SegmentKind, coverage: f32) {
        if row < 0 || col < 0 || row as usize >= self.size || col as usize >= self.size {
            return;
        }
        self.data[(row as usize * self.size + col as usize) * 3 + kind as usize] += coverage;
    }

    /// Splat one drawn point, given robot-relative world coordinates.
    /// Coverage is split across the pixel under the point and its eight
    /// neighbors by how much of a unit square centered on the point
    /// overlaps each.
    fn splat(&mut self, rel: Vec2, size_scaling: f32, kind: SegmentKind) {
        let half = (self.size / 2) as f32;
        let row_f = half + (rel.y + size_scaling / 2.0) / size_scaling;
        let col_f = half + (rel.x + size_scaling / 2.0) / size_scaling;

        let (row, row_frac) = (row_f as isize, row_f.rem_euclid(1.0));
        let (col, col_frac) = (col_f as isize, col_f.rem_euclid(1.0));

        let row_span = (row_frac + 0.5).min(1.0) - (row_frac - 0.5).max(0.0);
        let row_below = (0.5 - row_frac).max(0.0);
        let row_above = (row_frac - 0.5).max(0.0);
        let col_span = (col_frac + 0.5).min(1.0) - (col_frac - 0.5).max(0.0);
        let col_left = (0.5 - col_frac).max(0.0);
        let col_right = (col_frac - 0.5).max(0.0);

        self.add(row, col, kind, row_span * col_span);
        self.add(row - 1, col, kind, row_below * col_span);
        self.add(row + 1, col, kind, row_above * col_span);
        self.add(row, col - 1, kind, row_span * col_left);
        self.add(row, col + 1, kind, row_span * col_right);
        self.add(row - 1, col - 1, kind, row_below * col_left);
        self.add(row - 1, col + 1, kind, row_below * col_right);
        self.add(row + 1, col - 1, kind, row_above * col_left);
        self.add(row + 1, col + 1, kind, row_above * col_right);
    }

    /// Redraw the view around the robot: wall and chasm cells from the
    /// structure, movable blocks at their current positions.
    pub fn render(
        &mut self,
        robot: Vec2,
        grid: &MazeGrid,
        origin: Vec2,
        size_scaling: f32,
        block_positions: &[Vec2],
    ) {
        self.data.fill(0.0);

        for (i, j, cell) in grid.iter() {
            let kind = match cell {
                Cell::Wall => SegmentKind::Wall,
                Cell::Chasm => SegmentKind::Chasm,
                _ => continue,
            };
            let world = Vec2::new(
                j as f32 * size_scaling - origin.x,
                i as f32 * size_scaling - origin.y,
            );
            self.splat(world - robot, size_scaling, kind);
        }

        for &block in block_positions {
            self.splat(block - robot, size_scaling, SegmentKind::Block);
        }
    }
}
