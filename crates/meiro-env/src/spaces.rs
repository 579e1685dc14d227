//! Observation and action space descriptors

use serde::{Deserialize, Serialize};

/// Box of f32 values with per-component bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxSpace {
    pub low: Vec<f32>,
    pub high: Vec<f32>,
}

impl BoxSpace {
    pub fn new(low: Vec<f32>, high: Vec<f32>) -> Self {
        assert_eq!(low.len(), high.len(), "low/high bound lengths differ");
        Self { low, high }
    }

    /// Space of `len` components, each bounded to [low, high]
    pub fn uniform(len: usize, low: f32, high: f32) -> Self {
        Self {
            low: vec![low; len],
            high: vec![high; len],
        }
    }

    /// Unbounded space of `len` components
    pub fn unbounded(len: usize) -> Self {
        Self::uniform(len, f32::NEG_INFINITY, f32::INFINITY)
    }

    pub fn len(&self) -> usize {
        self.low.len()
    }

    pub fn is_empty(&self) -> bool {
        self.low.is_empty()
    }

    /// Whether every component of `value` lies inside the bounds
    pub fn contains(&self, value: &[f32]) -> bool {
        value.len() == self.len()
            && value
                .iter()
                .zip(self.low.iter().zip(self.high.iter()))
                .all(|(v, (lo, hi))| lo <= v && v <= hi)
    }
}
