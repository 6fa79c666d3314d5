//! Index to timestamp mapping.
//!
//! Samples are equally spaced in time. Timestamps are `f64` milliseconds
//! (any epoch); logical index 0 is the oldest retained sample, so each window
//! slide moves the start time forward by one step.

use crate::basis::{AR1Basis, LinearMap1D};
use crate::error::{ChartError, ChartResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAxis {
    /// Timestamp of logical index 0
    start: f64,
    /// Time between consecutive indices
    step: f64,
}

impl TimeAxis {
    /// Fails with [`ChartError::DegenerateBasis`] if `step` is zero or either
    /// value is not finite.
    pub fn new(start: f64, step: f64) -> ChartResult<Self> {
        if step == 0.0 || !step.is_finite() || !start.is_finite() {
            return Err(ChartError::DegenerateBasis {
                p0: start,
                p1: start + step,
            });
        }
        Ok(Self { start, step })
    }

    #[inline]
    pub fn start(&self) -> f64 {
        self.start
    }

    #[inline]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Timestamp of a (possibly fractional) logical index.
    #[inline]
    pub fn time_at(&self, index: f64) -> f64 {
        index * self.step + self.start
    }

    /// Logical index of a timestamp.
    #[inline]
    pub fn index_at(&self, time: f64) -> f64 {
        (time - self.start) / self.step
    }

    /// The index-to-time map.
    pub fn index_to_time(&self) -> LinearMap1D {
        LinearMap1D::new(self.step, self.start)
    }

    /// Time interval covered by an index interval.
    pub fn time_basis(&self, index: &AR1Basis) -> ChartResult<AR1Basis> {
        self.index_to_time().apply_basis(index)
    }

    /// Shift forward by one sample after the window slides.
    pub fn advance(&mut self) {
        self.start += self.step;
    }
}
