//! Chart construction parameters.

use crate::error::{ChartError, ChartResult};
use crate::transform::ZoomConstraints;

/// How the aggregation tree follows a window slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlideStrategy {
    /// Recompute only the recycled leaf and its ancestors, O(log n).
    ///
    /// Valid when the tuple builder's output for a sample depends only on
    /// that sample.
    #[default]
    Incremental,
    /// Rebuild the whole tree, O(n). Required for builders that look at
    /// neighbouring samples or at the logical index.
    Rebuild,
}

/// Configuration for a [`ChartController`](crate::ChartController).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartConfig {
    /// Timestamp of the first initial sample, in milliseconds.
    pub start_time: f64,
    /// Time between consecutive samples, in milliseconds.
    pub time_step: f64,
    /// Initial viewport size in pixels.
    pub viewport_size: (f64, f64),
    pub slide_strategy: SlideStrategy,
    pub zoom_constraints: ZoomConstraints,
    /// Half-height added around a visible value range whose min equals its
    /// max (a flat line); must be positive. `None` turns such a range into a
    /// [`ChartError::DegenerateBasis`](crate::ChartError::DegenerateBasis).
    pub flat_range_padding: Option<f64>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            time_step: 1_000.0,
            viewport_size: (800.0, 600.0),
            slide_strategy: SlideStrategy::Incremental,
            zoom_constraints: ZoomConstraints::default(),
            flat_range_padding: Some(0.5),
        }
    }
}

impl ChartConfig {
    pub fn new(start_time: f64, time_step: f64) -> Self {
        Self {
            start_time,
            time_step,
            ..Default::default()
        }
    }

    pub fn with_viewport_size(mut self, width: f64, height: f64) -> Self {
        self.viewport_size = (width, height);
        self
    }

    pub fn with_slide_strategy(mut self, strategy: SlideStrategy) -> Self {
        self.slide_strategy = strategy;
        self
    }

    pub fn with_zoom_constraints(mut self, constraints: ZoomConstraints) -> Self {
        self.zoom_constraints = constraints;
        self
    }

    pub fn with_flat_range_padding(mut self, padding: Option<f64>) -> Self {
        self.flat_range_padding = padding;
        self
    }

    /// Check the parameters that cannot be validated by their types.
    ///
    /// Fails with [`ChartError::DegenerateBasis`] for a non-positive or
    /// non-finite `flat_range_padding` and for invalid zoom constraints.
    pub fn validate(&self) -> ChartResult<()> {
        if let Some(padding) = self.flat_range_padding
            && !(padding > 0.0 && padding.is_finite())
        {
            return Err(ChartError::DegenerateBasis {
                p0: -padding,
                p1: padding,
            });
        }
        self.zoom_constraints.validate()
    }
}
