//! Driftchart - sliding-window time chart core
//!
//! This crate provides:
//! - A fixed-length circular window of multi-series samples with gaps
//! - A range aggregation tree answering per-series min/max over any index
//!   range in O(log n), updated in O(log n) as the window slides
//! - 1D affine bases and 2D axis-aligned transforms between index, time,
//!   value and screen space
//! - A viewport that composes a zoom/pan gesture with a reference frame
//!   whose vertical range follows the visible data
//! - A coalescing redraw scheduler and a controller gluing it all together
//!
//! Rendering is left to the host through [`ChartSurface`].
//!
//! # Example
//!
//! ```
//! use driftchart::*;
//!
//! # fn main() -> ChartResult<()> {
//! let samples = vec![
//!     Sample::from([1.0, 10.0]),
//!     Sample::from([5.0, f64::NAN]),
//!     Sample::from([3.0, 12.0]),
//! ];
//! let tree = RangeAggregationTree::from_samples(samples, TupleBuilder::raw())?;
//!
//! let result = tree.range_aggregate(0, 2)?;
//! assert_eq!(result.get(0), Some(MinMax::new(1.0, 5.0)));
//! assert_eq!(result.get(1), Some(MinMax::new(10.0, 12.0)));
//! # Ok(())
//! # }
//! ```

// Data
mod aggregate;
mod sample;
mod tree;
mod window;

// Spaces and transforms
mod basis;
mod time_axis;
mod transform;
mod viewport;

// Orchestration
mod config;
mod controller;
mod error;
mod redraw;

// Re-exports
pub use aggregate::*;
pub use sample::*;
pub use tree::*;
pub use window::*;

pub use basis::*;
pub use time_axis::*;
pub use transform::*;
pub use viewport::*;

pub use config::*;
pub use controller::*;
pub use error::*;
pub use redraw::*;

pub use driftchart_core::{logging, profiling};
