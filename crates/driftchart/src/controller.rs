//! Chart orchestration.
//!
//! [`ChartController`] ties the retained window, its aggregation tree, the
//! viewport transform and the redraw scheduler together. Event handlers only
//! mutate state and request a redraw; all recomputation happens in
//! [`ChartController::on_frame`], once per host frame, reading the latest
//! state.
//!
//! # Example
//!
//! ```
//! use driftchart::*;
//!
//! # fn main() -> ChartResult<()> {
//! let samples = vec![Sample::from(1.0), Sample::from(5.0), Sample::from(3.0)];
//! let config = ChartConfig::new(0.0, 1_000.0).with_viewport_size(300.0, 100.0);
//! let mut chart = ChartController::new(config, samples, TupleBuilder::raw())?;
//!
//! struct Log(Vec<AffineParams>);
//! impl ChartSurface for Log {
//!     fn rebuild_geometry(&mut self, _window: &SampleWindow) {}
//!     fn apply_frame(&mut self, frame: &Frame) {
//!         self.0.push(frame.transform);
//!     }
//! }
//!
//! let mut surface = Log(Vec::new());
//! chart.push_sample(Sample::from(4.0))?;
//! chart.on_zoom_pan(AffineParams::new(-150.0, 0.0, 2.0, 1.0))?;
//! chart.on_frame(&mut surface)?;
//! assert_eq!(surface.0.len(), 1);
//! # Ok(())
//! # }
//! ```

use driftchart_core::profiling::profile_function;

use crate::aggregate::{AggregateResult, TupleBuilder};
use crate::basis::AR1Basis;
use crate::config::{ChartConfig, SlideStrategy};
use crate::error::ChartResult;
use crate::redraw::{RedrawFlags, RedrawScheduler, RedrawState};
use crate::sample::Sample;
use crate::time_axis::TimeAxis;
use crate::transform::{AffineParams, ZoomTransform};
use crate::tree::RangeAggregationTree;
use crate::viewport::ViewportTransform;
use crate::window::SampleWindow;

/// Rendering collaborator.
///
/// Geometry is built in model space (x = logical index, y = value) once per
/// data change; each frame only supplies a new transform for it.
pub trait ChartSurface {
    /// Rebuild line geometry from the window, e.g. one polyline per
    /// [`SampleWindow::defined_runs`] entry.
    fn rebuild_geometry(&mut self, window: &SampleWindow);

    /// Apply a freshly computed frame.
    fn apply_frame(&mut self, frame: &Frame);
}

/// Everything a renderer needs for one redraw.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Model to screen transform for the already-built geometry.
    pub transform: AffineParams,
    /// Why this frame was drawn.
    pub flags: RedrawFlags,
    /// Index interval currently on screen (may extend past the window).
    pub visible_index: AR1Basis,
    /// Timestamps of `visible_index`, for the time axis.
    pub visible_time: AR1Basis,
    /// Value interval of the vertical axis; `None` when no series has data on
    /// screen and the previous interval was kept.
    pub value_visible: Option<AR1Basis>,
    /// Per-series aggregates over the visible indices.
    pub aggregate: AggregateResult,
}

/// Statistics about the chart state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartStatistics {
    /// Retained samples.
    pub window_len: usize,
    /// Aggregated series.
    pub series_count: usize,
    /// Samples pushed since construction.
    pub total_pushed: u64,
    /// Redraws executed.
    pub redraws: u64,
    /// Redraw requests merged into a pending redraw.
    pub coalesced_requests: u64,
}

/// Owns one chart's data, aggregation tree, viewport and redraw scheduling.
#[derive(Debug)]
pub struct ChartController {
    config: ChartConfig,
    tree: RangeAggregationTree,
    viewport: ViewportTransform,
    time_axis: TimeAxis,
    scheduler: RedrawScheduler,
}

impl ChartController {
    /// Create a chart over an initial window.
    ///
    /// The window length is fixed from here on and must be at least two
    /// samples, since the full index range `[0, len - 1]` is a basis. A first
    /// redraw is scheduled immediately. Fails if the config is invalid (see
    /// [`ChartConfig::validate`]).
    pub fn new(
        config: ChartConfig,
        samples: Vec<Sample>,
        builder: TupleBuilder,
    ) -> ChartResult<Self> {
        config.validate()?;
        let tree = RangeAggregationTree::from_samples(samples, builder)?;
        let index_full = AR1Basis::new(0.0, (tree.len() - 1) as f64)?;
        let placeholder = AR1Basis::new(0.0, 1.0)?;
        let (width, height) = config.viewport_size;
        let viewport = ViewportTransform::new(
            width,
            height,
            index_full,
            placeholder,
            config.zoom_constraints,
        )?;
        let time_axis = TimeAxis::new(config.start_time, config.time_step)?;

        tracing::debug!(
            len = tree.len(),
            series = tree.series_count(),
            strategy = ?config.slide_strategy,
            "Created chart controller"
        );

        let mut scheduler = RedrawScheduler::new();
        scheduler.request(RedrawFlags::all());

        Ok(Self {
            config,
            tree,
            viewport,
            time_axis,
            scheduler,
        })
    }

    /// Install a callback invoked whenever a redraw becomes pending.
    ///
    /// An already pending redraw is reported right away.
    pub fn with_redraw_notifier<F>(mut self, notifier: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.scheduler.set_notifier(notifier);
        self
    }

    /// Slide the window: drop the oldest sample and append `sample`.
    pub fn push_sample(&mut self, sample: Sample) -> ChartResult<()> {
        match self.config.slide_strategy {
            SlideStrategy::Incremental => self.tree.push(sample)?,
            SlideStrategy::Rebuild => self.tree.push_and_rebuild(sample)?,
        }
        self.time_axis.advance();
        self.scheduler.request(RedrawFlags::DATA);
        Ok(())
    }

    /// Overwrite the sample at a logical index, e.g. a late correction.
    pub fn replace_sample(&mut self, index: usize, sample: Sample) -> ChartResult<()> {
        match self.config.slide_strategy {
            SlideStrategy::Incremental => self.tree.replace(index, sample)?,
            SlideStrategy::Rebuild => self.tree.replace_and_rebuild(index, sample)?,
        }
        self.scheduler.request(RedrawFlags::DATA);
        Ok(())
    }

    /// Record a zoom/pan gesture state.
    pub fn on_zoom_pan(&mut self, zoom: ZoomTransform) -> ChartResult<()> {
        self.viewport.on_zoom_pan(zoom)?;
        self.scheduler.request(RedrawFlags::VIEW);
        Ok(())
    }

    /// Drop any zoom/pan.
    pub fn reset_zoom(&mut self) {
        self.viewport.reset_zoom();
        self.scheduler.request(RedrawFlags::VIEW);
    }

    /// Record a new viewport size; the current zoom is re-constrained to it.
    pub fn on_viewport_resize(&mut self, width: f64, height: f64) -> ChartResult<()> {
        self.viewport.on_viewport_resize(width, height)?;
        self.viewport.on_zoom_pan(self.viewport.zoom())?;
        self.scheduler.request(RedrawFlags::BOUNDS);
        Ok(())
    }

    /// Ask for a redraw explicitly.
    pub fn request_redraw(&mut self, flags: RedrawFlags) -> bool {
        self.scheduler.request(flags)
    }

    /// Run the pending redraw, if any, against `surface`.
    ///
    /// Call this at the host's frame boundary. Returns the emitted frame, or
    /// `None` when nothing was pending. If the frame cannot be computed the
    /// surface is not touched and the redraw stays pending.
    pub fn on_frame<S>(&mut self, surface: &mut S) -> ChartResult<Option<Frame>>
    where
        S: ChartSurface + ?Sized,
    {
        let RedrawState::Pending(flags) = self.scheduler.state() else {
            return Ok(None);
        };
        profile_function!();

        let frame = self.compute_frame(flags)?;
        self.scheduler.take();

        if flags.needs_geometry_rebuild() {
            surface.rebuild_geometry(self.tree.window());
        }
        surface.apply_frame(&frame);

        tracing::trace!(?flags, transform = ?frame.transform, "Emitted frame");
        Ok(Some(frame))
    }

    /// Recompute scales and transform from the current state.
    fn compute_frame(&mut self, flags: RedrawFlags) -> ChartResult<Frame> {
        let index_full = self.viewport.index_full();
        let previous_values = self.viewport.value_visible();

        // pick up a resized screen before inverse-mapping it
        self.viewport.on_reference_window_resize(index_full, previous_values);

        let visible_index = self.viewport.visible_index()?;

        let aggregate = match self.tree.clamp_range(visible_index.min(), visible_index.max()) {
            Some((lo, hi)) => self.tree.range_aggregate(lo, hi)?,
            None => AggregateResult::empty(self.tree.series_count()),
        };

        let value_visible = self.value_basis(&aggregate)?;
        match value_visible {
            Some(basis) => self.viewport.on_reference_window_resize(index_full, basis),
            None => tracing::warn!(
                lo = visible_index.min(),
                hi = visible_index.max(),
                "No data in visible range, keeping previous value range"
            ),
        }

        Ok(Frame {
            transform: self.viewport.current_transform(),
            flags,
            visible_index,
            visible_time: self.time_axis.time_basis(&visible_index)?,
            value_visible,
            aggregate,
        })
    }

    /// Vertical reference basis from the visible aggregate.
    ///
    /// Series without data are skipped. A flat range is widened by
    /// `flat_range_padding` when configured.
    fn value_basis(&self, aggregate: &AggregateResult) -> ChartResult<Option<AR1Basis>> {
        let Some(range) = aggregate.union() else {
            return Ok(None);
        };

        match self.config.flat_range_padding {
            Some(padding) if range.span() == 0.0 => {
                tracing::debug!(value = range.min, padding, "Widening flat value range");
                AR1Basis::new(range.min - padding, range.max + padding).map(Some)
            }
            _ => AR1Basis::new(range.min, range.max).map(Some),
        }
    }

    #[inline]
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    #[inline]
    pub fn tree(&self) -> &RangeAggregationTree {
        &self.tree
    }

    #[inline]
    pub fn window(&self) -> &SampleWindow {
        self.tree.window()
    }

    #[inline]
    pub fn viewport(&self) -> &ViewportTransform {
        &self.viewport
    }

    #[inline]
    pub fn time_axis(&self) -> &TimeAxis {
        &self.time_axis
    }

    /// Current model to screen transform (as of the last frame).
    pub fn current_transform(&self) -> AffineParams {
        self.viewport.current_transform()
    }

    /// `Idle` or `Pending`.
    #[inline]
    pub fn redraw_state(&self) -> RedrawState {
        self.scheduler.state()
    }

    #[inline]
    pub fn is_redraw_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    pub fn statistics(&self) -> ChartStatistics {
        ChartStatistics {
            window_len: self.tree.len(),
            series_count: self.tree.series_count(),
            total_pushed: self.tree.window().total_pushed(),
            redraws: self.scheduler.fired_count(),
            coalesced_requests: self.scheduler.coalesced_count(),
        }
    }
}
