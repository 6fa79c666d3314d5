//! Range min/max aggregation over the retained window.
//!
//! A segment tree stored as a flat array: node 1 is the root, node `i` has
//! children `2i` and `2i + 1`, and the leaves occupy `size..2 * size` where
//! `size` is the window length rounded up to a power of two. Each node keeps
//! one `Option<MinMax>` per aggregated series, laid out contiguously.
//!
//! Leaves are addressed by *physical* window slot, not logical index. When the
//! window slides, the slot of the evicted sample receives the new one, so an
//! incremental slide touches exactly one leaf and its ancestors. Queries
//! translate a logical range into at most two physical ranges.
//!
//! Cost: build and [`RangeAggregationTree::rebuild`] are O(n);
//! [`RangeAggregationTree::range_aggregate`], [`RangeAggregationTree::replace`]
//! and [`RangeAggregationTree::push`] are O(log n). Incremental sliding is only
//! valid when the tuple builder's output for a sample does not depend on its
//! logical index or neighbours; otherwise use
//! [`RangeAggregationTree::push_and_rebuild`].

use driftchart_core::profiling::profile_function;

use crate::aggregate::{AggregateResult, MinMax, TupleBuilder};
use crate::error::{ChartError, ChartResult};
use crate::sample::Sample;
use crate::window::SampleWindow;

/// Segment tree answering per-series min/max over logical index ranges.
#[derive(Debug)]
pub struct RangeAggregationTree {
    window: SampleWindow,
    builder: TupleBuilder,
    /// Number of aggregated series (the builder's output arity)
    series_count: usize,
    /// Leaf count, a power of two `>= window.len()`
    size: usize,
    /// `2 * size * series_count` entries; node 0 is unused
    nodes: Vec<Option<MinMax>>,
}

impl RangeAggregationTree {
    /// Build the tree bottom-up over `window`.
    ///
    /// The aggregated series count is taken from the builder's output for
    /// logical index 0; every other leaf must agree.
    pub fn new(window: SampleWindow, builder: TupleBuilder) -> ChartResult<Self> {
        profile_function!();

        let series_count = builder.build(0, &window).series_count();
        let size = window.len().next_power_of_two();

        let mut tree = Self {
            window,
            builder,
            series_count,
            size,
            nodes: vec![None; 2 * size * series_count],
        };
        tree.rebuild()?;
        Ok(tree)
    }

    /// Convenience constructor from a sample sequence.
    pub fn from_samples(samples: Vec<Sample>, builder: TupleBuilder) -> ChartResult<Self> {
        Self::new(SampleWindow::new(samples)?, builder)
    }

    /// Number of logical indices (the window length).
    #[inline]
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Always `false`; the window is never empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Number of aggregated series.
    #[inline]
    pub fn series_count(&self) -> usize {
        self.series_count
    }

    /// The retained window backing the tree.
    #[inline]
    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    /// Recompute every leaf from the window and every internal node. O(n).
    ///
    /// Every leaf is built before any node is touched, so a failing builder
    /// leaves the tree as it was.
    pub fn rebuild(&mut self) -> ChartResult<()> {
        profile_function!();

        let leaves = (0..self.window.len())
            .map(|index| -> ChartResult<(usize, AggregateResult)> {
                Ok((self.window.physical_index(index), self.leaf(index)?))
            })
            .collect::<ChartResult<Vec<_>>>()?;

        self.nodes.fill(None);
        for (slot, leaf) in &leaves {
            self.store_leaf(*slot, leaf);
        }
        for node in (1..self.size).rev() {
            self.pull(node);
        }

        tracing::debug!(
            len = self.window.len(),
            series = self.series_count,
            "Rebuilt aggregation tree"
        );
        Ok(())
    }

    /// Per-series min/max over the closed logical range `[lo, hi]`.
    ///
    /// Fails with [`ChartError::IndexOutOfWindow`] if `hi` is outside the
    /// window and [`ChartError::InvalidRange`] if `lo > hi`. Indices are never
    /// clamped here; see [`RangeAggregationTree::clamp_range`].
    pub fn range_aggregate(&self, lo: usize, hi: usize) -> ChartResult<AggregateResult> {
        profile_function!();

        let len = self.window.len();
        if lo > hi {
            return Err(ChartError::InvalidRange { lo, hi });
        }
        if hi >= len {
            return Err(ChartError::IndexOutOfWindow { index: hi, len });
        }

        let mut result = AggregateResult::empty(self.series_count);
        let start = self.window.physical_index(lo);
        let end = self.window.physical_index(hi);

        if start <= end {
            self.query_physical(start, end, &mut result);
        } else {
            self.query_physical(start, len - 1, &mut result);
            self.query_physical(0, end, &mut result);
        }
        Ok(result)
    }

    /// Aggregate over the whole window.
    pub fn total_aggregate(&self) -> AggregateResult {
        let mut result = AggregateResult::empty(self.series_count);
        result.merge_slice(self.node(1));
        result
    }

    /// Turn a fractional index interval into an inclusive index range inside
    /// the window, widening to whole indices.
    ///
    /// Returns `None` when the interval does not overlap the window or is not
    /// finite. This is the explicit caller-side clamp; the tree itself never
    /// clamps.
    pub fn clamp_range(&self, lo: f64, hi: f64) -> Option<(usize, usize)> {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        let last = (self.window.len() - 1) as f64;
        if !lo.is_finite() || !hi.is_finite() || hi < 0.0 || lo > last {
            return None;
        }
        let lo = lo.floor().clamp(0.0, last) as usize;
        let hi = hi.ceil().clamp(0.0, last) as usize;
        Some((lo, hi))
    }

    /// Replace the sample at a logical index and update its ancestors.
    ///
    /// On error the window and the tree are left unchanged.
    pub fn replace(&mut self, index: usize, sample: Sample) -> ChartResult<()> {
        profile_function!();

        let previous = self.window.swap(index, sample)?;
        let leaf = match self.leaf(index) {
            Ok(leaf) => leaf,
            Err(err) => {
                self.window.swap(index, previous)?;
                return Err(err);
            }
        };

        let slot = self.window.physical_index(index);
        self.store_leaf(slot, &leaf);
        self.update_ancestors(slot);
        Ok(())
    }

    /// Replace the sample at a logical index and rebuild the whole tree. O(n).
    ///
    /// On error the window and the tree are left unchanged.
    pub fn replace_and_rebuild(&mut self, index: usize, sample: Sample) -> ChartResult<()> {
        let previous = self.window.swap(index, sample)?;
        if let Err(err) = self.rebuild() {
            self.window.swap(index, previous)?;
            return Err(err);
        }
        Ok(())
    }

    /// Slide the window by one sample, updating only the recycled leaf.
    ///
    /// The leaf that held the evicted oldest sample becomes the leaf of the
    /// new newest sample. O(log n). On error the window and the tree are left
    /// unchanged.
    pub fn push(&mut self, sample: Sample) -> ChartResult<()> {
        profile_function!();

        let (slot, evicted) = self.window.slide(sample)?;
        let leaf = match self.leaf(self.window.len() - 1) {
            Ok(leaf) => leaf,
            Err(err) => {
                self.window.unslide(slot, evicted);
                return Err(err);
            }
        };
        self.store_leaf(slot, &leaf);
        self.update_ancestors(slot);

        tracing::trace!(slot, head = self.window.head(), "Slid aggregation window");
        Ok(())
    }

    /// Slide the window by one sample and rebuild the whole tree. O(n).
    ///
    /// On error the window and the tree are left unchanged.
    pub fn push_and_rebuild(&mut self, sample: Sample) -> ChartResult<()> {
        let (slot, evicted) = self.window.slide(sample)?;
        if let Err(err) = self.rebuild() {
            self.window.unslide(slot, evicted);
            return Err(err);
        }
        Ok(())
    }

    /// Check that every internal node equals the merge of its children.
    pub fn check_invariants(&self) -> bool {
        (1..self.size).all(|node| {
            let left = self.node(2 * node);
            let right = self.node(2 * node + 1);
            self.node(node)
                .iter()
                .zip(left.iter().zip(right))
                .all(|(agg, (l, r))| *agg == MinMax::merge_opt(*l, *r))
        })
    }

    #[inline]
    fn node(&self, node: usize) -> &[Option<MinMax>] {
        let start = node * self.series_count;
        &self.nodes[start..start + self.series_count]
    }

    /// Build the leaf aggregate for a logical index, checking its arity.
    fn leaf(&self, index: usize) -> ChartResult<AggregateResult> {
        let leaf = self.builder.build(index, &self.window);
        if leaf.series_count() != self.series_count {
            return Err(ChartError::SeriesCountMismatch {
                expected: self.series_count,
                actual: leaf.series_count(),
            });
        }
        Ok(leaf)
    }

    fn store_leaf(&mut self, slot: usize, leaf: &AggregateResult) {
        let start = (self.size + slot) * self.series_count;
        self.nodes[start..start + self.series_count].copy_from_slice(leaf.as_slice());
    }

    fn pull(&mut self, node: usize) {
        let k = self.series_count;
        for s in 0..k {
            let left = self.nodes[2 * node * k + s];
            let right = self.nodes[(2 * node + 1) * k + s];
            self.nodes[node * k + s] = MinMax::merge_opt(left, right);
        }
    }

    fn update_ancestors(&mut self, slot: usize) {
        let mut node = (self.size + slot) / 2;
        while node >= 1 {
            self.pull(node);
            node /= 2;
        }
    }

    /// Merge the physical leaf range `[lo, hi]` into `out`.
    fn query_physical(&self, lo: usize, hi: usize, out: &mut AggregateResult) {
        let mut l = lo + self.size;
        let mut r = hi + self.size + 1;
        while l < r {
            if l & 1 == 1 {
                out.merge_slice(self.node(l));
                l += 1;
            }
            if r & 1 == 1 {
                r -= 1;
                out.merge_slice(self.node(r));
            }
            l /= 2;
            r /= 2;
        }
    }
}
