//! Min/max aggregates and the leaf strategy that produces them.

use std::fmt;

use crate::error::{ChartError, ChartResult};
use crate::window::SampleWindow;

/// A `(min, max)` pair summarizing one series over some index range.
///
/// Both bounds are always finite; an absent aggregate is `None`, never
/// `(+inf, -inf)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

impl MinMax {
    pub fn new(min: f64, max: f64) -> Self {
        debug_assert!(min <= max, "MinMax requires min <= max");
        Self { min, max }
    }

    /// The aggregate of a single finite value; `None` for missing data.
    #[inline]
    pub fn point(value: f64) -> Option<Self> {
        value.is_finite().then_some(Self {
            min: value,
            max: value,
        })
    }

    /// Component-wise merge.
    #[inline]
    pub fn merge(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Merge two optional aggregates; "no data" is the identity.
    #[inline]
    pub fn merge_opt(a: Option<Self>, b: Option<Self>) -> Option<Self> {
        match (a, b) {
            (Some(a), Some(b)) => Some(a.merge(b)),
            (a, None) => a,
            (None, b) => b,
        }
    }

    /// `max - min`.
    #[inline]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Per-series aggregate over a queried range.
///
/// `None` for a series means it has no data anywhere in the range.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregateResult {
    series: Vec<Option<MinMax>>,
}

impl AggregateResult {
    /// An aggregate with every series empty.
    pub fn empty(series_count: usize) -> Self {
        Self {
            series: vec![None; series_count],
        }
    }

    pub fn from_series(series: Vec<Option<MinMax>>) -> Self {
        Self { series }
    }

    /// A single-series aggregate.
    pub fn single(aggregate: Option<MinMax>) -> Self {
        Self {
            series: vec![aggregate],
        }
    }

    #[inline]
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Aggregate for one series, `None` if empty or out of range.
    #[inline]
    pub fn get(&self, series: usize) -> Option<MinMax> {
        self.series.get(series).copied().flatten()
    }

    /// Aggregate for one series, failing with
    /// [`ChartError::EmptyRangeAggregate`] when it has no data.
    pub fn require(&self, series: usize) -> ChartResult<MinMax> {
        self.get(series)
            .ok_or(ChartError::EmptyRangeAggregate { series })
    }

    /// Whether every series is empty.
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(Option::is_none)
    }

    /// Merge of all series that have data, skipping empty ones.
    pub fn union(&self) -> Option<MinMax> {
        self.series
            .iter()
            .fold(None, |acc, agg| MinMax::merge_opt(acc, *agg))
    }

    #[inline]
    pub fn as_slice(&self) -> &[Option<MinMax>] {
        &self.series
    }

    /// Merge per-series aggregates into this one.
    pub(crate) fn merge_slice(&mut self, other: &[Option<MinMax>]) {
        for (acc, agg) in self.series.iter_mut().zip(other) {
            *acc = MinMax::merge_opt(*acc, *agg);
        }
    }
}

type BuildFn = dyn Fn(usize, &SampleWindow) -> AggregateResult + Send + Sync;

/// Strategy producing a leaf aggregate from a logical index and the window.
///
/// The indirection lets the aggregation tree summarize any derived quantity,
/// not only the raw series values. The returned series count must be the same
/// for every index.
pub struct TupleBuilder {
    build: Box<BuildFn>,
}

impl TupleBuilder {
    /// Wrap an arbitrary leaf function.
    pub fn new<F>(build: F) -> Self
    where
        F: Fn(usize, &SampleWindow) -> AggregateResult + Send + Sync + 'static,
    {
        Self {
            build: Box::new(build),
        }
    }

    /// One aggregate per series holding the raw value.
    pub fn raw() -> Self {
        Self::new(|index, window| {
            let series = window
                .get(index)
                .map(|s| s.values().iter().map(|&v| MinMax::point(v)).collect())
                .unwrap_or_else(|| vec![None; window.series_count()]);
            AggregateResult::from_series(series)
        })
    }

    /// A single aggregate spanning every series at an index, i.e. the
    /// envelope of all lines.
    pub fn envelope() -> Self {
        Self::new(|index, window| {
            let envelope = window.get(index).and_then(|s| {
                s.values()
                    .iter()
                    .fold(None, |acc, &v| MinMax::merge_opt(acc, MinMax::point(v)))
            });
            AggregateResult::single(envelope)
        })
    }

    /// Build the leaf aggregate for a logical index.
    #[inline]
    pub fn build(&self, index: usize, window: &SampleWindow) -> AggregateResult {
        (self.build)(index, window)
    }
}

impl Default for TupleBuilder {
    fn default() -> Self {
        Self::raw()
    }
}

impl fmt::Debug for TupleBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TupleBuilder").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::Sample;

    #[test]
    fn test_point_rejects_missing() {
        assert_eq!(MinMax::point(2.0), Some(MinMax::new(2.0, 2.0)));
        assert_eq!(MinMax::point(f64::NAN), None);
        assert_eq!(MinMax::point(f64::INFINITY), None);
    }

    #[test]
    fn test_merge_opt_identity() {
        let a = MinMax::new(1.0, 3.0);
        assert_eq!(MinMax::merge_opt(Some(a), None), Some(a));
        assert_eq!(MinMax::merge_opt(None, Some(a)), Some(a));
        assert_eq!(MinMax::merge_opt(None, None), None);
        assert_eq!(
            MinMax::merge_opt(Some(a), Some(MinMax::new(-1.0, 2.0))),
            Some(MinMax::new(-1.0, 3.0))
        );
    }

    #[test]
    fn test_require_reports_empty_series() {
        let result = AggregateResult::from_series(vec![Some(MinMax::new(0.0, 1.0)), None]);
        assert!(result.require(0).is_ok());
        assert_eq!(
            result.require(1),
            Err(ChartError::EmptyRangeAggregate { series: 1 })
        );
        assert_eq!(result.union(), Some(MinMax::new(0.0, 1.0)));
        assert!(!result.is_empty());
        assert!(AggregateResult::empty(3).is_empty());
        assert_eq!(AggregateResult::empty(3).union(), None);
    }

    #[test]
    fn test_builders() {
        let window = SampleWindow::new(vec![
            Sample::from([4.0, f64::NAN]),
            Sample::from([1.0, 7.0]),
        ])
        .unwrap();

        let raw = TupleBuilder::raw();
        let leaf = raw.build(0, &window);
        assert_eq!(leaf.series_count(), 2);
        assert_eq!(leaf.get(0), Some(MinMax::new(4.0, 4.0)));
        assert_eq!(leaf.get(1), None);

        let envelope = TupleBuilder::envelope();
        assert_eq!(envelope.build(1, &window).get(0), Some(MinMax::new(1.0, 7.0)));
        assert_eq!(envelope.build(0, &window).get(0), Some(MinMax::new(4.0, 4.0)));
    }
}
