//! The retained sample window.
//!
//! A fixed-capacity circular buffer that is always full: pushing a sample
//! evicts the oldest one. Logical index 0 is the oldest sample and
//! `len() - 1` the newest; the physical slot of a logical index is
//! `(head + index) % len`, so sliding the window never moves data.

use std::ops::Range;

use crate::error::{ChartError, ChartResult};
use crate::sample::Sample;

/// Fixed-length sliding window of samples with a common series count.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    /// Physical storage
    data: Vec<Sample>,
    /// Physical slot of logical index 0
    head: usize,
    series_count: usize,
    /// Samples pushed since construction
    total_pushed: u64,
}

impl SampleWindow {
    /// Create a window holding `samples`; its length becomes the window capacity.
    ///
    /// Fails if `samples` is empty or the samples disagree on series count.
    pub fn new(samples: Vec<Sample>) -> ChartResult<Self> {
        let first = samples.first().ok_or(ChartError::EmptyWindow)?;
        let series_count = first.series_count();

        if let Some(bad) = samples.iter().find(|s| s.series_count() != series_count) {
            return Err(ChartError::SeriesCountMismatch {
                expected: series_count,
                actual: bad.series_count(),
            });
        }

        Ok(Self {
            data: samples,
            head: 0,
            series_count,
            total_pushed: 0,
        })
    }

    /// Number of retained samples (also the capacity).
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always `false`: construction rejects empty windows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn series_count(&self) -> usize {
        self.series_count
    }

    /// Physical slot of logical index 0.
    #[inline]
    pub fn head(&self) -> usize {
        self.head
    }

    /// Samples pushed since construction.
    #[inline]
    pub fn total_pushed(&self) -> u64 {
        self.total_pushed
    }

    /// Physical slot holding a logical index.
    #[inline]
    pub fn physical_index(&self, index: usize) -> usize {
        (self.head + index) % self.data.len()
    }

    /// Sample at a logical index (0 = oldest).
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Sample> {
        if index >= self.data.len() {
            return None;
        }
        Some(&self.data[self.physical_index(index)])
    }

    /// Value of one series at a logical index, `None` when missing.
    #[inline]
    pub fn value(&self, index: usize, series: usize) -> Option<f64> {
        self.get(index).and_then(|s| s.get(series))
    }

    /// The newest sample.
    pub fn last(&self) -> Option<&Sample> {
        self.get(self.data.len() - 1)
    }

    /// The oldest sample.
    pub fn first(&self) -> Option<&Sample> {
        self.get(0)
    }

    /// Evict the oldest sample and append `sample` as the newest.
    ///
    /// Returns the physical slot that now holds the new sample (the slot the
    /// evicted sample occupied).
    pub fn push(&mut self, sample: Sample) -> ChartResult<usize> {
        self.slide(sample).map(|(slot, _)| slot)
    }

    /// Overwrite the sample at a logical index.
    pub fn set(&mut self, index: usize, sample: Sample) -> ChartResult<()> {
        self.swap(index, sample).map(drop)
    }

    /// Like [`SampleWindow::push`], also handing back the evicted sample.
    pub(crate) fn slide(&mut self, sample: Sample) -> ChartResult<(usize, Sample)> {
        self.check_series(&sample)?;
        let slot = self.head;
        let evicted = std::mem::replace(&mut self.data[slot], sample);
        self.head = (self.head + 1) % self.data.len();
        self.total_pushed = self.total_pushed.wrapping_add(1);
        Ok((slot, evicted))
    }

    /// Undo a [`SampleWindow::slide`] that returned `(slot, evicted)`.
    pub(crate) fn unslide(&mut self, slot: usize, evicted: Sample) {
        self.data[slot] = evicted;
        self.head = slot;
        self.total_pushed = self.total_pushed.wrapping_sub(1);
    }

    /// Like [`SampleWindow::set`], also handing back the previous sample.
    pub(crate) fn swap(&mut self, index: usize, sample: Sample) -> ChartResult<Sample> {
        if index >= self.data.len() {
            return Err(ChartError::IndexOutOfWindow {
                index,
                len: self.data.len(),
            });
        }
        self.check_series(&sample)?;
        let slot = self.physical_index(index);
        Ok(std::mem::replace(&mut self.data[slot], sample))
    }

    /// Iterate over samples in logical order (oldest to newest).
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Sample> + '_ {
        let (first, second) = self.as_slices();
        let iter = first.iter().chain(second.iter());
        SizedIter {
            inner: iter,
            remaining: self.data.len(),
        }
    }

    /// The samples as two physical slices which, concatenated, are in logical
    /// order.
    pub fn as_slices(&self) -> (&[Sample], &[Sample]) {
        let (before_head, from_head) = self.data.split_at(self.head);
        (from_head, before_head)
    }

    /// Copy the samples into a vector in logical order.
    pub fn to_vec(&self) -> Vec<Sample> {
        self.iter().cloned().collect()
    }

    /// Maximal runs of consecutive logical indices where `series` has data.
    ///
    /// Each run is one polyline for the geometry collaborator; missing values
    /// split the line instead of being drawn as zero.
    pub fn defined_runs(&self, series: usize) -> DefinedRuns<'_> {
        DefinedRuns {
            window: self,
            series,
            index: 0,
        }
    }

    fn check_series(&self, sample: &Sample) -> ChartResult<()> {
        if sample.series_count() != self.series_count {
            return Err(ChartError::SeriesCountMismatch {
                expected: self.series_count,
                actual: sample.series_count(),
            });
        }
        Ok(())
    }
}

struct SizedIter<I> {
    inner: I,
    remaining: usize,
}

impl<'a, I: Iterator<Item = &'a Sample>> Iterator for SizedIter<I> {
    type Item = &'a Sample;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next()?;
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, I: Iterator<Item = &'a Sample>> ExactSizeIterator for SizedIter<I> {}

/// Iterator over the defined runs of one series.
pub struct DefinedRuns<'a> {
    window: &'a SampleWindow,
    series: usize,
    index: usize,
}

impl Iterator for DefinedRuns<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let len = self.window.len();
        while self.index < len && self.window.value(self.index, self.series).is_none() {
            self.index += 1;
        }
        if self.index >= len {
            return None;
        }

        let start = self.index;
        while self.index < len && self.window.value(self.index, self.series).is_some() {
            self.index += 1;
        }
        Some(start..self.index)
    }
}
