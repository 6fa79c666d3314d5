//! Error types for the chart core.

/// Errors raised by chart operations.
///
/// Every variant is a precondition violation in the calling layer, so none of
/// them is retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChartError {
    /// A basis with zero span or a non-finite bound.
    #[error("degenerate basis [{p0}, {p1}]")]
    DegenerateBasis { p0: f64, p1: f64 },

    /// A series has no data anywhere in the queried range.
    #[error("series {series} has no data in the queried range")]
    EmptyRangeAggregate { series: usize },

    /// An index outside the retained window.
    #[error("index {index} is outside the window of length {len}")]
    IndexOutOfWindow { index: usize, len: usize },

    /// A range whose lower bound exceeds its upper bound.
    #[error("invalid range: {lo} > {hi}")]
    InvalidRange { lo: usize, hi: usize },

    /// A sample or aggregate with the wrong number of series.
    #[error("expected {expected} series, got {actual}")]
    SeriesCountMismatch { expected: usize, actual: usize },

    /// A window, tree or chart constructed without samples.
    #[error("the sample window must not be empty")]
    EmptyWindow,
}

/// Result type for chart operations.
pub type ChartResult<T> = Result<T, ChartError>;
