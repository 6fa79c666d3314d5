//! Per-index sample tuples.

/// The values of every tracked series at one index.
///
/// A non-finite value (normally `NaN`) means "no data for this series at this
/// index". Missing values are skipped by aggregation and break rendered lines
/// into separate runs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sample {
    values: Vec<f64>,
}

impl Sample {
    /// Create a sample from raw series values.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Create a sample where `None` marks a missing value.
    pub fn from_options<I: IntoIterator<Item = Option<f64>>>(values: I) -> Self {
        Self {
            values: values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect(),
        }
    }

    /// A sample with every series missing.
    pub fn missing(series_count: usize) -> Self {
        Self {
            values: vec![f64::NAN; series_count],
        }
    }

    /// Number of series in this sample.
    #[inline]
    pub fn series_count(&self) -> usize {
        self.values.len()
    }

    /// The value of a series, or `None` if it is missing or out of range.
    #[inline]
    pub fn get(&self, series: usize) -> Option<f64> {
        self.values.get(series).copied().filter(|v| v.is_finite())
    }

    /// Whether a series has no data in this sample.
    #[inline]
    pub fn is_missing(&self, series: usize) -> bool {
        self.get(series).is_none()
    }

    /// Raw values, including `NaN` placeholders.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

impl From<Vec<f64>> for Sample {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

impl<const N: usize> From<[f64; N]> for Sample {
    fn from(values: [f64; N]) -> Self {
        Self::new(values.to_vec())
    }
}

impl From<f64> for Sample {
    fn from(value: f64) -> Self {
        Self::new(vec![value])
    }
}
