use crate::percentiles;

/// Location and spread of a distance sample.
///
/// Spread uses the sample (`n - 1`) estimators, the ones the significance
/// tests in [`hypothesis`](crate::hypothesis) standardize with.
#[derive(Debug, Clone)]
pub struct DescriptiveStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Midpoint of the two central values for even counts
    pub median: f64,
    /// Sample variance, `0.0` for a single value
    pub variance: f64,
    pub std_dev: f64,
}

impl DescriptiveStats {
    /// Summarizes `values` in any order; `None` when there are none.
    ///
    /// ```
    /// # use pinisi_stats::descriptive::DescriptiveStats;
    /// let stats = DescriptiveStats::new([0.4, 0.1, 0.3, 0.2, 0.5]).unwrap();
    /// assert_eq!((stats.min, stats.max), (0.1, 0.5));
    /// assert_eq!(stats.median, 0.3);
    /// assert_eq!(stats.count, 5);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sorted = values.into_iter().collect::<Vec<_>>();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted)
    }

    /// Summarizes values already sorted ascending.
    ///
    /// # Panics
    ///
    /// If `sorted` is out of order.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted: &[f64]) -> Option<Self> {
        assert!(
            sorted.windows(2).all(|w| w[0] <= w[1]),
            "sample must be sorted ascending"
        );

        let (&min, &max) = (sorted.first()?, sorted.last()?);
        let mean = mean(sorted)?;
        let squared_deviations = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
        let variance = match sorted.len() {
            1 => 0.0,
            n => squared_deviations / (n - 1) as f64,
        };

        Some(Self {
            count: sorted.len(),
            min,
            max,
            mean,
            median: percentiles::compute_quantile(sorted, 0.5),
            variance,
            std_dev: variance.sqrt(),
        })
    }
}

/// Arithmetic mean of `values`, or `None` when empty.
///
/// ```
/// # use pinisi_stats::descriptive::mean;
/// assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
/// assert_eq!(mean(&[]), None);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
