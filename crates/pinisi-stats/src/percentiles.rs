/// Precomputed quantile values for a dataset.
///
/// This structure stores quantile-value pairs for efficient lookup
/// of commonly used quantile points (e.g. the quartiles used by the
/// IQR outlier filter).
///
/// # Examples
///
/// ```
/// use pinisi_stats::percentiles::Percentiles;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// let quartiles = Percentiles::new(&values, &[0.25, 0.5, 0.75]);
///
/// assert_eq!(quartiles.get(0.5), Some(3.0));
/// assert_eq!(quartiles.get(0.25), Some(2.0));
/// assert_eq!(quartiles.iqr(), Some(2.0));
/// ```
#[derive(Debug, Clone)]
pub struct Percentiles {
    /// Quantile-value pairs, in the order requested.
    /// Each tuple contains (quantile, value) where quantile is 0.0-1.0.
    values: Vec<(f64, f64)>,
}

impl Percentiles {
    /// Computes quantiles from sorted values.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is out of order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64], quantile_points: &[f64]) -> Self {
        assert!(
            sorted_values.windows(2).all(|w| w[0] <= w[1]),
            "sample must be sorted ascending"
        );

        let values = quantile_points
            .iter()
            .map(|&q| (q, compute_quantile(sorted_values, q)))
            .collect();
        Self { values }
    }

    /// Computes quantiles from unsorted values.
    ///
    /// This method will sort the values internally before computing quantiles.
    #[must_use]
    pub fn new(values: &[f64], quantile_points: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted, quantile_points)
    }

    /// Gets the value at a specific quantile.
    ///
    /// Returns `None` if the quantile was not precomputed.
    #[must_use]
    pub fn get(&self, quantile: f64) -> Option<f64> {
        self.values.iter().find_map(|(q, value)| {
            if (*q - quantile).abs() < f64::EPSILON {
                Some(*value)
            } else {
                None
            }
        })
    }

    /// Interquartile range (`Q75 - Q25`), when both quartiles were precomputed.
    #[must_use]
    pub fn iqr(&self) -> Option<f64> {
        Some(self.get(0.75)? - self.get(0.25)?)
    }
}

/// Computes a single quantile value from sorted data.
///
/// Uses linear interpolation between the two closest ranks: for `n`
/// values, the quantile `q` sits at fractional position `(n - 1) * q`.
/// This is the default convention of most dataframe libraries, so
/// medians and quartiles of even-sized samples fall between elements.
///
/// `quantile` is clamped to `0.0..=1.0`.
///
/// # Returns
///
/// The value at the specified quantile. Returns `f64::NAN` if the input is empty.
///
/// # Examples
///
/// ```
/// use pinisi_stats::percentiles::compute_quantile;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0];
/// assert_eq!(compute_quantile(&values, 0.5), 2.5);
/// assert_eq!(compute_quantile(&values, 0.25), 1.75);
/// assert_eq!(compute_quantile(&values, 1.0), 4.0);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn compute_quantile(sorted_values: &[f64], quantile: f64) -> f64 {
    if sorted_values.is_empty() {
        return f64::NAN;
    }
    let quantile = quantile.clamp(0.0, 1.0);
    let position = (sorted_values.len() - 1) as f64 * quantile;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - position.floor();
    let low = sorted_values[lower];
    let high = sorted_values[upper];
    low + (high - low) * fraction
}
