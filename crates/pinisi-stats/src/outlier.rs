//! Interquartile-range outlier filtering
//!
//! Values are kept when they lie within `median ± k × IQR`, with both bounds
//! inclusive. The filter is robust against the long right tail typical of
//! distance errors, where a handful of wild guesses would otherwise
//! dominate the mean.
//!
//! The filter itself always filters. Treating `k == 0` as "no filtering" is
//! a decision for the caller, which should skip the call entirely.

use crate::percentiles::Percentiles;

/// Inclusive bounds computed by the IQR rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrBounds {
    /// Lowest retained value.
    pub lower: f64,
    /// Highest retained value.
    pub upper: f64,
}

impl IqrBounds {
    /// Computes `median ± num_iqr × (Q75 - Q25)` for `values`.
    ///
    /// Returns `None` for an empty slice.
    ///
    /// # Examples
    ///
    /// ```
    /// use pinisi_stats::outlier::IqrBounds;
    ///
    /// let bounds = IqrBounds::new(&[1.0, 2.0, 3.0, 4.0, 5.0], 1.0).unwrap();
    /// assert_eq!(bounds.lower, 1.0);
    /// assert_eq!(bounds.upper, 5.0);
    /// ```
    #[must_use]
    pub fn new(values: &[f64], num_iqr: f64) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let quartiles = Percentiles::new(values, &[0.25, 0.5, 0.75]);
        let median = quartiles.get(0.5)?;
        let iqr = quartiles.iqr()?;
        Some(Self {
            lower: median - iqr * num_iqr,
            upper: median + iqr * num_iqr,
        })
    }

    /// Whether `value` lies within the closed interval.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// Returns the values lying within `median ± num_iqr × IQR`, in input order.
///
/// # Examples
///
/// ```
/// use pinisi_stats::outlier::filter_iqr;
///
/// let kept = filter_iqr(&[10.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 250.0], 1.5);
/// assert_eq!(kept, vec![10.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
/// ```
#[must_use]
pub fn filter_iqr(values: &[f64], num_iqr: f64) -> Vec<f64> {
    let Some(bounds) = IqrBounds::new(values, num_iqr) else {
        return vec![];
    };
    values
        .iter()
        .copied()
        .filter(|v| bounds.contains(*v))
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg64Mcg;

    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(filter_iqr(&[], 2.0).is_empty());
        assert!(IqrBounds::new(&[], 2.0).is_none());
    }

    #[test]
    fn test_removes_far_outlier() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0];
        let kept = filter_iqr(&values, 1.5);
        assert_eq!(kept, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0];
        let once = filter_iqr(&values, 1.5);
        let twice = filter_iqr(&once, 1.5);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        // median 3, IQR 2, k = 1 -> [1, 5]; the extremes sit exactly on the bounds
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(filter_iqr(&values, 1.0), values.to_vec());
    }

    #[test]
    fn test_zero_multiplier_keeps_only_median() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(filter_iqr(&values, 0.0), vec![3.0]);
    }

    #[test]
    fn test_preserves_order_and_subset() {
        let mut rng = Pcg64Mcg::seed_from_u64(0x5eed);
        let values: Vec<f64> = (0..500).map(|_| rng.random_range(0.0..10.0)).collect();
        let kept = filter_iqr(&values, 2.0);
        let bounds = IqrBounds::new(&values, 2.0).unwrap();

        let mut source = values.iter();
        for v in &kept {
            assert!(bounds.contains(*v));
            // Each kept value appears later in the source than the previous one
            assert!(source.any(|s| s == v), "value {v} out of order");
        }
        let expected = values.iter().filter(|v| bounds.contains(**v)).count();
        assert_eq!(kept.len(), expected);
    }
}
