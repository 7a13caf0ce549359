use std::ops::Range;

/// Equal-width frequency table of a distance sample.
///
/// The data range `[min, max]` is divided into equal-width bins. Every bin is
/// half-open except the last one, which also includes `max`, so the bin
/// counts always add up to the number of input values.
#[derive(Debug, Clone)]
pub struct Histogram {
    /// Ascending, contiguous bins
    pub bins: Vec<HistogramBin>,
}

/// One histogram bar.
#[derive(Debug, Clone)]
pub struct HistogramBin {
    /// Covered values, start inclusive
    pub range: Range<f64>,
    pub count: u64,
}

impl Histogram {
    /// Creates an equal-width histogram with `num_bins` bins.
    ///
    /// When every value is identical the range is widened to
    /// `[value - 0.5, value + 0.5]` so that bins keep a positive width.
    ///
    /// # Returns
    ///
    /// A `Histogram` with bins populated based on the input values. Empty
    /// input or `num_bins == 0` yields a histogram without bins.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pinisi_stats::histogram::Histogram;
    /// let values = [50.0, 20.0, 80.0, 10.0, 90.0, 30.0, 70.0, 40.0, 60.0, 100.0];
    /// let histogram = Histogram::equal_width(values, 3);
    /// assert_eq!(histogram.bins.len(), 3);
    /// assert_eq!(histogram.total_count(), 10);
    /// assert_eq!(histogram.bins[0].range.start, 10.0);
    /// assert_eq!(histogram.bins[0].count, 3);
    /// ```
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    #[must_use]
    pub fn equal_width<I>(values: I, num_bins: usize) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let values = values.into_iter().collect::<Vec<_>>();
        if values.is_empty() || num_bins == 0 {
            return Self { bins: vec![] };
        }

        let mut min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max - min < f64::EPSILON {
            min -= 0.5;
            max += 0.5;
        }
        let bin_width = (max - min) / num_bins as f64;

        let mut bins = (0..num_bins)
            .map(|bin_idx| {
                // Recompute each boundary to avoid floating-point accumulation
                let start = min + bin_idx as f64 * bin_width;
                let end = if bin_idx + 1 == num_bins {
                    max.next_up()
                } else {
                    min + (bin_idx + 1) as f64 * bin_width
                };
                HistogramBin {
                    range: start..end,
                    count: 0,
                }
            })
            .collect::<Vec<_>>();

        for val in values {
            let idx = ((val - min) / bin_width).floor() as usize;
            bins[idx.min(num_bins - 1)].count += 1;
        }

        Self { bins }
    }

    /// Sum of all bin counts.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.bins.iter().map(|bin| bin.count).sum()
    }

    /// Largest bin count, or 0 for an empty histogram.
    #[must_use]
    pub fn max_count(&self) -> u64 {
        self.bins.iter().map(|bin| bin.count).max().unwrap_or(0)
    }
}
