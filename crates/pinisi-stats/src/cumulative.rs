/// Running mean of `values`: element `i` is the mean of `values[..=i]`.
///
/// Plotted against the sample count, this shows the sample mean settling
/// as more players are included.
///
/// # Examples
///
/// ```
/// use pinisi_stats::cumulative::cumulative_mean;
///
/// assert_eq!(cumulative_mean(&[2.0, 4.0, 6.0]), vec![2.0, 3.0, 4.0]);
/// assert!(cumulative_mean(&[]).is_empty());
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn cumulative_mean(values: &[f64]) -> Vec<f64> {
    let mut sum = 0.0;
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            sum += v;
            sum / (i + 1) as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::descriptive;

    #[test]
    fn test_last_element_is_overall_mean() {
        let mut rng = Pcg64Mcg::seed_from_u64(42);
        let values: Vec<f64> = (0..1000).map(|_| rng.random_range(0.0..5.0)).collect();
        let running = cumulative_mean(&values);
        assert_eq!(running.len(), values.len());
        let overall = descriptive::mean(&values).unwrap();
        assert!((running.last().unwrap() - overall).abs() < 1e-9);
    }

    #[test]
    fn test_first_element_is_first_value() {
        assert_eq!(cumulative_mean(&[9.5, 0.5]), vec![9.5, 5.0]);
    }
}
