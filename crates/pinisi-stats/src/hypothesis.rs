//! One-sample significance tests
//!
//! Compares the mean of a sample (player distance errors for one level)
//! against a fixed reference value (the expert's distance error).
//!
//! # Test statistic
//!
//! Both methods use the same statistic:
//!
//! ```text
//! statistic = (mean(sample) - reference) / (s / sqrt(n))
//! ```
//!
//! where `s` is the sample standard deviation (`n - 1` denominator).
//!
//! - [`TestMethod::Z`] reads p-values from the standard normal distribution
//!   (large-sample approximation).
//! - [`TestMethod::T`] reads p-values from Student's t distribution with
//!   `n - 1` degrees of freedom.
//!
//! # P-values
//!
//! | Direction              | p-value          |
//! |------------------------|------------------|
//! | [`Direction::Unequal`] | `2 × SF(|stat|)` |
//! | [`Direction::Greater`] | `SF(stat)`       |
//! | [`Direction::Less`]    | `CDF(stat)`      |
//!
//! `SF` is the survival function `1 - CDF`, evaluated directly so that far
//! tails keep their precision. The two-sided p-value is the tail
//! probability, never the density at the statistic.
//!
//! # Significance
//!
//! See [`is_significant`]. One-sided decisions additionally require the
//! statistic to point in the hypothesized direction.

use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

use crate::descriptive::DescriptiveStats;

/// Direction of the alternative hypothesis.
///
/// Parses case-insensitively from `unequal`, `greater` or `less`; any other
/// string is an invalid argument.
///
/// ```
/// use pinisi_stats::hypothesis::Direction;
///
/// assert_eq!("greater".parse::<Direction>().unwrap(), Direction::Greater);
/// assert!("sideways".parse::<Direction>().is_err());
/// ```
#[derive(
    Default,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    derive_more::Display,
    derive_more::FromStr,
    derive_more::IsVariant,
)]
pub enum Direction {
    /// Sample mean differs from the reference (two-sided).
    #[default]
    #[display("unequal")]
    Unequal,
    /// Sample mean is greater than the reference.
    #[display("greater")]
    Greater,
    /// Sample mean is less than the reference.
    #[display("less")]
    Less,
}

/// Distribution used to turn the statistic into a p-value.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum TestMethod {
    /// Standard normal distribution.
    #[default]
    #[display("z-test")]
    Z,
    /// Student's t distribution with `n - 1` degrees of freedom.
    #[display("t-test")]
    T,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum TestError {
    #[display("at least 2 samples are required for a one-sample test, got {count}")]
    InsufficientSamples { count: usize },
    #[display("sample has zero variance, test statistic is undefined")]
    ZeroVariance,
    #[display("failed to construct {distribution} distribution")]
    Distribution { distribution: &'static str },
}

/// Result of a one-sample test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestResult {
    /// Number of samples tested.
    pub n: usize,
    /// Standardized difference between the sample mean and the reference.
    pub statistic: f64,
    /// Probability of a statistic at least this extreme under the null hypothesis.
    pub pvalue: f64,
    /// Distribution the p-value was read from.
    pub method: TestMethod,
}

impl TestResult {
    /// Shorthand for [`is_significant`] on this result.
    #[must_use]
    pub fn is_significant(&self, alpha: f64, direction: Direction) -> bool {
        is_significant(self.statistic, self.pvalue, alpha, direction)
    }
}

/// Tests whether the mean of `sample` equals `reference`.
///
/// # Examples
///
/// ```
/// use pinisi_stats::hypothesis::{Direction, TestMethod, one_sample_test};
///
/// // mean 3, s = 1.5811, se = 0.7071
/// let result = one_sample_test(&[1.0, 2.0, 3.0, 4.0, 5.0], 2.0, TestMethod::T, Direction::Unequal)
///     .unwrap();
/// assert!((result.statistic - 2.0_f64.sqrt()).abs() < 1e-9);
/// assert!((result.pvalue - 0.2302).abs() < 1e-3);
/// ```
pub fn one_sample_test(
    sample: &[f64],
    reference: f64,
    method: TestMethod,
    direction: Direction,
) -> Result<TestResult, TestError> {
    let n = sample.len();
    if n < 2 {
        return Err(TestError::InsufficientSamples { count: n });
    }
    let stats =
        DescriptiveStats::new(sample.iter().copied()).ok_or(TestError::InsufficientSamples {
            count: n,
        })?;
    if stats.std_dev <= 0.0 {
        return Err(TestError::ZeroVariance);
    }

    #[expect(clippy::cast_precision_loss)]
    let standard_error = stats.std_dev / (n as f64).sqrt();
    let statistic = (stats.mean - reference) / standard_error;

    let pvalue = match method {
        TestMethod::Z => {
            let normal = Normal::new(0.0, 1.0).map_err(|_| TestError::Distribution {
                distribution: "standard normal",
            })?;
            tail_probability(&normal, statistic, direction)
        }
        TestMethod::T => {
            #[expect(clippy::cast_precision_loss)]
            let freedom = (n - 1) as f64;
            let student = StudentsT::new(0.0, 1.0, freedom).map_err(|_| {
                TestError::Distribution {
                    distribution: "Student's t",
                }
            })?;
            tail_probability(&student, statistic, direction)
        }
    };

    Ok(TestResult {
        n,
        statistic,
        pvalue,
        method,
    })
}

fn tail_probability<D>(distribution: &D, statistic: f64, direction: Direction) -> f64
where
    D: ContinuousCDF<f64, f64>,
{
    let pvalue = match direction {
        Direction::Unequal => 2.0 * distribution.sf(statistic.abs()),
        Direction::Greater => distribution.sf(statistic),
        Direction::Less => distribution.cdf(statistic),
    };
    pvalue.clamp(0.0, 1.0)
}

/// Decides whether a test outcome is significant at level `alpha`.
///
/// - [`Direction::Unequal`]: `pvalue < alpha / 2`
/// - [`Direction::Greater`]: `pvalue < alpha` and `statistic > 0`
/// - [`Direction::Less`]: `pvalue < alpha` and `statistic < 0`
///
/// The decision is monotonic in `alpha`: raising `alpha` never turns a
/// significant outcome into an insignificant one.
///
/// # Examples
///
/// ```
/// use pinisi_stats::hypothesis::{Direction, is_significant};
///
/// assert!(is_significant(2.5, 0.006, 0.05, Direction::Greater));
/// // The statistic points the wrong way for a "less" alternative
/// assert!(!is_significant(2.5, 0.006, 0.05, Direction::Less));
/// assert!(!is_significant(2.5, 0.03, 0.05, Direction::Unequal));
/// ```
#[must_use]
pub fn is_significant(statistic: f64, pvalue: f64, alpha: f64, direction: Direction) -> bool {
    match direction {
        Direction::Unequal => pvalue < alpha / 2.0,
        Direction::Greater => pvalue < alpha && statistic > 0.0,
        Direction::Less => pvalue < alpha && statistic < 0.0,
    }
}
