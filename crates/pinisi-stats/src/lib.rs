//! Statistical utilities for the Pinisi guess analysis.
//!
//! This crate provides the numeric building blocks used to analyze the
//! distribution of player distance errors:
//!
//! - **Descriptive statistics**: mean, sample standard deviation, median, etc.
//! - **Percentiles**: linearly interpolated quantiles
//! - **Outlier filtering**: median ± k × IQR filtering
//! - **Hypothesis testing**: one-sample z-test and t-test with directional alternatives
//! - **Histogram generation**: equal-width frequency distributions
//! - **Kernel density estimation**: Gaussian KDE with Scott's rule bandwidth
//! - **Cumulative statistics**: running mean series (law of large numbers plots)
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`percentiles`]: Quantile computation and storage
//! - [`outlier`]: Interquartile-range based outlier filtering
//! - [`hypothesis`]: One-sample significance tests
//! - [`histogram`]: Histogram construction for visualizing data distributions
//! - [`kde`]: Smoothed density curves
//! - [`cumulative`]: Running statistics over ordered samples
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use pinisi_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Filtering outliers
//!
//! ```
//! use pinisi_stats::outlier::filter_iqr;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0];
//! let kept = filter_iqr(&values, 1.5);
//! assert_eq!(kept.len(), 9);
//! ```
//!
//! ## Testing a sample mean against a reference value
//!
//! ```
//! use pinisi_stats::hypothesis::{Direction, TestMethod, one_sample_test};
//!
//! let sample = [2.0, 2.5, 3.0, 3.5, 4.0];
//! let result = one_sample_test(&sample, 1.0, TestMethod::Z, Direction::Greater).unwrap();
//! assert!(result.statistic > 0.0);
//! assert!(result.is_significant(0.05, Direction::Greater));
//! ```

pub mod cumulative;
pub mod descriptive;
pub mod histogram;
pub mod hypothesis;
pub mod kde;
pub mod outlier;
pub mod percentiles;
