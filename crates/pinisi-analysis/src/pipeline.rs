//! Per-level analysis pipeline
//!
//! For every level: split out the reference players, compute the population's
//! distance errors, narrow them with a [`SampleFilter`], then test their mean
//! against the expert's distance.

use pinisi_stats::{
    descriptive,
    hypothesis::{self, Direction, TestError, TestMethod, TestResult},
    outlier,
};

use crate::{
    distance::{self, PointSets, ReferenceError, ReferenceIds},
    level::{self, LevelRects},
    point::{LEVEL_IDS, LevelId, Point},
};

/// How the population sample of a level is narrowed before testing.
#[derive(Default, Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::IsVariant)]
pub enum SampleFilter {
    /// Keep every distance.
    #[default]
    #[display("None")]
    None,
    /// Keep distances within `median ± k × IQR`.
    #[display("{_0}x IQR")]
    Iqr(f64),
    /// Keep only points inside the level rectangle.
    #[display("level rectangle")]
    Rectangle,
}

impl SampleFilter {
    /// Resolves command line flags into a filter.
    ///
    /// Rectangle mode wins over IQR; an IQR multiplier of zero disables
    /// filtering.
    ///
    /// ```
    /// use pinisi_analysis::pipeline::SampleFilter;
    ///
    /// assert_eq!(SampleFilter::from_options(true, 1.5), SampleFilter::Rectangle);
    /// assert_eq!(SampleFilter::from_options(false, 1.5), SampleFilter::Iqr(1.5));
    /// assert_eq!(SampleFilter::from_options(false, 0.0), SampleFilter::None);
    /// ```
    #[must_use]
    pub fn from_options(rectangle: bool, num_iqr: f64) -> Self {
        if rectangle {
            Self::Rectangle
        } else if num_iqr > 0.0 {
            Self::Iqr(num_iqr)
        } else {
            Self::None
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PipelineError {
    #[display("reference point lookup failed")]
    Reference(ReferenceError),
    #[display("level {level} is missing from the levels document")]
    MissingLevel { level: LevelId },
    #[display("test failed for level {level}")]
    Test { level: LevelId, source: TestError },
}

/// Filtered distance sample of one level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSamples {
    pub level: LevelId,
    /// Population distances from the truth point, in population order
    pub distances: Vec<f64>,
    /// Expert distance from the truth point
    pub expert_distance: f64,
}

impl LevelSamples {
    /// Collects the filtered samples of every level, in level order.
    pub fn collect(
        points: &[Point],
        levels: &LevelRects,
        refs: ReferenceIds,
        filter: SampleFilter,
    ) -> Result<Vec<Self>, PipelineError> {
        let sets = PointSets::split(points, refs);
        LEVEL_IDS
            .map(|level| Self::collect_level(&sets, levels, level, filter))
            .collect()
    }

    fn collect_level(
        sets: &PointSets,
        levels: &LevelRects,
        level: LevelId,
        filter: SampleFilter,
    ) -> Result<Self, PipelineError> {
        let population = match filter {
            SampleFilter::Rectangle => {
                let rect = levels
                    .get(level)
                    .ok_or(PipelineError::MissingLevel { level })?;
                level::points_in_rect(&sets.population, rect, level)
                    .cloned()
                    .collect()
            }
            SampleFilter::None | SampleFilter::Iqr(_) => sets.population.clone(),
        };
        let (distances, expert_distance) =
            distance::per_level_distances(&sets.truth, &sets.expert, &population, level)
                .map_err(PipelineError::Reference)?;
        let distances = match filter {
            SampleFilter::Iqr(num_iqr) => outlier::filter_iqr(&distances, num_iqr),
            SampleFilter::None | SampleFilter::Rectangle => distances,
        };
        log::debug!(
            "level {level}: {} distances kept with filter {filter}",
            distances.len()
        );
        Ok(Self {
            level,
            distances,
            expert_distance,
        })
    }
}

/// Parameters of an analysis run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisConfig {
    pub alpha: f64,
    pub direction: Direction,
    pub method: TestMethod,
    pub filter: SampleFilter,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            direction: Direction::default(),
            method: TestMethod::default(),
            filter: SampleFilter::Iqr(2.0),
        }
    }
}

/// Test outcome of one level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelResult {
    pub level: LevelId,
    pub expert_distance: f64,
    pub mean_distance: f64,
    pub test: TestResult,
    pub significant: bool,
}

impl LevelResult {
    #[must_use]
    pub fn n(&self) -> usize {
        self.test.n
    }
}

/// Runs the configured test on each level's samples.
pub fn analyze_samples(
    samples: &[LevelSamples],
    config: &AnalysisConfig,
) -> Result<Vec<LevelResult>, PipelineError> {
    samples
        .iter()
        .map(|s| {
            let test = hypothesis::one_sample_test(
                &s.distances,
                s.expert_distance,
                config.method,
                config.direction,
            )
            .map_err(|source| PipelineError::Test {
                level: s.level,
                source,
            })?;
            let mean_distance = descriptive::mean(&s.distances).unwrap_or(f64::NAN);
            Ok(LevelResult {
                level: s.level,
                expert_distance: s.expert_distance,
                mean_distance,
                test,
                significant: test.is_significant(config.alpha, config.direction),
            })
        })
        .collect()
}

/// Collects samples and tests every level in one go.
pub fn analyze(
    points: &[Point],
    levels: &LevelRects,
    refs: ReferenceIds,
    config: &AnalysisConfig,
) -> Result<Vec<LevelResult>, PipelineError> {
    let samples = LevelSamples::collect(points, levels, refs, config.filter)?;
    analyze_samples(&samples, config)
}
