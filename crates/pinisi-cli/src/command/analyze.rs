//! Significance test of player distances against the expert
//!
//! For every level the players' distances from the truth point are narrowed
//! by the chosen filter and their mean is compared with the expert's
//! distance.

use std::path::PathBuf;

use anyhow::Context;
use pinisi_analysis::pipeline::{self, AnalysisConfig, LevelSamples, SampleFilter};
use pinisi_stats::hypothesis::{Direction, TestMethod};

use crate::{
    data::{AnalysisInput, DataPaths},
    render, report, util,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AnalyzeArg {
    /// Significance level of the test
    #[arg(short, long, default_value_t = 0.05, value_parser = util::parse_alpha)]
    pub alpha: f64,

    /// Direction of the alternative hypothesis: unequal, greater or less
    #[arg(short, long, default_value_t = Direction::Unequal)]
    pub direction: Direction,

    /// Keep only points inside the level rectangle. Takes precedence over --num-iqr
    #[arg(short, long)]
    pub rectangle: bool,

    /// Drop distances outside median ± num_iqr × IQR. 0 disables filtering
    #[arg(short = 'i', long, default_value_t = 2.0, value_parser = util::parse_num_iqr)]
    pub num_iqr: f64,

    /// Show p-values rounded to 3 decimals, with values below 0.001 as ~0
    #[arg(short = 'p', long = "format-pvalue")]
    pub readable_pvalue: bool,

    /// Use Student's t distribution instead of the normal distribution
    #[arg(short, long)]
    pub t_test: bool,

    /// Plot density curves instead of histograms
    #[arg(long)]
    pub kde: bool,

    /// Kernel bandwidth of density curves (default: Scott's rule)
    #[arg(long, requires = "kde")]
    pub bandwidth: Option<f64>,

    /// Number of histogram bins
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u16).range(1..))]
    pub bins: u16,

    /// Directory for saving distance plots
    #[arg(short, long)]
    pub save_to: Option<PathBuf>,
}

impl AnalyzeArg {
    fn config(&self) -> AnalysisConfig {
        AnalysisConfig {
            alpha: self.alpha,
            direction: self.direction,
            method: if self.t_test {
                TestMethod::T
            } else {
                TestMethod::Z
            },
            filter: SampleFilter::from_options(self.rectangle, self.num_iqr),
        }
    }
}

pub(crate) fn run(paths: &DataPaths, arg: &AnalyzeArg) -> anyhow::Result<()> {
    let config = arg.config();
    let input = AnalysisInput::load(paths)?;
    let samples = LevelSamples::collect(&input.points, &input.levels, input.refs, config.filter)
        .context("Failed to collect level distances")?;

    if let Some(dir) = &arg.save_to {
        for s in &samples {
            let svg = if arg.kde {
                render::distance_kde(s.level, &s.distances, s.expert_distance, arg.bandwidth)?
            } else {
                render::distance_histogram(
                    s.level,
                    &s.distances,
                    s.expert_distance,
                    usize::from(arg.bins),
                )?
            };
            render::save_svg(dir, s.level, &svg)?;
        }
    }

    let results = pipeline::analyze_samples(&samples, &config).context("Failed to run tests")?;

    let parameters =
        report::format_parameters(&config).context("Failed to format analysis parameters")?;
    let table = report::format_results(&results, arg.readable_pvalue)
        .context("Failed to format analysis results")?;
    print!("{parameters}");
    println!();
    print!("{table}");

    Ok(())
}
