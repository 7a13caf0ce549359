//! Law of large numbers plots
//!
//! Shows how the mean distance settles as players are added one by one.

use std::path::PathBuf;

use anyhow::Context;
use pinisi_analysis::pipeline::{LevelSamples, SampleFilter};
use pinisi_stats::descriptive;

use crate::{
    data::{AnalysisInput, DataPaths},
    render, util,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct LlnArg {
    /// Keep only points inside the level rectangle. Takes precedence over --num-iqr
    #[arg(short, long)]
    pub rectangle: bool,

    /// Drop distances outside median ± num_iqr × IQR. 0 disables filtering
    #[arg(short = 'i', long, default_value_t = 2.0, value_parser = util::parse_num_iqr)]
    pub num_iqr: f64,

    /// Draw the overall mean as a dashed line
    #[arg(short = 'm', long)]
    pub show_mean: bool,

    /// Directory for saving plots
    #[arg(short, long)]
    pub save_to: Option<PathBuf>,
}

pub(crate) fn run(paths: &DataPaths, arg: &LlnArg) -> anyhow::Result<()> {
    let filter = SampleFilter::from_options(arg.rectangle, arg.num_iqr);
    let input = AnalysisInput::load(paths)?;
    let samples = LevelSamples::collect(&input.points, &input.levels, input.refs, filter)
        .context("Failed to collect level distances")?;

    println!("Running mean distance (filter: {filter})");
    println!("  {:>5} {:>8} {:>14}", "Level", "Players", "Mean distance");
    for s in &samples {
        let mean = descriptive::mean(&s.distances).unwrap_or(f64::NAN);
        println!("  {:>5} {:>8} {:>14.6}", s.level, s.distances.len(), mean);

        if let Some(dir) = &arg.save_to {
            let svg = render::cumulative_mean_plot(s.level, &s.distances, arg.show_mean)?;
            render::save_svg(dir, s.level, &svg)?;
        }
    }

    Ok(())
}
