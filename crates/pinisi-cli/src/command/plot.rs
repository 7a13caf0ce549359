//! Per-level position plots
//!
//! Scatter plots show every in-rectangle guess, optionally with the binning
//! grid drawn over them; heatmaps show the binned counts.

use std::path::PathBuf;

use anyhow::Context;
use pinisi_analysis::{
    distance::PointSets,
    grid, level,
    point::{LEVEL_IDS, Point},
};

use crate::{
    data::{AnalysisInput, DataPaths},
    render, util,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum PlotKind {
    Scatter,
    Heatmap,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlotArg {
    /// Kind of plot to draw
    #[arg(long, value_enum, default_value_t = PlotKind::Heatmap)]
    pub kind: PlotKind,

    /// Target number of grid cells per level
    #[arg(long, default_value_t = 96.0, value_parser = util::parse_area)]
    pub grid_area: f64,

    /// Target figure area, in figure units squared
    #[arg(long, default_value_t = 48.0, value_parser = util::parse_area)]
    pub fig_area: f64,

    /// Do not draw grid lines on scatter plots
    #[arg(long)]
    pub no_grid: bool,

    /// Directory for saving plots
    #[arg(short, long)]
    pub save_to: PathBuf,
}

pub(crate) fn run(paths: &DataPaths, arg: &PlotArg) -> anyhow::Result<()> {
    let input = AnalysisInput::load(paths)?;
    let population = PointSets::split(&input.points, input.refs).population;

    for level_id in LEVEL_IDS {
        let rect = input
            .levels
            .get(level_id)
            .with_context(|| format!("Level {level_id} is missing from the levels file"))?;
        let svg = match arg.kind {
            PlotKind::Heatmap => {
                let bins = grid::bin_level(&population, rect, level_id, arg.grid_area, arg.fig_area)
                    .with_context(|| format!("Failed to bin points of level {level_id}"))?;
                render::heatmap(&bins, rect, arg.fig_area)?
            }
            PlotKind::Scatter => {
                let edges = if arg.no_grid {
                    None
                } else {
                    Some(
                        grid::compute_grid(rect, arg.grid_area, arg.fig_area).with_context(
                            || format!("Failed to compute grid of level {level_id}"),
                        )?,
                    )
                };
                let positions =
                    level::points_in_rect(&population, rect, level_id).map(Point::position);
                render::scatter(positions, rect, arg.fig_area, edges.as_ref())?
            }
        };
        render::save_svg(&arg.save_to, level_id, &svg)?;
    }

    Ok(())
}
