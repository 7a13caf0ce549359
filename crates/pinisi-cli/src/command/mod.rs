use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::data::DataPaths;

use self::{analyze::AnalyzeArg, clean::CleanArg, lln::LlnArg, plot::PlotArg};

mod analyze;
mod clean;
mod lln;
mod plot;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "Statistical analysis for Pinisi data", long_about = None)]
pub struct CommandArgs {
    /// Directory holding `raw/`, `clean/`, `levels.json`, `truth_ID` and `expert_ID`
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Clean raw point and user logs into `clean/`
    Clean(#[clap(flatten)] CleanArg),
    /// Test each level's mean player distance against the expert's distance
    Analyze(#[clap(flatten)] AnalyzeArg),
    /// Plot the running mean distance against the number of players
    Lln(#[clap(flatten)] LlnArg),
    /// Plot player positions per level as a scatter or a heatmap
    Plot(#[clap(flatten)] PlotArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    let paths = DataPaths::new(args.data_dir);
    match args.mode {
        Mode::Clean(arg) => clean::run(&paths, &arg)?,
        Mode::Analyze(arg) => analyze::run(&paths, &arg)?,
        Mode::Lln(arg) => lln::run(&paths, &arg)?,
        Mode::Plot(arg) => plot::run(&paths, &arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pinisi_stats::hypothesis::Direction;

    use super::*;

    fn parse(args: &[&str]) -> Result<CommandArgs, clap::Error> {
        CommandArgs::try_parse_from(std::iter::once("pinisi").chain(args.iter().copied()))
    }

    #[test]
    fn test_analyze_defaults() {
        let args = parse(&["analyze"]).unwrap();
        assert_eq!(args.data_dir, PathBuf::from("data"));
        let Mode::Analyze(arg) = args.mode else {
            panic!("expected analyze");
        };
        assert_eq!(arg.alpha, 0.05);
        assert_eq!(arg.direction, Direction::Unequal);
        assert_eq!(arg.num_iqr, 2.0);
        assert_eq!(arg.bins, 10);
        assert!(!arg.rectangle && !arg.readable_pvalue && !arg.t_test && !arg.kde);
        assert!(arg.save_to.is_none());
    }

    #[test]
    fn test_analyze_flags() {
        let args = parse(&[
            "analyze", "-a", "0.1", "-d", "less", "-r", "-i", "1.5", "-p", "-t", "-s", "plots",
            "--data-dir", "elsewhere",
        ])
        .unwrap();
        assert_eq!(args.data_dir, PathBuf::from("elsewhere"));
        let Mode::Analyze(arg) = args.mode else {
            panic!("expected analyze");
        };
        assert_eq!(arg.alpha, 0.1);
        assert_eq!(arg.direction, Direction::Less);
        assert_eq!(arg.num_iqr, 1.5);
        assert!(arg.rectangle && arg.readable_pvalue && arg.t_test);
        assert_eq!(arg.save_to, Some(PathBuf::from("plots")));
    }

    #[test]
    fn test_invalid_arguments_are_rejected() {
        assert!(parse(&["analyze", "-a", "1.5"]).is_err());
        assert!(parse(&["analyze", "-a", "-0.5"]).is_err());
        assert!(parse(&["analyze", "-d", "sideways"]).is_err());
        assert!(parse(&["analyze", "--num-iqr=-1"]).is_err());
        assert!(parse(&["analyze", "--bins", "0"]).is_err());
        assert!(parse(&["lln", "--num-iqr=-0.5"]).is_err());
        assert!(parse(&["plot"]).is_err());
        assert!(parse(&["plot", "-s", "out", "--fig-area", "0"]).is_err());
    }

    #[test]
    fn test_plot_arguments() {
        let args = parse(&["plot", "-s", "out", "--kind", "scatter", "--grid-area", "192"]).unwrap();
        let Mode::Plot(arg) = args.mode else {
            panic!("expected plot");
        };
        assert_eq!(arg.kind, plot::PlotKind::Scatter);
        assert_eq!(arg.grid_area, 192.0);
        assert_eq!(arg.fig_area, 48.0);
        assert!(!arg.no_grid);
    }

    #[test]
    fn test_clean_and_lln_arguments() {
        let args = parse(&["clean", "--allow-unknown-agents"]).unwrap();
        let Mode::Clean(arg) = args.mode else {
            panic!("expected clean");
        };
        assert!(arg.allow_unknown_agents);

        let args = parse(&["lln", "-m", "-i", "0"]).unwrap();
        let Mode::Lln(arg) = args.mode else {
            panic!("expected lln");
        };
        assert!(arg.show_mean);
        assert_eq!(arg.num_iqr, 0.0);
    }
}
