use anyhow::Context;
use pinisi_analysis::cleaning::{self, UnknownAgentPolicy};

use crate::{
    data::{self, DataPaths, UserTable},
    report, util,
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct CleanArg {
    /// Record unrecognized browser agents as "Unknown" instead of failing
    #[arg(long)]
    pub allow_unknown_agents: bool,
}

pub(crate) fn run(paths: &DataPaths, arg: &CleanArg) -> anyhow::Result<()> {
    let points = data::read_points(&paths.raw_points())?;
    let table = data::read_users(&paths.raw_users())?;

    let policy = if arg.allow_unknown_agents {
        UnknownAgentPolicy::Tag
    } else {
        UnknownAgentPolicy::Fail
    };
    let cleaned =
        cleaning::clean(points, table.users, policy).context("Failed to clean raw data")?;

    util::ensure_dir(&paths.clean_dir())?;
    data::write_points(&paths.clean_points(), &cleaned.points)?;
    data::write_users(
        &paths.clean_users(),
        &UserTable {
            extra_columns: table.extra_columns,
            users: cleaned.users,
        },
    )?;

    let summary = report::format_cleaning_summary(&cleaned.summary)
        .context("Failed to format cleaning summary")?;
    print!("{summary}");
    println!();
    println!("Cleaned data saved to: {}", paths.clean_dir().display());

    Ok(())
}
