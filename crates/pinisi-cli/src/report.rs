//! Console output of the analysis and cleaning commands

use std::fmt::{self, Write as _};

use pinisi_analysis::{cleaning::CleaningSummary, pipeline::AnalysisConfig, pipeline::LevelResult};

/// Formats a p-value for display.
///
/// Readable mode rounds to three decimals and shows values below `1e-3`
/// as `~0`.
pub fn format_pvalue(pvalue: f64, readable: bool) -> String {
    if !readable {
        return pvalue.to_string();
    }
    if pvalue < 1e-3 {
        "~0".to_owned()
    } else {
        format!("{pvalue:.3}")
    }
}

pub fn format_parameters(config: &AnalysisConfig) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "Pinisi data analysis with parameters:")?;
    writeln!(out, "Alpha       = {}", config.alpha)?;
    writeln!(out, "Alternative = {}", config.direction)?;
    writeln!(out, "Method      = {}", config.method)?;
    writeln!(out, "Filter      = {}", config.filter)?;
    Ok(out)
}

pub fn format_results(
    results: &[LevelResult],
    readable_pvalue: bool,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "Results")?;
    writeln!(out, "-------")?;
    writeln!(
        out,
        "{:>5} {:>6} {:>14} {:>14} {:>14} {:>22} {:>12}",
        "Level", "N", "Mean dist", "Expert dist", "Test statistic", "P-value", "Significant?"
    )?;
    for result in results {
        writeln!(
            out,
            "{:>5} {:>6} {:>14.6} {:>14.6} {:>14.3} {:>22} {:>12}",
            result.level,
            result.n(),
            result.mean_distance,
            result.expert_distance,
            result.test.statistic,
            format_pvalue(result.test.pvalue, readable_pvalue),
            result.significant,
        )?;
    }
    Ok(out)
}

pub fn format_cleaning_summary(summary: &CleaningSummary) -> Result<String, fmt::Error> {
    let rows = [
        ("Raw points", summary.raw_points),
        ("Raw users", summary.raw_users),
        ("Duplicate points removed", summary.duplicate_points),
        ("Duplicate users removed", summary.duplicate_users),
        ("Incomplete users removed", summary.incomplete_users),
        ("Points without user removed", summary.points_without_user),
        ("Users without points removed", summary.users_without_points),
        ("Unknown agents tagged", summary.unknown_agents),
        ("Retained points", summary.retained_points),
        ("Retained users", summary.retained_users),
    ];
    let mut out = String::new();
    writeln!(out, "Cleaning summary")?;
    writeln!(out, "  {}", "-".repeat(39))?;
    for (label, count) in rows {
        writeln!(out, "  {label:<30} {count:>8}")?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use pinisi_analysis::pipeline::SampleFilter;
    use pinisi_stats::hypothesis::{Direction, TestMethod, TestResult};

    use super::*;

    #[test]
    fn test_format_pvalue() {
        assert_eq!(format_pvalue(0.000_2, true), "~0");
        assert_eq!(format_pvalue(0.001, true), "0.001");
        assert_eq!(format_pvalue(0.23456, true), "0.235");
        assert_eq!(format_pvalue(0.25, false), "0.25");
    }

    #[test]
    fn test_format_parameters() {
        let config = AnalysisConfig {
            alpha: 0.1,
            direction: Direction::Greater,
            method: TestMethod::T,
            filter: SampleFilter::Iqr(2.0),
        };
        assert_eq!(
            format_parameters(&config).unwrap(),
            "Pinisi data analysis with parameters:\n\
             Alpha       = 0.1\n\
             Alternative = greater\n\
             Method      = t-test\n\
             Filter      = 2x IQR\n"
        );
    }

    #[test]
    fn test_format_results() {
        let results = [LevelResult {
            level: 3,
            expert_distance: 0.5,
            mean_distance: 0.75,
            test: TestResult {
                n: 120,
                statistic: 2.345_67,
                pvalue: 0.000_01,
                method: TestMethod::Z,
            },
            significant: true,
        }];
        let table = format_results(&results, true).unwrap();
        let row = table.lines().last().unwrap();
        let cells = row.split_whitespace().collect::<Vec<_>>();
        assert_eq!(
            cells,
            ["3", "120", "0.750000", "0.500000", "2.346", "~0", "true"]
        );
        assert!(table.lines().nth(2).unwrap().contains("Test statistic"));
    }

    #[test]
    fn test_format_cleaning_summary() {
        let summary = CleaningSummary {
            raw_points: 20,
            retained_points: 12,
            ..CleaningSummary::default()
        };
        let text = format_cleaning_summary(&summary).unwrap();
        assert!(text.contains("  Raw points                           20\n"));
        assert!(text.contains("  Retained points                      12\n"));
    }
}
