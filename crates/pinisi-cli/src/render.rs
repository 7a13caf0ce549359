//! SVG plot rendering
//!
//! Every plot is drawn with `plotters` onto an in-memory SVG document and
//! saved as `level{N}.svg`. Map-shaped plots (scatter, heatmap) take their
//! size from the level rectangle scaled to a target figure area; the others
//! use a fixed canvas.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use pinisi_analysis::{
    geometry::{Rect, figure_dimensions},
    grid::{BinGrid, GridEdges},
    point::{LatLng, LevelId},
};
use pinisi_stats::{cumulative, descriptive, histogram::Histogram, kde::GaussianKde};
use plotters::{
    coord::{Shift, types::RangedCoordf64},
    prelude::*,
};

use crate::util;

const SIZE: (u32, u32) = (640, 480);
/// Pixels per figure unit of map-shaped plots
const PIXELS_PER_UNIT: f64 = 80.0;
const KDE_POINTS: usize = 200;

const POINT_COLOR: RGBColor = RGBColor(0xd2, 0xb4, 0x8c);
const EXPERT_COLOR: RGBColor = RGBColor(0x8b, 0x45, 0x13);
const MEAN_COLOR: RGBColor = RGBColor(0x69, 0x69, 0x69);
const GRID_COLOR: RGBColor = RGBColor(0xd3, 0xd3, 0xd3);

/// Runs `draw` on a white SVG canvas of `size` pixels and returns the document.
fn render_svg<F>(size: (u32, u32), draw: F) -> anyhow::Result<String>
where
    F: FnOnce(&DrawingArea<SVGBackend<'_>, Shift>) -> anyhow::Result<()>,
{
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE)?;
        draw(&root)?;
        root.present()?;
    }
    Ok(svg)
}

/// Ensures a range has positive width.
fn widen((lo, hi): (f64, f64)) -> (f64, f64) {
    if hi - lo > f64::EPSILON {
        (lo, hi)
    } else {
        (lo - 0.5, hi + 0.5)
    }
}

fn min_max(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        })
}

fn expert_line(expert_distance: f64, y_max: f64) -> PathElement<(f64, f64)> {
    PathElement::new(
        vec![(expert_distance, 0.0), (expert_distance, y_max)],
        EXPERT_COLOR.stroke_width(4),
    )
}

/// Histogram of player distances with the expert's distance as a vertical line.
#[expect(clippy::cast_precision_loss)]
pub fn distance_histogram(
    level: LevelId,
    distances: &[f64],
    expert_distance: f64,
    num_bins: usize,
) -> anyhow::Result<String> {
    if distances.is_empty() {
        anyhow::bail!("No distances to plot for level {level}");
    }
    let histogram = Histogram::equal_width(distances.iter().copied(), num_bins);
    let (lo, hi) = widen(min_max(
        histogram
            .bins
            .iter()
            .flat_map(|bin| [bin.range.start, bin.range.end])
            .chain([expert_distance]),
    ));
    let y_max = histogram.max_count().max(1) as f64 * 1.05;

    render_svg(SIZE, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(
                format!("Player distance distribution - Level {level}"),
                ("sans-serif", 20),
            )
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(lo..hi, 0.0..y_max)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("Distance")
            .y_desc("Number of players")
            .draw()?;

        chart.draw_series(histogram.bins.iter().map(|bin| {
            Rectangle::new(
                [(bin.range.start, 0.0), (bin.range.end, bin.count as f64)],
                POINT_COLOR.filled(),
            )
        }))?;
        chart.draw_series(std::iter::once(expert_line(expert_distance, y_max)))?;
        Ok(())
    })
}

/// Kernel density curve of player distances with the expert's distance as a
/// vertical line.
pub fn distance_kde(
    level: LevelId,
    distances: &[f64],
    expert_distance: f64,
    bandwidth: Option<f64>,
) -> anyhow::Result<String> {
    let kde = GaussianKde::new(distances, bandwidth).with_context(|| {
        format!("Cannot estimate distance density for level {level}: too few or identical distances")
    })?;
    log::debug!("level {level}: KDE bandwidth {:.4}", kde.bandwidth());
    let curve = kde.curve(KDE_POINTS);
    let (lo, hi) = widen(min_max(
        curve.iter().map(|(x, _)| *x).chain([expert_distance]),
    ));
    let (_, max_density) = min_max(curve.iter().map(|(_, d)| *d));
    let y_max = max_density * 1.05;

    render_svg(SIZE, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(
                format!("Player distance distribution - Level {level}"),
                ("sans-serif", 20),
            )
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(lo..hi, 0.0..y_max)?;
        chart
            .configure_mesh()
            .x_desc("Distance")
            .y_desc("Density")
            .draw()?;

        chart.draw_series(LineSeries::new(curve, POINT_COLOR.stroke_width(2)))?;
        chart.draw_series(std::iter::once(expert_line(expert_distance, y_max)))?;
        Ok(())
    })
}

/// Running mean distance against the number of players included.
#[expect(clippy::cast_precision_loss)]
pub fn cumulative_mean_plot(
    level: LevelId,
    distances: &[f64],
    show_mean: bool,
) -> anyhow::Result<String> {
    let running = cumulative::cumulative_mean(distances);
    let Some(mean) = descriptive::mean(distances) else {
        anyhow::bail!("No distances to plot for level {level}");
    };
    let (x_lo, x_hi) = widen((1.0, running.len() as f64));
    let (y_lo, y_hi) = widen(min_max(running.iter().copied().chain([mean])));

    render_svg(SIZE, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(
                format!("Mean player distance by number of players - Level {level}"),
                ("sans-serif", 20),
            )
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;
        chart
            .configure_mesh()
            .x_desc("Number of players")
            .y_desc("Mean distance")
            .draw()?;

        chart.draw_series(LineSeries::new(
            running
                .iter()
                .enumerate()
                .map(|(i, m)| ((i + 1) as f64, *m)),
            EXPERT_COLOR.stroke_width(3),
        ))?;
        if show_mean {
            chart.draw_series(std::iter::once(PathElement::new(
                vec![(x_lo, mean), (x_hi, mean)],
                MEAN_COLOR.stroke_width(2),
            )))?;
        }
        Ok(())
    })
}

/// Pixel size of a map plot over `rect`.
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn map_size(rect: &Rect, figure_area: f64) -> anyhow::Result<(u32, u32)> {
    let (width, height) = rect.dimensions();
    let (fig_width, fig_height) = figure_dimensions(width, height, figure_area);
    let to_pixels = |units: f64| (units * PIXELS_PER_UNIT).round();
    let (px_width, px_height) = (to_pixels(fig_width), to_pixels(fig_height));
    let valid = |px: f64| px.is_finite() && (1.0..=f64::from(u32::MAX)).contains(&px);
    if !(valid(px_width) && valid(px_height)) {
        anyhow::bail!(
            "Cannot size a {fig_width}x{fig_height} figure for rectangle {:?}",
            rect.bounds()
        );
    }
    Ok((px_width as u32, px_height as u32))
}

/// Chart spanning `rect` with north up and no margins.
fn map_chart<'a, 'b>(
    root: &'a DrawingArea<SVGBackend<'b>, Shift>,
    rect: &Rect,
) -> anyhow::Result<ChartContext<'a, SVGBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>>
{
    let (top_lat, top_lng, bot_lat, bot_lng) = rect.bounds();
    Ok(ChartBuilder::on(root).build_cartesian_2d(top_lng..bot_lng, bot_lat..top_lat)?)
}

/// Heatmap of a level's bin grid; darker cells hold more points.
#[expect(clippy::cast_precision_loss)]
pub fn heatmap(grid: &BinGrid, rect: &Rect, figure_area: f64) -> anyhow::Result<String> {
    let size = map_size(rect, figure_area)?;
    let max_count = grid.max_count().max(1) as f64;
    render_svg(size, |root| {
        let mut chart = map_chart(root, rect)?;
        let cells = grid.counts().iter().enumerate().flat_map(|(row, counts)| {
            let (lat_lo, lat_hi) = grid.row_lat_range(row);
            counts.iter().enumerate().map(move |(col, count)| {
                let (lng_lo, lng_hi) = grid.col_lng_range(col);
                Rectangle::new(
                    [(lng_lo, lat_lo), (lng_hi, lat_hi)],
                    heat_color(*count as f64 / max_count).filled(),
                )
            })
        });
        chart.draw_series(cells)?;
        Ok(())
    })
}

/// Color between white (0) and saddle brown (1).
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn heat_color(intensity: f64) -> RGBColor {
    let t = intensity.clamp(0.0, 1.0);
    let channel = |full: u8| {
        let value = 255.0 + (f64::from(full) - 255.0) * t;
        value.round() as u8
    };
    RGBColor(
        channel(EXPERT_COLOR.0),
        channel(EXPERT_COLOR.1),
        channel(EXPERT_COLOR.2),
    )
}

/// Scatter of player positions inside `rect`, optionally overlaid with grid
/// lines.
pub fn scatter<I>(
    positions: I,
    rect: &Rect,
    figure_area: f64,
    grid: Option<&GridEdges>,
) -> anyhow::Result<String>
where
    I: IntoIterator<Item = LatLng>,
{
    let size = map_size(rect, figure_area)?;
    let (top_lat, top_lng, bot_lat, bot_lng) = rect.bounds();
    render_svg(size, |root| {
        let mut chart = map_chart(root, rect)?;
        chart.draw_series(
            positions
                .into_iter()
                .map(|p| Circle::new((p.lng, p.lat), 3, POINT_COLOR.filled())),
        )?;
        if let Some(edges) = grid {
            let rows = edges
                .lat_edges
                .iter()
                .map(|lat| vec![(top_lng, *lat), (bot_lng, *lat)]);
            let cols = edges
                .lng_edges
                .iter()
                .map(|lng| vec![(*lng, bot_lat), (*lng, top_lat)]);
            chart.draw_series(
                rows.chain(cols)
                    .map(|line| PathElement::new(line, GRID_COLOR.stroke_width(1))),
            )?;
        }
        Ok(())
    })
}

/// Writes `svg` to `dir/level{level}.svg`, creating `dir` if needed.
pub fn save_svg(dir: &Path, level: LevelId, svg: &str) -> anyhow::Result<PathBuf> {
    util::ensure_dir(dir)?;
    let path = dir.join(format!("level{level}.svg"));
    fs::write(&path, svg)
        .with_context(|| format!("Failed to write plot file: {}", path.display()))?;
    log::info!("saved {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use pinisi_analysis::grid::{bin_points, compute_grid};

    use super::*;

    /// Occurrences of `attr="#rrggbb"` regardless of hex digit case.
    fn count_color(svg: &str, attr: &str, color: RGBColor) -> usize {
        let needle = format!(r##"{attr}="#{:02x}{:02x}{:02x}""##, color.0, color.1, color.2);
        svg.to_lowercase().matches(&needle).count()
    }

    fn rect() -> Rect {
        Rect::from_polygon(&[LatLng::new(1.0, 0.0), LatLng::new(0.0, 2.0)]).unwrap()
    }

    #[test]
    fn test_histogram_svg() {
        let distances = (1..=50).map(f64::from).collect::<Vec<_>>();
        let svg = distance_histogram(2, &distances, 10.0, 10).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(count_color(&svg, "fill", POINT_COLOR), 10);
        assert_eq!(count_color(&svg, "stroke", EXPERT_COLOR), 1);
        assert!(svg.contains("Level 2"));
        assert!(distance_histogram(2, &[], 1.0, 10).is_err());
    }

    #[test]
    fn test_kde_svg() {
        let svg = distance_kde(1, &[1.0, 2.0, 2.5, 4.0], 3.0, None).unwrap();
        assert_eq!(count_color(&svg, "stroke", POINT_COLOR), 1);
        assert_eq!(count_color(&svg, "stroke", EXPERT_COLOR), 1);
        assert!(distance_kde(1, &[2.0, 2.0], 3.0, None).is_err());
    }

    #[test]
    fn test_cumulative_mean_svg() {
        let svg = cumulative_mean_plot(4, &[1.0, 3.0, 2.0], true).unwrap();
        assert_eq!(count_color(&svg, "stroke", EXPERT_COLOR), 1);
        assert_eq!(count_color(&svg, "stroke", MEAN_COLOR), 1);
        let svg = cumulative_mean_plot(4, &[1.0, 3.0, 2.0], false).unwrap();
        assert_eq!(count_color(&svg, "stroke", MEAN_COLOR), 0);
        assert!(cumulative_mean_plot(4, &[2.0], true).is_ok());
        assert!(cumulative_mean_plot(4, &[], false).is_err());
    }

    #[test]
    fn test_heatmap_svg() {
        let rect = rect();
        let edges = compute_grid(&rect, 8.0, 48.0).unwrap();
        let grid = bin_points(
            [LatLng::new(0.9, 0.1), LatLng::new(0.1, 1.9), LatLng::new(0.9, 0.2)],
            &edges,
        )
        .unwrap();
        let svg = heatmap(&grid, &rect, 48.0).unwrap();
        // Background plus one rectangle per cell
        assert_eq!(svg.matches("<rect").count(), 1 + 8);
        // Fullest cell gets the darkest color
        assert_eq!(count_color(&svg, "fill", EXPERT_COLOR), 1);
    }

    #[test]
    fn test_scatter_svg() {
        let rect = rect();
        let edges = compute_grid(&rect, 8.0, 48.0).unwrap();
        let positions = [LatLng::new(0.5, 1.0), LatLng::new(0.2, 0.3)];
        let svg = scatter(positions, &rect, 48.0, Some(&edges)).unwrap();
        assert_eq!(svg.matches("<circle").count(), 2);
        assert_eq!(count_color(&svg, "stroke", GRID_COLOR), 3 + 5);
        let svg = scatter(positions, &rect, 48.0, None).unwrap();
        assert_eq!(count_color(&svg, "stroke", GRID_COLOR), 0);
    }

    #[test]
    fn test_map_size_follows_aspect_ratio() {
        let (width, height) = map_size(&rect(), 48.0).unwrap();
        assert!((f64::from(width) / f64::from(height) - 2.0).abs() < 0.01);
        assert!((f64::from(width * height) / (48.0 * 80.0 * 80.0) - 1.0).abs() < 0.01);

        let flat = Rect::from_polygon(&[LatLng::new(1.0, 0.0), LatLng::new(1.0, 2.0)]).unwrap();
        assert!(map_size(&flat, 48.0).is_err());
    }

    #[test]
    fn test_heat_color() {
        assert_eq!(heat_color(0.0), RGBColor(0xff, 0xff, 0xff));
        assert_eq!(heat_color(1.0), EXPERT_COLOR);
        assert_eq!(heat_color(2.0), EXPERT_COLOR);
    }

    #[test]
    fn test_save_svg() {
        let dir = std::env::temp_dir().join(format!("pinisi-render-{}", std::process::id()));
        let path = save_svg(&dir.join("plots"), 3, "<svg/>").unwrap();
        assert_eq!(path.file_name().unwrap(), "level3.svg");
        assert_eq!(fs::read_to_string(&path).unwrap(), "<svg/>");
        fs::remove_dir_all(&dir).unwrap();
    }
}
