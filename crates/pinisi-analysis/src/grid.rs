//! Spatial binning for heatmaps
//!
//! A level rectangle is divided into a grid whose cell count approximates a
//! target, with the number of rows and columns following the rectangle's
//! aspect ratio. Points are then counted per cell.
//!
//! # Grid shape
//!
//! The rectangle is first scaled to a figure of `figure_area` square units
//! (see [`figure_dimensions`]). With `factor = sqrt(cell_count / figure_area)`:
//!
//! ```text
//! rows    = round(fig_height × factor)   (latitude bins)
//! columns = round(fig_width  × factor)   (longitude bins)
//! ```
//!
//! so `rows × columns ≈ cell_count` and cells are close to square on the figure.
//!
//! # Interval convention
//!
//! Bins are right-closed, `(e[i], e[i+1]]`, except the lowest bin of each
//! axis which also includes its lower edge. Every point inside the
//! rectangle, including points on its outer boundary, lands in exactly one
//! cell, so the total count equals the number of binned points.
//!
//! # Orientation
//!
//! Edges are stored ascending. Count rows are ordered north to south
//! (descending latitude) so the matrix reads like a map; columns are ordered
//! west to east (ascending longitude).

use crate::{
    geometry::{Rect, figure_dimensions},
    level::points_in_rect,
    point::{LatLng, LevelId, Point},
};

/// Upper bound on the number of cells [`compute_grid`] will lay out.
pub const MAX_CELLS: f64 = 1_000_000.0;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum GridError {
    #[display("rectangle has zero width or height")]
    DegenerateRectangle,
    #[display("cell count ({cell_count}) and figure area ({figure_area}) must be positive")]
    InvalidGridSize { cell_count: f64, figure_area: f64 },
    #[display("grid of {rows}x{cols} cells exceeds the limit of 1e6 cells")]
    TooManyCells { rows: f64, cols: f64 },
    #[display("bin edges must be strictly ascending with at least two edges per axis")]
    InvalidEdges,
    #[display("point ({lat}, {lng}) lies outside the grid")]
    OutOfGrid { lat: f64, lng: f64 },
    #[display("binned {binned} points but {expected} were supplied")]
    CountMismatch { binned: u64, expected: u64 },
}

/// Ascending bin edges of a grid, `n + 1` per axis for `n` bins.
#[derive(Debug, Clone, PartialEq)]
pub struct GridEdges {
    pub lat_edges: Vec<f64>,
    pub lng_edges: Vec<f64>,
}

impl GridEdges {
    /// Validates that both axes have at least one bin and strictly ascending edges.
    pub fn new(lat_edges: Vec<f64>, lng_edges: Vec<f64>) -> Result<Self, GridError> {
        let valid = |edges: &[f64]| edges.len() >= 2 && edges.windows(2).all(|w| w[0] < w[1]);
        if !valid(&lat_edges) || !valid(&lng_edges) {
            return Err(GridError::InvalidEdges);
        }
        Ok(Self {
            lat_edges,
            lng_edges,
        })
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.lat_edges.len() - 1
    }

    #[must_use]
    pub fn num_cols(&self) -> usize {
        self.lng_edges.len() - 1
    }
}

/// Computes the grid over `rect` for a target cell count.
///
/// The outermost edges equal the rectangle bounds exactly.
///
/// # Examples
///
/// ```
/// use pinisi_analysis::{geometry::Rect, grid::compute_grid, point::LatLng};
///
/// // 2 wide, 1 high: 8 cells become 2 rows × 4 columns
/// let rect = Rect::from_polygon(&[LatLng::new(1.0, 0.0), LatLng::new(0.0, 2.0)]).unwrap();
/// let edges = compute_grid(&rect, 8.0, 48.0).unwrap();
/// assert_eq!(edges.lat_edges, vec![0.0, 0.5, 1.0]);
/// assert_eq!(edges.lng_edges, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
/// ```
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation
)]
pub fn compute_grid(
    rect: &Rect,
    cell_count: f64,
    figure_area: f64,
) -> Result<GridEdges, GridError> {
    if !(cell_count > 0.0 && figure_area > 0.0) {
        return Err(GridError::InvalidGridSize {
            cell_count,
            figure_area,
        });
    }
    let (width, height) = rect.dimensions();
    if !(width > 0.0 && height > 0.0) {
        return Err(GridError::DegenerateRectangle);
    }

    let (fig_width, fig_height) = figure_dimensions(width, height, figure_area);
    let factor = (cell_count / figure_area).sqrt();
    let rows = (fig_height * factor).round().max(1.0);
    let cols = (fig_width * factor).round().max(1.0);
    if rows * cols > MAX_CELLS {
        return Err(GridError::TooManyCells { rows, cols });
    }
    let (num_rows, num_cols) = (rows as usize, cols as usize);

    let (top_lat, top_lng, bot_lat, bot_lng) = rect.bounds();
    let axis = |start: f64, end: f64, n: usize| {
        let step = (end - start) / n as f64;
        (0..=n)
            .map(|i| if i == n { end } else { start + i as f64 * step })
            .collect::<Vec<_>>()
    };

    GridEdges::new(
        axis(bot_lat, top_lat, num_rows),
        axis(top_lng, bot_lng, num_cols),
    )
}

/// Point counts per grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct BinGrid {
    edges: GridEdges,
    /// `counts[row][col]`, rows north to south
    counts: Vec<Vec<u64>>,
}

impl BinGrid {
    #[must_use]
    pub fn edges(&self) -> &GridEdges {
        &self.edges
    }

    /// Count matrix, rows ordered by descending latitude.
    #[must_use]
    pub fn counts(&self) -> &[Vec<u64>] {
        &self.counts
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    #[must_use]
    pub fn max_count(&self) -> u64 {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Latitude interval `(low, high)` covered by display row `row`.
    #[must_use]
    pub fn row_lat_range(&self, row: usize) -> (f64, f64) {
        let lat_idx = self.edges.num_rows() - 1 - row;
        (
            self.edges.lat_edges[lat_idx],
            self.edges.lat_edges[lat_idx + 1],
        )
    }

    /// Longitude interval `(low, high)` covered by column `col`.
    #[must_use]
    pub fn col_lng_range(&self, col: usize) -> (f64, f64) {
        (self.edges.lng_edges[col], self.edges.lng_edges[col + 1])
    }
}

/// Index of the bin containing `value`, or `None` when outside the edges.
fn bin_index(edges: &[f64], value: f64) -> Option<usize> {
    let (first, last) = (*edges.first()?, *edges.last()?);
    if value.is_nan() || value < first || value > last {
        return None;
    }
    // Number of upper edges strictly below the value: right-closed bins
    let idx = edges[1..].partition_point(|edge| *edge < value);
    Some(idx.min(edges.len() - 2))
}

/// Counts `points` per grid cell.
///
/// Fails if any point lies outside the grid or if the cell total does not
/// match the number of points supplied.
pub fn bin_points<I>(points: I, edges: &GridEdges) -> Result<BinGrid, GridError>
where
    I: IntoIterator<Item = LatLng>,
{
    let num_rows = edges.num_rows();
    let mut counts = vec![vec![0_u64; edges.num_cols()]; num_rows];
    let mut expected = 0_u64;
    for point in points {
        let out_of_grid = || GridError::OutOfGrid {
            lat: point.lat,
            lng: point.lng,
        };
        let lat_idx = bin_index(&edges.lat_edges, point.lat).ok_or_else(out_of_grid)?;
        let lng_idx = bin_index(&edges.lng_edges, point.lng).ok_or_else(out_of_grid)?;
        counts[num_rows - 1 - lat_idx][lng_idx] += 1;
        expected += 1;
    }

    let grid = BinGrid {
        edges: edges.clone(),
        counts,
    };
    let binned = grid.total();
    if binned != expected {
        return Err(GridError::CountMismatch { binned, expected });
    }
    Ok(grid)
}

/// Bins the in-rectangle points of `level` on the level's grid.
pub fn bin_level(
    points: &[Point],
    rect: &Rect,
    level: LevelId,
    cell_count: f64,
    figure_area: f64,
) -> Result<BinGrid, GridError> {
    let edges = compute_grid(rect, cell_count, figure_area)?;
    let grid = bin_points(
        points_in_rect(points, rect, level).map(Point::position),
        &edges,
    )?;
    log::debug!(
        "level {level}: binned {} points into {}x{} cells",
        grid.total(),
        edges.num_rows(),
        edges.num_cols()
    );
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg64Mcg;

    use super::*;

    fn unit_edges() -> GridEdges {
        GridEdges::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 2.0, 3.0]).unwrap()
    }

    #[test]
    fn test_bin_index_boundaries() {
        let edges = [0.0, 1.0, 2.0];
        assert_eq!(bin_index(&edges, 0.0), Some(0));
        assert_eq!(bin_index(&edges, 0.5), Some(0));
        assert_eq!(bin_index(&edges, 1.0), Some(0));
        assert_eq!(bin_index(&edges, 1.000_001), Some(1));
        assert_eq!(bin_index(&edges, 2.0), Some(1));
        assert_eq!(bin_index(&edges, 2.1), None);
        assert_eq!(bin_index(&edges, -0.1), None);
        assert_eq!(bin_index(&edges, f64::NAN), None);
    }

    #[test]
    fn test_rows_are_north_first() {
        let grid = bin_points(
            [LatLng::new(1.5, 0.5), LatLng::new(1.5, 0.5), LatLng::new(0.5, 2.5)],
            &unit_edges(),
        )
        .unwrap();
        assert_eq!(grid.counts(), &[vec![2, 0, 0], vec![0, 0, 1]]);
        assert_eq!(grid.row_lat_range(0), (1.0, 2.0));
        assert_eq!(grid.row_lat_range(1), (0.0, 1.0));
        assert_eq!(grid.col_lng_range(2), (2.0, 3.0));
        assert_eq!(grid.max_count(), 2);
    }

    #[test]
    fn test_conservation_on_every_edge() {
        let edges = unit_edges();
        let mut points = vec![];
        for &lat in &edges.lat_edges {
            for &lng in &edges.lng_edges {
                points.push(LatLng::new(lat, lng));
            }
        }
        let grid = bin_points(points.iter().copied(), &edges).unwrap();
        assert_eq!(grid.total(), points.len() as u64);
        // Lowest corner folds into the south-west cell with its right-closed neighbours
        assert_eq!(grid.counts()[1][0], 4);
    }

    #[test]
    fn test_out_of_grid_point_is_rejected() {
        let err = bin_points([LatLng::new(2.5, 1.0)], &unit_edges()).unwrap_err();
        assert!(matches!(err, GridError::OutOfGrid { .. }));
    }

    #[test]
    fn test_invalid_edges() {
        assert!(GridEdges::new(vec![0.0], vec![0.0, 1.0]).is_err());
        assert!(GridEdges::new(vec![0.0, 1.0], vec![1.0, 1.0]).is_err());
        assert!(GridEdges::new(vec![1.0, 0.0], vec![0.0, 1.0]).is_err());
    }

    #[test]
    fn test_compute_grid_follows_aspect_ratio() {
        let rect = Rect::from_polygon(&[LatLng::new(-6.0, 106.0), LatLng::new(-6.2, 106.8)])
            .unwrap();
        let edges = compute_grid(&rect, 96.0, 48.0).unwrap();
        // 4:1 aspect -> rows × cols ≈ 96 with cols = 4 × rows
        assert_eq!(edges.num_rows(), 5);
        assert_eq!(edges.num_cols(), 20);
        assert_eq!(*edges.lat_edges.first().unwrap(), -6.2);
        assert_eq!(*edges.lat_edges.last().unwrap(), -6.0);
        assert_eq!(*edges.lng_edges.first().unwrap(), 106.0);
        assert_eq!(*edges.lng_edges.last().unwrap(), 106.8);
    }

    #[test]
    fn test_compute_grid_errors() {
        let flat = Rect::from_polygon(&[LatLng::new(0.0, 0.0), LatLng::new(0.0, 1.0)]).unwrap();
        assert!(matches!(
            compute_grid(&flat, 10.0, 10.0),
            Err(GridError::DegenerateRectangle)
        ));
        let rect = Rect::from_polygon(&[LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0)]).unwrap();
        assert!(matches!(
            compute_grid(&rect, 0.0, 10.0),
            Err(GridError::InvalidGridSize { .. })
        ));
        // A tiny target still produces a single cell
        let edges = compute_grid(&rect, 0.01, 48.0).unwrap();
        assert_eq!((edges.num_rows(), edges.num_cols()), (1, 1));
    }

    #[test]
    fn test_compute_grid_rejects_huge_cell_count() {
        let rect = Rect::from_polygon(&[LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0)]).unwrap();
        assert!(matches!(
            compute_grid(&rect, 1e30, 48.0),
            Err(GridError::TooManyCells { .. })
        ));
        assert!(matches!(
            compute_grid(&rect, f64::INFINITY, 48.0),
            Err(GridError::TooManyCells { .. })
        ));
        // Exactly at the limit is still accepted
        let edges = compute_grid(&rect, MAX_CELLS, 48.0).unwrap();
        assert_eq!(edges.num_rows() * edges.num_cols(), 1_000_000);
    }

    #[test]
    fn test_random_conservation() {
        let mut rng = Pcg64Mcg::seed_from_u64(0x6e1d);
        for _ in 0..50 {
            let lat0 = rng.random_range(-10.0..10.0);
            let lng0 = rng.random_range(100.0..120.0);
            let rect = Rect::from_polygon(&[
                LatLng::new(lat0, lng0),
                LatLng::new(
                    lat0 - rng.random_range(0.01..2.0),
                    lng0 + rng.random_range(0.01..2.0),
                ),
            ])
            .unwrap();
            let cells = rng.random_range(1.0..400.0);
            let edges = compute_grid(&rect, cells, 48.0).unwrap();
            let (top_lat, top_lng, bot_lat, bot_lng) = rect.bounds();

            let mut points = (0..200)
                .map(|_| {
                    LatLng::new(
                        rng.random_range(bot_lat..=top_lat),
                        rng.random_range(top_lng..=bot_lng),
                    )
                })
                .collect::<Vec<_>>();
            // Corners and interior edges exactly
            points.push(LatLng::new(top_lat, top_lng));
            points.push(LatLng::new(bot_lat, bot_lng));
            points.push(LatLng::new(bot_lat, top_lng));
            points.push(LatLng::new(top_lat, bot_lng));
            for &lat in &edges.lat_edges {
                points.push(LatLng::new(lat, edges.lng_edges[edges.num_cols() / 2]));
            }

            let grid = bin_points(points.iter().copied(), &edges).unwrap();
            assert_eq!(grid.total(), points.len() as u64);
        }
    }

    #[test]
    fn test_bin_level_skips_outside_points() {
        let at = |level, lat, lng| Point {
            id: 0,
            user_id: 9,
            level,
            lat,
            lng,
            timestamp: NaiveDate::from_ymd_opt(2016, 5, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        };
        let rect = Rect::from_polygon(&[LatLng::new(2.0, 0.0), LatLng::new(0.0, 4.0)]).unwrap();
        let points = [
            at(1, 1.0, 1.0),
            at(1, 2.0, 4.0),
            at(1, 3.0, 1.0),
            at(2, 1.0, 1.0),
        ];
        let grid = bin_level(&points, &rect, 1, 8.0, 8.0).unwrap();
        assert_eq!(grid.total(), 2);
    }
}
