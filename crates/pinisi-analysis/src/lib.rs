//! Domain model and analysis pipeline for Pinisi location guesses.
//!
//! Players of Pinisi guess where a photo was taken on each of six levels.
//! This crate turns their submitted points into per-level statistics:
//!
//! - **Cleaning**: deduplicate raw logs, keep only players who finished every level
//! - **Distances**: error of each guess relative to a ground-truth player
//! - **Filtering**: IQR or level-rectangle narrowing of the distance sample
//! - **Testing**: compare the population's mean error against an expert's error
//! - **Binning**: count points per grid cell of a level rectangle for heatmaps
//!
//! # Modules
//!
//! - [`point`]: Points, users and identifiers
//! - [`level`]: Level document and per-level rectangles
//! - [`geometry`]: Bounding rectangles and figure sizing
//! - [`distance`]: Reference players and distance errors
//! - [`grid`]: Spatial binning
//! - [`device`]: Browser agent classification
//! - [`cleaning`]: Raw log cleaning
//! - [`pipeline`]: Per-level sample collection and testing
//!
//! # Example
//!
//! ```
//! use pinisi_analysis::{geometry::Rect, point::LatLng};
//!
//! let polygon = [
//!     LatLng::new(10.0, 0.0),
//!     LatLng::new(0.0, 10.0),
//!     LatLng::new(-10.0, 0.0),
//!     LatLng::new(0.0, -10.0),
//! ];
//! let rect = Rect::from_polygon(&polygon).unwrap();
//! assert_eq!(rect.bounds(), (10.0, -10.0, -10.0, 10.0));
//! assert_eq!(rect.dimensions(), (20.0, 20.0));
//! ```

pub mod cleaning;
pub mod device;
pub mod distance;
pub mod geometry;
pub mod grid;
pub mod level;
pub mod pipeline;
pub mod point;
