//! Axis-aligned level rectangles
//!
//! Each level's playable area is described by a polygon. Analysis works on
//! the polygon's bounding rectangle, stored as two corners:
//!
//! ```text
//!   top = (max_lat, min_lng) ┌──────────────┐
//!                            │              │  height = top.lat - bottom.lat
//!                            │              │
//!                            └──────────────┘ bottom = (min_lat, max_lng)
//!                              width = bottom.lng - top.lng
//! ```

use crate::point::LatLng;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum GeometryError {
    #[display("polygon has no vertices")]
    EmptyPolygon,
}

/// Bounding rectangle of a level polygon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// North-west corner `(max_lat, min_lng)`
    pub top: LatLng,
    /// South-east corner `(min_lat, max_lng)`
    pub bottom: LatLng,
}

impl Rect {
    /// Computes the bounding rectangle of `vertices`.
    ///
    /// No other validation is performed on the polygon.
    ///
    /// # Examples
    ///
    /// ```
    /// use pinisi_analysis::{geometry::Rect, point::LatLng};
    ///
    /// let diamond = [
    ///     LatLng::new(10.0, 0.0),
    ///     LatLng::new(0.0, 10.0),
    ///     LatLng::new(-10.0, 0.0),
    ///     LatLng::new(0.0, -10.0),
    /// ];
    /// let rect = Rect::from_polygon(&diamond).unwrap();
    /// assert_eq!(rect.bounds(), (10.0, -10.0, -10.0, 10.0));
    /// ```
    pub fn from_polygon(vertices: &[LatLng]) -> Result<Self, GeometryError> {
        let first = vertices.first().ok_or(GeometryError::EmptyPolygon)?;
        let mut top = *first;
        let mut bottom = *first;
        for vertex in &vertices[1..] {
            top.lat = top.lat.max(vertex.lat);
            top.lng = top.lng.min(vertex.lng);
            bottom.lat = bottom.lat.min(vertex.lat);
            bottom.lng = bottom.lng.max(vertex.lng);
        }
        Ok(Self { top, bottom })
    }

    /// `(top_lat, top_lng, bot_lat, bot_lng)`
    #[must_use]
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        (self.top.lat, self.top.lng, self.bottom.lat, self.bottom.lng)
    }

    /// `(width, height)` in degrees: longitude span and latitude span.
    #[must_use]
    pub fn dimensions(&self) -> (f64, f64) {
        (
            self.bottom.lng - self.top.lng,
            self.top.lat - self.bottom.lat,
        )
    }

    /// Whether `position` lies inside the rectangle, edges included.
    #[must_use]
    pub fn contains(&self, position: LatLng) -> bool {
        let (top_lat, top_lng, bot_lat, bot_lng) = self.bounds();
        (top_lng..=bot_lng).contains(&position.lng) && (bot_lat..=top_lat).contains(&position.lat)
    }
}

/// Scales `(width, height)` uniformly so the result has area `target_area`.
///
/// The aspect ratio is preserved: both sides are multiplied by
/// `sqrt(target_area / (width × height))`. A zero-area input yields
/// non-finite dimensions.
///
/// ```
/// # use pinisi_analysis::geometry::figure_dimensions;
/// let (w, h) = figure_dimensions(2.0, 1.0, 8.0);
/// assert!((w - 4.0).abs() < 1e-12);
/// assert!((h - 2.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn figure_dimensions(width: f64, height: f64, target_area: f64) -> (f64, f64) {
    let scale = (target_area / (width * height)).sqrt();
    (width * scale, height * scale)
}
