//! Level definitions
//!
//! Levels are described by a JSON document listing each level's id and the
//! polygon outlining its playable area:
//!
//! ```json
//! {
//!   "maps": [
//!     { "level": 1, "polygon": [[-6.17, 106.82], [-6.17, 106.83], [-6.18, 106.83]] }
//!   ]
//! }
//! ```
//!
//! Unknown fields are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    geometry::{GeometryError, Rect},
    point::{LatLng, LevelId, Point},
};

/// Levels document as stored on disk.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LevelDocument {
    pub maps: Vec<LevelDef>,
}

/// A single level entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LevelDef {
    pub level: LevelId,
    /// Ordered polygon vertices
    pub polygon: Vec<LatLng>,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum LevelError {
    #[display("level {level} has an invalid polygon")]
    Polygon { level: LevelId, source: GeometryError },
    #[display("level {level} is defined more than once")]
    Duplicate { level: LevelId },
}

/// Bounding rectangles of every defined level.
#[derive(Debug, Clone, Default)]
pub struct LevelRects {
    rects: BTreeMap<LevelId, Rect>,
}

impl LevelRects {
    /// Computes the rectangle of every level in `document`.
    pub fn from_document(document: &LevelDocument) -> Result<Self, LevelError> {
        let mut rects = BTreeMap::new();
        for def in &document.maps {
            let rect = Rect::from_polygon(&def.polygon).map_err(|source| LevelError::Polygon {
                level: def.level,
                source,
            })?;
            if rects.insert(def.level, rect).is_some() {
                return Err(LevelError::Duplicate { level: def.level });
            }
        }
        Ok(Self { rects })
    }

    #[must_use]
    pub fn get(&self, level: LevelId) -> Option<&Rect> {
        self.rects.get(&level)
    }
}

impl FromIterator<(LevelId, Rect)> for LevelRects {
    fn from_iter<T: IntoIterator<Item = (LevelId, Rect)>>(iter: T) -> Self {
        Self {
            rects: iter.into_iter().collect(),
        }
    }
}

/// Points played on `level` that fall inside `rect`, edges included.
pub fn points_in_rect<'a>(
    points: &'a [Point],
    rect: &'a Rect,
    level: LevelId,
) -> impl Iterator<Item = &'a Point> + 'a {
    points
        .iter()
        .filter(move |p| p.level == level && rect.contains(p.position()))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    const DOCUMENT: &str = r#"{
        "maps": [
            {"level": 1, "polygon": [[1.0, 0.0], [0.0, 2.0], [-1.0, 0.0]], "name": "harbor"},
            {"level": 2, "polygon": [[5.0, 5.0], [4.0, 6.0]]}
        ]
    }"#;

    fn point(user_id: u64, level: LevelId, lat: f64, lng: f64) -> Point {
        Point {
            id: user_id * 10 + u64::from(level),
            user_id,
            level,
            lat,
            lng,
            timestamp: NaiveDate::from_ymd_opt(2016, 5, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_parse_document() {
        let document: LevelDocument = serde_json::from_str(DOCUMENT).unwrap();
        let rects = LevelRects::from_document(&document).unwrap();
        let rect = rects.get(1).unwrap();
        assert_eq!(rect.bounds(), (1.0, 0.0, -1.0, 2.0));
        assert_eq!(rects.get(2).unwrap().bounds(), (5.0, 5.0, 4.0, 6.0));
        assert!(rects.get(3).is_none());
    }

    #[test]
    fn test_rejects_empty_polygon() {
        let document: LevelDocument =
            serde_json::from_str(r#"{"maps": [{"level": 3, "polygon": []}]}"#).unwrap();
        let err = LevelRects::from_document(&document).unwrap_err();
        assert!(matches!(err, LevelError::Polygon { level: 3, .. }));
        // The cause is reported through the source chain, not repeated in the message
        assert_eq!(err.to_string(), "level 3 has an invalid polygon");
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "polygon has no vertices");
    }

    #[test]
    fn test_rejects_duplicate_level() {
        let document: LevelDocument = serde_json::from_str(
            r#"{"maps": [{"level": 1, "polygon": [[0, 0]]}, {"level": 1, "polygon": [[1, 1]]}]}"#,
        )
        .unwrap();
        let err = LevelRects::from_document(&document).unwrap_err();
        assert!(matches!(err, LevelError::Duplicate { level: 1 }));
    }

    #[test]
    fn test_points_in_rect() {
        let document: LevelDocument = serde_json::from_str(DOCUMENT).unwrap();
        let rects = LevelRects::from_document(&document).unwrap();
        let points = [
            point(1, 1, 0.5, 1.0),
            point(2, 1, 1.0, 2.0),
            point(3, 1, 1.5, 1.0),
            point(4, 2, 0.5, 1.0),
        ];
        let inside = points_in_rect(&points, rects.get(1).unwrap(), 1)
            .map(|p| p.user_id)
            .collect::<Vec<_>>();
        assert_eq!(inside, [1, 2]);
    }
}
