//! Guess and player records
//!
//! # Data Structure
//!
//! ```text
//! Point (one guess)                 User (one player)
//! ├─ id                             ├─ id  <───────────── Point.user_id
//! ├─ user_id                        ├─ timestamp
//! ├─ level (1..=6)                  ├─ browser (user agent)
//! ├─ lat, lng                       ├─ extra passthrough columns
//! └─ timestamp                      └─ device (after cleaning)
//! ```
//!
//! After cleaning, `(user_id, level)` identifies a point uniquely and every
//! retained user has one point for each of the six levels.

use std::ops::RangeInclusive;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub type UserId = u64;
pub type LevelId = u8;

/// All game levels, in play order.
pub const LEVEL_IDS: RangeInclusive<LevelId> = 1..=6;

/// Number of levels a player must complete to be retained by cleaning.
pub const NUM_LEVELS: usize = 6;

/// A geographic position in raw latitude/longitude degrees.
///
/// Deserializes from either `{"lat": .., "lng": ..}` or a `[lat, lng]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Euclidean distance in raw degree units.
    ///
    /// ```
    /// # use pinisi_analysis::point::LatLng;
    /// assert_eq!(LatLng::new(3.0, 4.0).distance_to(LatLng::new(0.0, 0.0)), 5.0);
    /// ```
    #[must_use]
    pub fn distance_to(self, other: LatLng) -> f64 {
        ((self.lat - other.lat).powi(2) + (self.lng - other.lng).powi(2)).sqrt()
    }
}

/// A single submitted guess.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// Row identifier from the source table
    pub id: u64,
    pub user_id: UserId,
    pub level: LevelId,
    pub lat: f64,
    pub lng: f64,
    /// Submission time
    pub timestamp: NaiveDateTime,
}

impl Point {
    #[must_use]
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// Device classification derived from a user's browser agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// Specific OS, e.g. `"Windows 7"` or `"iPhone iOS 9"`
    pub os: String,
    /// OS family, e.g. `"Windows"` or `"iOS"`
    pub os_generic: String,
    pub is_mobile: bool,
}

/// A player record.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    /// Registration time
    pub timestamp: NaiveDateTime,
    /// Raw browser user-agent string
    pub browser: String,
    /// Values of any additional source columns, in table order
    pub extra: Vec<String>,
    /// Filled in by the cleaning pass
    pub device: Option<Device>,
}
