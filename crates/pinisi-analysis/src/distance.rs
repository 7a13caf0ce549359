//! Distance errors relative to the truth point
//!
//! Two special players are not part of the population:
//!
//! - the **truth** player, whose guess on each level is the ground-truth location
//! - the **expert** player, whose guess is the benchmark the population is compared to
//!
//! Each must have exactly one point per analyzed level. Zero matches and
//! multiple matches are both errors rather than a silent first-match pick.

use crate::point::{LatLng, LevelId, Point, UserId};

/// The two reference players.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceIds {
    pub truth: UserId,
    pub expert: UserId,
}

/// Which reference player a lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ReferenceRole {
    #[display("truth")]
    Truth,
    #[display("expert")]
    Expert,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ReferenceError {
    #[display("no {role} point found for level {level}")]
    NotFound { role: ReferenceRole, level: LevelId },
    #[display("{count} {role} points found for level {level}, expected exactly one")]
    AmbiguousReference {
        role: ReferenceRole,
        level: LevelId,
        count: usize,
    },
}

/// Points split into the reference players and the general population.
#[derive(Debug, Clone, Default)]
pub struct PointSets {
    pub truth: Vec<Point>,
    pub expert: Vec<Point>,
    pub population: Vec<Point>,
}

impl PointSets {
    /// Partitions `points` by player, preserving order within each set.
    #[must_use]
    pub fn split(points: &[Point], refs: ReferenceIds) -> Self {
        let mut sets = Self::default();
        for point in points {
            if point.user_id == refs.truth {
                sets.truth.push(point.clone());
            } else if point.user_id == refs.expert {
                sets.expert.push(point.clone());
            } else {
                sets.population.push(point.clone());
            }
        }
        sets
    }
}

/// Euclidean distance from `reference` to each of `points`, in order.
///
/// ```
/// use pinisi_analysis::{distance::distance, point::LatLng};
///
/// let d = distance(LatLng::new(0.0, 0.0), [LatLng::new(3.0, 4.0), LatLng::new(0.0, 0.0)]);
/// assert_eq!(d, vec![5.0, 0.0]);
/// ```
pub fn distance<I>(reference: LatLng, points: I) -> Vec<f64>
where
    I: IntoIterator<Item = LatLng>,
{
    points
        .into_iter()
        .map(|p| p.distance_to(reference))
        .collect()
}

/// Finds the single point of `role` on `level`.
pub fn find_reference(
    points: &[Point],
    role: ReferenceRole,
    level: LevelId,
) -> Result<&Point, ReferenceError> {
    let mut matches = points.iter().filter(|p| p.level == level);
    let found = matches
        .next()
        .ok_or(ReferenceError::NotFound { role, level })?;
    let extra = matches.count();
    if extra > 0 {
        return Err(ReferenceError::AmbiguousReference {
            role,
            level,
            count: extra + 1,
        });
    }
    Ok(found)
}

/// Distances of the population and the expert from the truth point on `level`.
///
/// Returns `(population distances in population order, expert distance)`.
pub fn per_level_distances(
    truth_points: &[Point],
    expert_points: &[Point],
    population_points: &[Point],
    level: LevelId,
) -> Result<(Vec<f64>, f64), ReferenceError> {
    let truth = find_reference(truth_points, ReferenceRole::Truth, level)?.position();
    let expert = find_reference(expert_points, ReferenceRole::Expert, level)?.position();
    let distances = distance(
        truth,
        population_points
            .iter()
            .filter(|p| p.level == level)
            .map(Point::position),
    );
    Ok((distances, expert.distance_to(truth)))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    const REFS: ReferenceIds = ReferenceIds {
        truth: 1,
        expert: 2,
    };

    fn point(user_id: UserId, level: LevelId, lat: f64, lng: f64) -> Point {
        Point {
            id: 0,
            user_id,
            level,
            lat,
            lng,
            timestamp: NaiveDate::from_ymd_opt(2016, 5, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_distance_preserves_order_and_cardinality() {
        let points = [
            LatLng::new(3.0, 4.0),
            LatLng::new(0.0, 0.0),
            LatLng::new(-6.0, 8.0),
        ];
        assert_eq!(distance(LatLng::new(0.0, 0.0), points), vec![5.0, 0.0, 10.0]);
        assert!(distance(LatLng::new(1.0, 1.0), Vec::new()).is_empty());
    }

    #[test]
    fn test_split_reference_players() {
        let points = [
            point(1, 1, 0.0, 0.0),
            point(5, 1, 1.0, 0.0),
            point(2, 1, 0.0, 1.0),
            point(6, 1, 2.0, 0.0),
        ];
        let sets = PointSets::split(&points, REFS);
        assert_eq!(sets.truth.len(), 1);
        assert_eq!(sets.expert.len(), 1);
        assert_eq!(
            sets.population.iter().map(|p| p.user_id).collect::<Vec<_>>(),
            [5, 6]
        );
    }

    #[test]
    fn test_per_level_distances() {
        let points = [
            point(1, 1, 0.0, 0.0),
            point(1, 2, 10.0, 10.0),
            point(2, 1, 0.0, 2.0),
            point(2, 2, 10.0, 11.0),
            point(5, 1, 3.0, 4.0),
            point(5, 2, 10.0, 10.0),
            point(6, 1, 0.0, 0.0),
        ];
        let sets = PointSets::split(&points, REFS);
        let (dists, expert) =
            per_level_distances(&sets.truth, &sets.expert, &sets.population, 1).unwrap();
        assert_eq!(dists, vec![5.0, 0.0]);
        assert_eq!(expert, 2.0);

        let (dists, expert) =
            per_level_distances(&sets.truth, &sets.expert, &sets.population, 2).unwrap();
        assert_eq!(dists, vec![0.0]);
        assert_eq!(expert, 1.0);
    }

    #[test]
    fn test_missing_reference() {
        let truth = [point(1, 1, 0.0, 0.0)];
        let expert = [point(2, 2, 0.0, 0.0)];
        let err = per_level_distances(&truth, &expert, &[], 1).unwrap_err();
        assert!(matches!(
            err,
            ReferenceError::NotFound {
                role: ReferenceRole::Expert,
                level: 1
            }
        ));
        let err = per_level_distances(&truth, &expert, &[], 2).unwrap_err();
        assert!(matches!(
            err,
            ReferenceError::NotFound {
                role: ReferenceRole::Truth,
                level: 2
            }
        ));
    }

    #[test]
    fn test_ambiguous_reference() {
        let truth = [
            point(1, 3, 0.0, 0.0),
            point(1, 3, 1.0, 0.0),
            point(1, 3, 2.0, 0.0),
        ];
        let err = find_reference(&truth, ReferenceRole::Truth, 3).unwrap_err();
        assert!(matches!(
            err,
            ReferenceError::AmbiguousReference { count: 3, .. }
        ));
        assert_eq!(
            err.to_string(),
            "3 truth points found for level 3, expected exactly one"
        );
    }
}
