//! Raw log cleaning
//!
//! Turns raw guess and player tables into the analysis-ready tables.
//!
//! # Steps
//!
//! 1. **Deduplicate**: order points by `(user_id, timestamp)` and keep only the
//!    latest submission for each `(user_id, level)`; keep only the last row
//!    for each user id in the users table
//! 2. **Completeness**: drop every point of players who did not play exactly
//!    [`NUM_LEVELS`] distinct levels
//! 3. **Symmetry**: drop players without points and points without a player
//! 4. **Enrichment**: classify each remaining player's device
//!
//! After steps 2 and 3 the invariants are re-checked; a violation means the
//! downstream statistics would be meaningless, so it is returned as an error
//! instead of being patched up.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::{
    device::{self, DeviceError},
    point::{LEVEL_IDS, LevelId, NUM_LEVELS, Point, User, UserId},
};

/// What to do with a browser agent that matches no classification rule.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum UnknownAgentPolicy {
    /// Abort cleaning with an error.
    #[default]
    Fail,
    /// Record the device as [`device::UNKNOWN`] and continue.
    Tag,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum CleaningError {
    #[display("user {user_id} played levels {levels:?} after cleaning, expected each of 1..=6 once")]
    IncompleteUser {
        user_id: UserId,
        levels: Vec<LevelId>,
    },
    #[display("user {user_id} has points but no user record")]
    OrphanPoints { user_id: UserId },
    #[display("user {user_id} has a user record but no points")]
    OrphanUser { user_id: UserId },
    #[display("user {user_id} has more than one user record")]
    DuplicateUser { user_id: UserId },
    #[display("cannot classify device of user {user_id}")]
    Device {
        user_id: UserId,
        source: DeviceError,
    },
}

/// Row counts removed and retained by each cleaning step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleaningSummary {
    pub raw_points: usize,
    pub raw_users: usize,
    pub duplicate_points: usize,
    pub duplicate_users: usize,
    pub incomplete_users: usize,
    pub points_without_user: usize,
    pub users_without_points: usize,
    pub unknown_agents: usize,
    pub retained_points: usize,
    pub retained_users: usize,
}

/// Output of [`clean`].
#[derive(Debug, Clone)]
pub struct CleanedData {
    /// Points ordered by `(user_id, timestamp)`
    pub points: Vec<Point>,
    /// Users in input order, with [`User::device`] filled in
    pub users: Vec<User>,
    pub summary: CleaningSummary,
}

/// Keeps only the latest point for each `(user_id, level)`.
///
/// The result is ordered by `(user_id, timestamp)`. Ties on timestamp keep
/// the point appearing last in the input.
#[must_use]
pub fn deduplicate(mut points: Vec<Point>) -> Vec<Point> {
    points.sort_by(|a, b| (a.user_id, a.timestamp).cmp(&(b.user_id, b.timestamp)));
    let mut seen = HashSet::new();
    let mut latest = points
        .into_iter()
        .rev()
        .filter(|p| seen.insert((p.user_id, p.level)))
        .collect::<Vec<_>>();
    latest.reverse();
    latest
}

/// Keeps only the last row for each user id, preserving the order of the
/// kept rows.
#[must_use]
pub fn deduplicate_users(users: Vec<User>) -> Vec<User> {
    let mut seen = HashSet::new();
    let mut latest = users
        .into_iter()
        .rev()
        .filter(|u| seen.insert(u.id))
        .collect::<Vec<_>>();
    latest.reverse();
    latest
}

fn levels_by_user(points: &[Point]) -> BTreeMap<UserId, Vec<LevelId>> {
    let mut levels = BTreeMap::<UserId, Vec<LevelId>>::new();
    for point in points {
        levels.entry(point.user_id).or_default().push(point.level);
    }
    levels
}

/// Users whose points do not cover exactly [`NUM_LEVELS`] distinct levels.
#[must_use]
pub fn incomplete_users(points: &[Point]) -> BTreeSet<UserId> {
    levels_by_user(points)
        .into_iter()
        .filter(|(_, levels)| levels.iter().collect::<BTreeSet<_>>().len() != NUM_LEVELS)
        .map(|(user_id, _)| user_id)
        .collect()
}

/// Checks that every user has exactly one point on each level.
pub fn verify_complete(points: &[Point]) -> Result<(), CleaningError> {
    let expected = LEVEL_IDS.collect::<Vec<_>>();
    for (user_id, mut levels) in levels_by_user(points) {
        levels.sort_unstable();
        if levels != expected {
            return Err(CleaningError::IncompleteUser { user_id, levels });
        }
    }
    Ok(())
}

/// Checks that `points` and `users` refer to the same set of players, each
/// with a single user record.
pub fn verify_symmetric(points: &[Point], users: &[User]) -> Result<(), CleaningError> {
    let point_users = points.iter().map(|p| p.user_id).collect::<BTreeSet<_>>();
    let mut user_ids = BTreeSet::new();
    if let Some(user) = users.iter().find(|u| !user_ids.insert(u.id)) {
        return Err(CleaningError::DuplicateUser { user_id: user.id });
    }
    if let Some(&user_id) = point_users.difference(&user_ids).next() {
        return Err(CleaningError::OrphanPoints { user_id });
    }
    if let Some(&user_id) = user_ids.difference(&point_users).next() {
        return Err(CleaningError::OrphanUser { user_id });
    }
    Ok(())
}

/// Runs the full cleaning pass.
pub fn clean(
    points: Vec<Point>,
    users: Vec<User>,
    policy: UnknownAgentPolicy,
) -> Result<CleanedData, CleaningError> {
    let mut summary = CleaningSummary {
        raw_points: points.len(),
        raw_users: users.len(),
        ..CleaningSummary::default()
    };

    let points = deduplicate(points);
    summary.duplicate_points = summary.raw_points - points.len();
    let users = deduplicate_users(users);
    summary.duplicate_users = summary.raw_users - users.len();
    if summary.duplicate_users > 0 {
        log::warn!(
            "dropped {} repeated rows of the users table",
            summary.duplicate_users
        );
    }

    let incomplete = incomplete_users(&points);
    summary.incomplete_users = incomplete.len();
    let points = points
        .into_iter()
        .filter(|p| !incomplete.contains(&p.user_id))
        .collect::<Vec<_>>();
    verify_complete(&points)?;

    let known_users = users.iter().map(|u| u.id).collect::<HashSet<_>>();
    let before = points.len();
    let points = points
        .into_iter()
        .filter(|p| known_users.contains(&p.user_id))
        .collect::<Vec<_>>();
    summary.points_without_user = before - points.len();
    if summary.points_without_user > 0 {
        log::warn!(
            "dropped {} points of players missing from the users table",
            summary.points_without_user
        );
    }

    let playing = points.iter().map(|p| p.user_id).collect::<HashSet<_>>();
    let mut users = users
        .into_iter()
        .filter(|u| playing.contains(&u.id))
        .collect::<Vec<_>>();
    summary.users_without_points = summary.raw_users - summary.duplicate_users - users.len();
    verify_symmetric(&points, &users)?;

    for user in &mut users {
        let device = match device::classify(&user.browser) {
            Ok(device) => device,
            Err(source) if policy.is_tag() => {
                log::warn!("user {}: {source}", user.id);
                summary.unknown_agents += 1;
                device::unknown_device()
            }
            Err(source) => {
                return Err(CleaningError::Device {
                    user_id: user.id,
                    source,
                });
            }
        };
        user.device = Some(device);
    }

    summary.retained_points = points.len();
    summary.retained_users = users.len();
    log::info!(
        "cleaning kept {} of {} points and {} of {} users",
        summary.retained_points,
        summary.raw_points,
        summary.retained_users,
        summary.raw_users
    );

    Ok(CleanedData {
        points,
        users,
        summary,
    })
}
