//! Data directory layout and table I/O
//!
//! All tables are `|`-delimited with a header row:
//!
//! - points: `id|user_id|level|lat|lng|timestamp`
//! - users: `id|timestamp|browser` followed by any passthrough columns; the
//!   cleaned table appends `OS|OS_generic|is_mobile`

use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{DateTime, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use pinisi_analysis::{
    distance::ReferenceIds,
    level::{LevelDocument, LevelRects},
    point::{LevelId, Point, User, UserId},
};
use serde::{Deserialize, Serialize};

use crate::util;

const DELIMITER: u8 = b'|';
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const DEVICE_COLUMNS: [&str; 3] = ["OS", "OS_generic", "is_mobile"];

/// Locations of the input and output files under a data directory.
#[derive(Debug, Clone)]
pub struct DataPaths {
    dir: PathBuf,
}

impl DataPaths {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn raw_points(&self) -> PathBuf {
        self.dir.join("raw").join("points.psv")
    }

    pub fn raw_users(&self) -> PathBuf {
        self.dir.join("raw").join("users.psv")
    }

    pub fn clean_dir(&self) -> PathBuf {
        self.dir.join("clean")
    }

    pub fn clean_points(&self) -> PathBuf {
        self.clean_dir().join("points.psv")
    }

    pub fn clean_users(&self) -> PathBuf {
        self.clean_dir().join("users.psv")
    }

    pub fn levels(&self) -> PathBuf {
        self.dir.join("levels.json")
    }

    pub fn truth_id(&self) -> PathBuf {
        self.dir.join("truth_ID")
    }

    pub fn expert_id(&self) -> PathBuf {
        self.dir.join("expert_ID")
    }
}

/// Everything the analysis commands read: cleaned points, level rectangles
/// and reference players.
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    pub points: Vec<Point>,
    pub levels: LevelRects,
    pub refs: ReferenceIds,
}

impl AnalysisInput {
    pub fn load(paths: &DataPaths) -> anyhow::Result<Self> {
        let refs = ReferenceIds {
            truth: read_id_file("truth", &paths.truth_id())?,
            expert: read_id_file("expert", &paths.expert_id())?,
        };
        let points = read_points(&paths.clean_points())?;
        let levels = read_levels(&paths.levels())?;
        log::info!(
            "loaded {} points, truth player {}, expert player {}",
            points.len(),
            refs.truth,
            refs.expert
        );
        Ok(Self {
            points,
            levels,
            refs,
        })
    }
}

/// Users table with the names of its passthrough columns.
#[derive(Debug, Clone, Default)]
pub struct UserTable {
    pub extra_columns: Vec<String>,
    pub users: Vec<User>,
}

#[derive(Debug, Deserialize, Serialize)]
struct PointRecord {
    id: u64,
    user_id: UserId,
    level: LevelId,
    lat: f64,
    lng: f64,
    timestamp: String,
}

/// Parses an RFC 3339 or `YYYY-MM-DD HH:MM:SS[.fff]` timestamp.
///
/// Timestamps with an offset are converted to UTC.
pub fn parse_timestamp(s: &str) -> anyhow::Result<NaiveDateTime> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.naive_utc());
    }
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .with_context(|| format!("Invalid timestamp: {s}"))
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn read_id_file(role: &str, path: &Path) -> anyhow::Result<UserId> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} ID file: {}", role, path.display()))?;
    content.trim().parse().with_context(|| {
        format!(
            "Invalid {} ID in {}: {:?}",
            role,
            path.display(),
            content.trim()
        )
    })
}

pub fn read_levels(path: &Path) -> anyhow::Result<LevelRects> {
    let document: LevelDocument = util::read_json_file("levels", path)?;
    LevelRects::from_document(&document)
        .with_context(|| format!("Invalid levels file: {}", path.display()))
}

fn open(file_kind: &str, path: &Path) -> anyhow::Result<File> {
    File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))
}

fn create(file_kind: &str, path: &Path) -> anyhow::Result<File> {
    File::create(path)
        .with_context(|| format!("Failed to create {} file: {}", file_kind, path.display()))
}

pub fn read_points(path: &Path) -> anyhow::Result<Vec<Point>> {
    parse_points(open("points", path)?)
        .with_context(|| format!("Failed to parse points file: {}", path.display()))
}

pub fn write_points(path: &Path, points: &[Point]) -> anyhow::Result<()> {
    write_points_to(create("points", path)?, points)
        .with_context(|| format!("Failed to write points file: {}", path.display()))
}

pub fn read_users(path: &Path) -> anyhow::Result<UserTable> {
    parse_users(open("users", path)?)
        .with_context(|| format!("Failed to parse users file: {}", path.display()))
}

pub fn write_users(path: &Path, table: &UserTable) -> anyhow::Result<()> {
    write_users_to(create("users", path)?, table)
        .with_context(|| format!("Failed to write users file: {}", path.display()))
}

fn parse_points<R>(reader: R) -> anyhow::Result<Vec<Point>>
where
    R: io::Read,
{
    let mut reader = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .from_reader(reader);
    reader
        .deserialize::<PointRecord>()
        .enumerate()
        .map(|(row, record)| -> anyhow::Result<Point> {
            let record = record.with_context(|| format!("Invalid point at row {}", row + 1))?;
            Ok(Point {
                id: record.id,
                user_id: record.user_id,
                level: record.level,
                lat: record.lat,
                lng: record.lng,
                timestamp: parse_timestamp(&record.timestamp)
                    .with_context(|| format!("Invalid point at row {}", row + 1))?,
            })
        })
        .collect()
}

fn write_points_to<W>(writer: W, points: &[Point]) -> anyhow::Result<()>
where
    W: io::Write,
{
    let mut writer = WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_writer(writer);
    for point in points {
        writer.serialize(PointRecord {
            id: point.id,
            user_id: point.user_id,
            level: point.level,
            lat: point.lat,
            lng: point.lng,
            timestamp: format_timestamp(&point.timestamp),
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn find_column(headers: &StringRecord, name: &str) -> anyhow::Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| anyhow::anyhow!("Required column '{name}' not found"))
}

fn parse_users<R>(reader: R) -> anyhow::Result<UserTable>
where
    R: io::Read,
{
    let mut reader = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .from_reader(reader);
    let headers = reader.headers()?.clone();
    let id_col = find_column(&headers, "id")?;
    let timestamp_col = find_column(&headers, "timestamp")?;
    let browser_col = find_column(&headers, "browser")?;

    // Derived device columns are recomputed on every clean
    let extra_cols = headers
        .iter()
        .enumerate()
        .filter(|(i, h)| {
            ![id_col, timestamp_col, browser_col].contains(i) && !DEVICE_COLUMNS.contains(h)
        })
        .map(|(i, _)| i)
        .collect::<Vec<_>>();
    let extra_columns = extra_cols
        .iter()
        .map(|&i| headers[i].to_owned())
        .collect();

    let mut users = vec![];
    for (row, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Invalid user at row {}", row + 1))?;
        let id = record[id_col]
            .trim()
            .parse()
            .with_context(|| format!("Invalid user id at row {}", row + 1))?;
        let timestamp = parse_timestamp(record[timestamp_col].trim())
            .with_context(|| format!("Invalid user at row {}", row + 1))?;
        users.push(User {
            id,
            timestamp,
            browser: record[browser_col].to_owned(),
            extra: extra_cols.iter().map(|&i| record[i].to_owned()).collect(),
            device: None,
        });
    }

    Ok(UserTable {
        extra_columns,
        users,
    })
}

fn write_users_to<W>(writer: W, table: &UserTable) -> anyhow::Result<()>
where
    W: io::Write,
{
    let mut writer = WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_writer(writer);

    let mut header = vec!["id", "timestamp", "browser"];
    header.extend(table.extra_columns.iter().map(String::as_str));
    header.extend(DEVICE_COLUMNS);
    writer.write_record(&header)?;

    for user in &table.users {
        let device = user
            .device
            .as_ref()
            .with_context(|| format!("User {} has no device classification", user.id))?;
        let mut record = vec![
            user.id.to_string(),
            format_timestamp(&user.timestamp),
            user.browser.clone(),
        ];
        record.extend(user.extra.iter().cloned());
        record.extend([
            device.os.clone(),
            device.os_generic.clone(),
            device.is_mobile.to_string(),
        ]);
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
