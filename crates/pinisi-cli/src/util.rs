use std::{
    fs::{self, File},
    io,
    path::Path,
};

use anyhow::Context;

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Creates `dir` and its parents if missing.
pub fn ensure_dir(dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))
}

/// Parses a significance level in `[0, 1]`.
pub fn parse_alpha(s: &str) -> Result<f64, String> {
    let alpha = s
        .parse::<f64>()
        .map_err(|e| format!("invalid number '{s}': {e}"))?;
    if !(0.0..=1.0).contains(&alpha) {
        return Err(format!("alpha must be between 0 and 1, got {alpha}"));
    }
    Ok(alpha)
}

/// Parses a non-negative IQR multiplier.
pub fn parse_num_iqr(s: &str) -> Result<f64, String> {
    let num_iqr = s
        .parse::<f64>()
        .map_err(|e| format!("invalid number '{s}': {e}"))?;
    if num_iqr.is_nan() || num_iqr < 0.0 {
        return Err(format!("num_iqr must be >= 0, got {num_iqr}"));
    }
    Ok(num_iqr)
}

/// Parses a strictly positive area.
pub fn parse_area(s: &str) -> Result<f64, String> {
    let area = s
        .parse::<f64>()
        .map_err(|e| format!("invalid number '{s}': {e}"))?;
    if !(area.is_finite() && area > 0.0) {
        return Err(format!("area must be positive, got {area}"));
    }
    Ok(area)
}
