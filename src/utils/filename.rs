use chrono::{DateTime, TimeZone};
use std::path::{Path, PathBuf};

/// Backup filename with format: {store-stem}_{YYYYmmdd_HHMMSS}.csv
pub fn generate_backup_filename<Tz>(store_path: &Path, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let stem = store_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "store".to_string());

    format!("{}_{}.csv", stem, at.format("%Y%m%d_%H%M%S"))
}

/// First free backup path in `backup_dir` for the given instant.
///
/// Two runs within the same second get `_1`, `_2`, ... suffixes so that an
/// earlier backup is never overwritten.
pub fn next_backup_path<Tz>(backup_dir: &Path, store_path: &Path, at: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let filename = generate_backup_filename(store_path, at);
    let candidate = backup_dir.join(&filename);
    if !candidate.exists() {
        return candidate;
    }

    let base = filename.trim_end_matches(".csv");
    (1..)
        .map(|n| backup_dir.join(format!("{}_{}.csv", base, n)))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use tempfile::TempDir;

    fn instant() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn test_generate_backup_filename() {
        let filename = generate_backup_filename(Path::new("data/aqi_data.csv"), &instant());
        assert_eq!(filename, "aqi_data_20240102_030405.csv");
    }

    #[test]
    fn test_next_backup_path_avoids_collision() {
        let dir = TempDir::new().unwrap();
        let store = Path::new("aqi_data.csv");

        let first = next_backup_path(dir.path(), store, &instant());
        assert_eq!(first, dir.path().join("aqi_data_20240102_030405.csv"));
        std::fs::write(&first, "x").unwrap();

        let second = next_backup_path(dir.path(), store, &instant());
        assert_eq!(second, dir.path().join("aqi_data_20240102_030405_1.csv"));
    }
}
