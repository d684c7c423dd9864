use chrono::{DateTime, FixedOffset, Local};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{CrawlError, Result};
use crate::models::{Observation, RecordKey};
use crate::readers::DedupIndex;
use crate::utils::filename::next_backup_path;

/// Append-only CSV file of observations plus its backup directory.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
    backup_dir: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup_dir: backup_dir.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn load_index(&self) -> Result<DedupIndex> {
        DedupIndex::load(&self.path)
    }

    /// Copy the store verbatim into the backup directory.
    ///
    /// Returns the backup path, or `None` when there is no store yet.
    pub fn backup(&self) -> Result<Option<PathBuf>> {
        self.backup_at(&Local::now())
    }

    fn backup_at(&self, at: &DateTime<Local>) -> Result<Option<PathBuf>> {
        if !self.exists() {
            debug!(store = %self.path.display(), "No store to back up");
            return Ok(None);
        }

        let backup_error = |source| CrawlError::Backup {
            path: self.path.clone(),
            source,
        };

        fs::create_dir_all(&self.backup_dir).map_err(backup_error)?;
        let target = next_backup_path(&self.backup_dir, &self.path, at);
        fs::copy(&self.path, &target).map_err(backup_error)?;

        info!(backup = %target.display(), "Backup created");
        Ok(Some(target))
    }

    /// Append observations in store column order. A header is written
    /// only when the store has none yet. A store holding nothing but blank
    /// lines is started afresh; existing rows are never touched.
    pub fn append_all(&self, observations: &[Observation]) -> Result<usize> {
        if observations.is_empty() {
            return Ok(0);
        }

        let has_header = DedupIndex::has_header(&self.path)?;
        if !has_header {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(has_header)
            .truncate(!has_header)
            .open(&self.path)?;

        if has_header && !Self::ends_with_newline(&self.path)? {
            file.write_all(b"\n")?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(!has_header)
            .from_writer(file);

        for observation in observations {
            writer.serialize(observation)?;
        }
        writer.flush()?;

        debug!(
            store = %self.path.display(),
            rows = observations.len(),
            "Appended observations"
        );
        Ok(observations.len())
    }

    /// Row and per-location statistics of the persisted store.
    pub fn summarize(&self) -> Result<StoreSummary> {
        let mut summary = StoreSummary::default();
        if !self.exists() {
            return Ok(summary);
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;
        for result in reader.deserialize::<RecordKey>() {
            let key = result?;
            summary.rows += 1;

            let location = summary.locations.entry(key.location).or_default();
            location.rows += 1;
            if location
                .latest
                .as_deref()
                .map_or(true, |latest| is_later(&key.timestamp, latest))
            {
                location.latest = Some(key.timestamp);
            }
        }

        Ok(summary)
    }

    fn ends_with_newline(path: &Path) -> Result<bool> {
        let mut file = File::open(path)?;
        file.seek(SeekFrom::End(-1))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)?;
        Ok(last[0] == b'\n')
    }
}

/// Compare ISO-8601 timestamps by instant, falling back to text order.
fn is_later(candidate: &str, current: &str) -> bool {
    let parse = |s: &str| DateTime::<FixedOffset>::parse_from_rfc3339(s).ok();
    match (parse(candidate), parse(current)) {
        (Some(a), Some(b)) => a > b,
        _ => candidate > current,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationSummary {
    pub rows: usize,
    pub latest: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSummary {
    pub rows: usize,
    pub locations: BTreeMap<String, LocationSummary>,
}

impl StoreSummary {
    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "{} rows across {} locations",
            self.rows,
            self.locations.len()
        )];
        for (name, location) in &self.locations {
            lines.push(format!(
                "  {:<24} {:>6} rows, latest {}",
                name,
                location.rows,
                location.latest.as_deref().unwrap_or("-")
            ));
        }
        lines.join("\n")
    }
}
