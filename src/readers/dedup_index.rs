use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use crate::error::{CrawlError, Result};
use crate::models::RecordKey;

/// `(timestamp, location)` keys already present in the store.
///
/// Built once at the start of a run and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct DedupIndex {
    keys: HashSet<RecordKey>,
    rows: usize,
}

impl DedupIndex {
    /// Read every row of the store. A store that does not exist yet, or
    /// holds nothing but blank lines, yields an empty index.
    pub fn load(path: &Path) -> Result<Self> {
        let mut index = Self::default();
        let mut reader = match open_store(path)? {
            Some(reader) => reader,
            None => return Ok(index),
        };

        for (row, result) in reader.deserialize::<RecordKey>().enumerate() {
            let key = result.map_err(|e| CrawlError::StoreFormat {
                path: path.to_path_buf(),
                message: format!("row {}: {}", row + 1, e),
            })?;
            index.rows += 1;
            index.keys.insert(key);
        }

        Ok(index)
    }

    /// Whether the store already starts with a header naming the key
    /// columns. `false` for a missing or blank store.
    pub fn has_header(path: &Path) -> Result<bool> {
        Ok(open_store(path)?.is_some())
    }

    pub fn from_keys(keys: impl IntoIterator<Item = RecordKey>) -> Self {
        let mut index = Self::default();
        for key in keys {
            index.rows += 1;
            index.keys.insert(key);
        }
        index
    }

    pub fn contains(&self, timestamp: &str, location: &str) -> bool {
        // HashSet<RecordKey> cannot be probed with borrowed parts.
        self.keys
            .contains(&RecordKey::new(timestamp.to_string(), location.to_string()))
    }

    pub fn contains_key(&self, key: &RecordKey) -> bool {
        self.keys.contains(key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of data rows read from the store.
    pub fn existing_rows(&self) -> usize {
        self.rows
    }
}

/// Open the store positioned after its header row.
///
/// `None` when there is nothing to read. A header without the key columns,
/// or data rows under a blank header, is a [`CrawlError::StoreFormat`].
fn open_store(path: &Path) -> Result<Option<csv::Reader<File>>> {
    if !path.exists() {
        return Ok(None);
    }

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    let store_error = |message: &str| CrawlError::StoreFormat {
        path: path.to_path_buf(),
        message: message.to_string(),
    };

    if headers.iter().all(|field| field.trim().is_empty()) {
        if reader.records().next().is_some() {
            return Err(store_error("data rows without a header"));
        }
        return Ok(None);
    }

    let has_column = |names: &[&str]| headers.iter().any(|field| names.contains(&field.trim()));
    if !has_column(&["timestamp", "datetime"]) || !has_column(&["location", "city"]) {
        return Err(store_error(
            "header lacks timestamp/datetime and location/city columns",
        ));
    }

    Ok(Some(reader))
}
