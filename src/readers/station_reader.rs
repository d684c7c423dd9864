use crate::error::{CrawlError, Result};
use crate::models::{StationCatalog, StationEntry};
use std::path::Path;

/// Reads a station catalog from a CSV file with a `location,station_id`
/// header.
pub struct StationReader;

impl StationReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_stations(&self, path: &Path) -> Result<Vec<StationEntry>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_path(path)?;

        let mut stations = Vec::new();
        for result in reader.deserialize::<StationEntry>() {
            stations.push(result?);
        }

        Ok(stations)
    }

    pub fn read_catalog(&self, path: &Path) -> Result<StationCatalog> {
        let stations = self.read_stations(path)?;
        if stations.is_empty() {
            return Err(CrawlError::Config(format!(
                "Station file {} lists no stations",
                path.display()
            )));
        }
        StationCatalog::new(stations)
    }
}

impl Default for StationReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_stations_file() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "location,station_id")?;
        writeln!(temp_file, "Hanoi, 1583")?;
        writeln!(temp_file, "# Toronto,5914")?;
        writeln!(temp_file, "Shinjuku (Tokyo),2289")?;

        let catalog = StationReader::new().read_catalog(temp_file.path())?;

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.entries()[0], StationEntry::new("Hanoi", "1583"));
        assert_eq!(
            catalog.entries()[1],
            StationEntry::new("Shinjuku (Tokyo)", "2289")
        );
        Ok(())
    }

    #[test]
    fn test_empty_stations_file_rejected() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "location,station_id")?;

        let result = StationReader::new().read_catalog(temp_file.path());

        assert!(matches!(result, Err(CrawlError::Config(_))));
        Ok(())
    }

    #[test]
    fn test_duplicate_locations_rejected() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "location,station_id")?;
        writeln!(temp_file, "Hanoi,1583")?;
        writeln!(temp_file, "Hanoi,8641")?;

        let result = StationReader::new().read_catalog(temp_file.path());

        assert!(matches!(result, Err(CrawlError::Config(_))));
        Ok(())
    }
}
