use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CrawlError>;

/// Errors that abort a run.
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Settings error: {0}")]
    Settings(#[from] ::config::ConfigError),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Backup of {} failed: {source}", .path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store {} is unreadable: {message}", .path.display())]
    StoreFormat { path: PathBuf, message: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Why a single station contributed nothing to a run. Never fatal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StationFailure {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("API error: {0}")]
    Api(String),

    #[error("{0}")]
    Parse(#[from] ParseFailure),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("{0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if let Some(status) = err.status() {
            TransportError::Status(status.as_u16())
        } else {
            // Strip the URL: it carries the access token.
            TransportError::Request(err.without_url().to_string())
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("parse failure for {location}: {reason}")]
pub struct ParseFailure {
    pub location: String,
    pub reason: String,
}

impl ParseFailure {
    pub fn new(location: &str, reason: impl Into<String>) -> Self {
        Self {
            location: location.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_failure_messages() {
        let failure = StationFailure::from(TransportError::Status(503));
        assert_eq!(failure.to_string(), "transport error: HTTP status 503");

        let failure = StationFailure::from(ParseFailure::new("Hanoi", "missing time.iso"));
        assert_eq!(failure.to_string(), "parse failure for Hanoi: missing time.iso");
    }

    #[test]
    fn test_backup_error_names_path() {
        let err = CrawlError::Backup {
            path: PathBuf::from("aqi_data.csv"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("aqi_data.csv"));
    }
}
