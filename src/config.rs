use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CrawlError, Result};
use crate::utils::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_BACKUP_DIR, DEFAULT_MAX_WORKERS, DEFAULT_OUTPUT_FILE,
    DEFAULT_TIMEOUT_SECS, MAX_WORKERS_LIMIT, SETTINGS_ENV_PREFIX,
};

/// Runtime settings for a crawl.
///
/// Resolved from built-in defaults, an optional settings file and
/// `AQI_CRAWLER_*` environment variables, in that order. CLI flags are
/// applied on top by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    pub output_file: PathBuf,
    pub backup_dir: PathBuf,
    pub max_workers: usize,
    pub timeout_secs: u64,
    pub api_base_url: String,
    pub stations_file: Option<PathBuf>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            backup_dir: PathBuf::from(DEFAULT_BACKUP_DIR),
            max_workers: DEFAULT_MAX_WORKERS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            stations_file: None,
        }
    }
}

impl CrawlerConfig {
    /// Load settings. A missing file is only an error when it was named
    /// explicitly (`required`).
    pub fn load(settings_file: Option<&Path>, required: bool) -> Result<Self> {
        Self::load_with_env(settings_file, required, None)
    }

    /// As [`CrawlerConfig::load`], reading `AQI_CRAWLER_*` variables from
    /// `env` instead of the process environment when given.
    pub fn load_with_env(
        settings_file: Option<&Path>,
        required: bool,
        env: Option<::config::Map<String, String>>,
    ) -> Result<Self> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = settings_file {
            builder = builder.add_source(::config::File::from(path).required(required));
        }

        let settings = builder
            .add_source(::config::Environment::with_prefix(SETTINGS_ENV_PREFIX).source(env))
            .build()?;

        let config: CrawlerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 || self.max_workers > MAX_WORKERS_LIMIT {
            return Err(CrawlError::Config(format!(
                "max_workers must be between 1 and {}",
                MAX_WORKERS_LIMIT
            )));
        }
        if self.timeout_secs == 0 {
            return Err(CrawlError::Config(
                "timeout_secs must be at least 1".to_string(),
            ));
        }
        if let Err(e) = reqwest::Url::parse(&self.api_base_url) {
            return Err(CrawlError::Config(format!(
                "api_base_url {:?} is not a valid URL: {}",
                self.api_base_url, e
            )));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CrawlerConfig::default();
        assert_eq!(config.output_file, PathBuf::from("aqi_data.csv"));
        assert_eq!(config.backup_dir, PathBuf::from("backups"));
        assert_eq!(config.max_workers, 10);
        assert_eq!(config.timeout(), Duration::from_secs(20));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_settings_file() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "max_workers = 4")?;
        writeln!(file, "output_file = \"data/readings.csv\"")?;

        let config = CrawlerConfig::load(Some(file.path()), true)?;

        assert_eq!(config.max_workers, 4);
        assert_eq!(config.output_file, PathBuf::from("data/readings.csv"));
        assert_eq!(config.timeout_secs, 20);
        Ok(())
    }

    #[test]
    fn test_optional_settings_file_may_be_missing() {
        let config = CrawlerConfig::load(Some(Path::new("does-not-exist.toml")), false);
        assert!(config.is_ok());
    }

    #[test]
    fn test_required_settings_file_must_exist() {
        let config = CrawlerConfig::load(Some(Path::new("does-not-exist.toml")), true);
        assert!(matches!(config, Err(CrawlError::Settings(_))));
    }

    #[test]
    fn test_environment_overrides_settings_file() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "max_workers = 4")?;
        writeln!(file, "backup_dir = \"from-file\"")?;

        let env = ::config::Map::from([
            ("AQI_CRAWLER_MAX_WORKERS".to_string(), "6".to_string()),
            ("AQI_CRAWLER_OUTPUT_FILE".to_string(), "env.csv".to_string()),
            ("UNRELATED_MAX_WORKERS".to_string(), "99".to_string()),
        ]);
        let config = CrawlerConfig::load_with_env(Some(file.path()), true, Some(env))?;

        assert_eq!(config.max_workers, 6);
        assert_eq!(config.output_file, PathBuf::from("env.csv"));
        assert_eq!(config.backup_dir, PathBuf::from("from-file"));
        assert_eq!(config.timeout_secs, 20);
        Ok(())
    }

    #[test]
    fn test_invalid_environment_value_rejected() {
        let env = ::config::Map::from([(
            "AQI_CRAWLER_MAX_WORKERS".to_string(),
            "0".to_string(),
        )]);
        let config = CrawlerConfig::load_with_env(None, false, Some(env));
        assert!(matches!(config, Err(CrawlError::Config(_))));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = CrawlerConfig {
            max_workers: 0,
            ..CrawlerConfig::default()
        };
        assert!(matches!(config.validate(), Err(CrawlError::Config(_))));
    }

    #[test]
    fn test_worker_count_is_capped() {
        let config = CrawlerConfig {
            max_workers: MAX_WORKERS_LIMIT,
            ..CrawlerConfig::default()
        };
        assert!(config.validate().is_ok());

        for max_workers in [MAX_WORKERS_LIMIT + 1, usize::MAX] {
            let config = CrawlerConfig {
                max_workers,
                ..CrawlerConfig::default()
            };
            assert!(matches!(config.validate(), Err(CrawlError::Config(_))));
        }
    }

    #[test]
    fn test_malformed_base_url_rejected() {
        let config = CrawlerConfig {
            api_base_url: "not a url".to_string(),
            ..CrawlerConfig::default()
        };
        assert!(matches!(config.validate(), Err(CrawlError::Config(_))));
    }
}
