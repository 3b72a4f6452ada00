//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{Error, Result};

/// Label recorded on every saved history as its provenance.
pub const DEFAULT_SOURCE_LABEL: &str = "Importado via PDF";

/// Paths to all data directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Database directory (`data/db/`).
    pub db: PathBuf,
    /// Heuristic overrides (`data/heuristics.json`).
    pub heuristics_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            db: root.join("db"),
            heuristics_file: root.join("heuristics.json"),
            root,
        };
        std::fs::create_dir_all(&paths.db)?;
        Ok(paths)
    }
}

/// Policy constants of the bond reconstruction and aggregation heuristics.
///
/// Changing any of these changes observable output on real statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    /// Tokens inspected before a date for identification header markers.
    pub header_lookback: usize,
    /// Maximum distance searched backwards from a date for an employer name.
    pub name_lookback: usize,
    /// Assembled names shorter than this (in characters) are rejected.
    pub min_name_len: usize,
    /// Day count of one month when normalizing aggregated totals.
    pub days_per_month: u32,
    /// Month count of one year when normalizing aggregated totals.
    pub months_per_year: u32,
    /// Also treat purely numeric tokens (sequence numbers, day counts) as noise.
    pub ignore_bare_numbers: bool,
    /// Provenance label attached to saved histories.
    pub source_label: String,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            header_lookback: 3,
            name_lookback: 15,
            min_name_len: 3,
            days_per_month: 30,
            months_per_year: 12,
            ignore_bare_numbers: false,
            source_label: DEFAULT_SOURCE_LABEL.to_string(),
        }
    }
}

impl HeuristicConfig {
    /// Load overrides from a JSON file, falling back to defaults when the
    /// file is absent or fails [`Self::read`].
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::read(path) {
            Ok(config) => {
                info!("Loaded heuristic overrides from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring heuristics file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse and validate an overrides file.
    pub fn read(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: HeuristicConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the reconstruction and aggregation cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.days_per_month == 0 || self.months_per_year == 0 {
            return Err(Error::Config(
                "days_per_month and months_per_year must be positive".into(),
            ));
        }
        if self.name_lookback == 0 {
            return Err(Error::Config("name_lookback must be positive".into()));
        }
        Ok(())
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Reconstruction and aggregation policy.
    pub heuristics: HeuristicConfig,
}

impl AppConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3010);

        let data_paths = DataPaths::new(data_dir)?;
        let heuristics = HeuristicConfig::load(&data_paths.heuristics_file);

        Ok(Self {
            port,
            data_paths,
            heuristics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_policy() {
        let config = HeuristicConfig::default();
        assert_eq!(config.header_lookback, 3);
        assert_eq!(config.name_lookback, 15);
        assert_eq!(config.days_per_month, 30);
        assert_eq!(config.months_per_year, 12);
        assert!(!config.ignore_bare_numbers);
        assert_eq!(config.source_label, "Importado via PDF");
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("heuristics.json");
        std::fs::write(&path, r#"{"name_lookback": 20, "ignore_bare_numbers": true}"#).unwrap();

        let config = HeuristicConfig::load(&path);
        assert_eq!(config.name_lookback, 20);
        assert!(config.ignore_bare_numbers);
        assert_eq!(config.header_lookback, 3);
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("heuristics.json");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(HeuristicConfig::load(&path), HeuristicConfig::default());
    }

    #[test]
    fn test_data_paths_creates_db_dir() {
        let dir = TempDir::new().unwrap();
        let paths = DataPaths::new(dir.path().join("data")).unwrap();
        assert!(paths.db.is_dir());
        assert!(paths.heuristics_file.ends_with("heuristics.json"));
    }

    #[test]
    fn test_zero_conversion_factor_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("heuristics.json");
        std::fs::write(&path, r#"{"days_per_month": 0}"#).unwrap();

        let err = HeuristicConfig::read(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(HeuristicConfig::load(&path), HeuristicConfig::default());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = HeuristicConfig::load(&dir.path().join("absent.json"));
        assert_eq!(config, HeuristicConfig::default());
        assert!(config.validate().is_ok());
    }
}
