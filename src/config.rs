//! Analysis configuration.
//!
//! Defaults are compiled in. An optional JSON file may override any subset of
//! the fields; missing fields keep their defaults.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// File looked up in the working directory by the binary.
pub const CONFIG_FILE: &str = "covid_eda.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// How the collected charts are presented once the pipeline finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Interactive window for line/bar charts, choropleths opened in the browser
    #[default]
    Window,
    /// Write every chart to the output directory
    Files,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub data_file: PathBuf,
    pub countries: Vec<String>,
    pub output_dir: PathBuf,
    pub display: DisplayMode,
    /// Open exported files with the system viewer
    pub open_exported: bool,
    /// Rows printed in the dataset preview
    pub preview_rows: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("owid-covid-data.csv"),
            countries: vec![
                "Kenya".to_string(),
                "United States".to_string(),
                "India".to_string(),
            ],
            output_dir: PathBuf::from("covid_charts"),
            display: DisplayMode::default(),
            open_exported: true,
            preview_rows: 5,
        }
    }
}

impl AnalysisConfig {
    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Use the file at `path` when it exists, the defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_cover_target_countries() {
        let config = AnalysisConfig::default();
        assert_eq!(config.countries, vec!["Kenya", "United States", "India"]);
        assert_eq!(config.display, DisplayMode::Window);
        assert_eq!(config.preview_rows, 5);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"countries": ["Brazil"], "display": "files"}}"#).unwrap();

        let config = AnalysisConfig::from_file(file.path()).unwrap();
        assert_eq!(config.countries, vec!["Brazil"]);
        assert_eq!(config.display, DisplayMode::Files);
        assert_eq!(config.data_file, PathBuf::from("owid-covid-data.csv"));
        assert!(config.open_exported);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig::load_or_default(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        assert!(matches!(
            AnalysisConfig::from_file(file.path()),
            Err(ConfigError::Json { .. })
        ));
    }
}
