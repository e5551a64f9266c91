//! Configuration file handling.
//!
//! Settings come from `landslide-dash.toml` (or `--config PATH`); every
//! field has a default and command-line flags override the file.

use crate::views::ChartToggles;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "landslide-dash.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub map: MapConfig,

    /// Initial chart visibility.
    #[serde(default)]
    pub charts: ChartToggles,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Event table source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// CSV file with landslide events.
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/landslide.csv")
}

/// Map backdrop settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Directory holding Natural Earth GeoJSON files.
    #[serde(default = "default_map_dir")]
    pub data_dir: PathBuf,

    /// Draw country borders.
    #[serde(default = "default_true")]
    pub borders: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            data_dir: default_map_dir(),
            borders: true,
        }
    }
}

fn default_map_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_true() -> bool {
    true
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    /// Log file. The dashboard never logs to the terminal it draws on.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: None,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load the explicit path if given, else `landslide-dash.toml` when present,
    /// else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let path = Path::new(CONFIG_FILE);
                if path.exists() {
                    Self::load(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Default configuration rendered as TOML, for `--init-config`.
    pub fn default_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default()).context("Failed to serialize default config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::parse(
            r#"
            [data]
            path = "/tmp/events.csv"

            [charts]
            map = false
            "#,
        )
        .unwrap();
        assert_eq!(config.data.path, PathBuf::from("/tmp/events.csv"));
        assert!(!config.charts.map);
        assert!(config.charts.trend);
        assert_eq!(config.logging.level, "info");
        assert!(config.map.borders);
    }

    #[test]
    fn test_default_toml_round_trips() {
        let text = Config::default_toml().unwrap();
        assert!(text.contains("[charts]"));
        assert_eq!(Config::parse(&text).unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(Config::parse("[data\npath = 1").is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        assert!(Config::discover(Some(Path::new("/no/such/config.toml"))).is_err());
    }
}
