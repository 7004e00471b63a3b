//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.evslides.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".evslides.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Dataset endpoints.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Column offsets of the registration rows.
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Chart canvas settings.
    #[serde(default)]
    pub canvas: CanvasConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where the datasets come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Population by county (JSON array).
    #[serde(default = "default_population_url")]
    pub population_url: String,

    /// EV registrations (Socrata `rows.json` container).
    #[serde(default = "default_registrations_url")]
    pub registrations_url: String,

    /// County boundaries (GeoJSON feature collection).
    #[serde(default = "default_boundaries_url")]
    pub boundaries_url: String,

    /// State FIPS code the boundary features are filtered to.
    #[serde(default = "default_state_fips")]
    pub state_fips: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            population_url: default_population_url(),
            registrations_url: default_registrations_url(),
            boundaries_url: default_boundaries_url(),
            state_fips: default_state_fips(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_population_url() -> String {
    "https://data.wa.gov/resource/2hia-rqet.json".to_string()
}

fn default_registrations_url() -> String {
    "https://data.wa.gov/api/views/f6w7-q2d2/rows.json".to_string()
}

fn default_boundaries_url() -> String {
    "https://raw.githubusercontent.com/plotly/datasets/master/geojson-counties-fips.json"
        .to_string()
}

fn default_state_fips() -> String {
    "53".to_string()
}

fn default_timeout() -> u64 {
    120
}

/// Positions of the fields of interest inside a registration row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_county_column")]
    pub county_column: usize,

    #[serde(default = "default_model_year_column")]
    pub model_year_column: usize,

    #[serde(default = "default_ev_type_column")]
    pub ev_type_column: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            county_column: default_county_column(),
            model_year_column: default_model_year_column(),
            ev_type_column: default_ev_type_column(),
        }
    }
}

fn default_county_column() -> usize {
    9
}

fn default_model_year_column() -> usize {
    13
}

fn default_ev_type_column() -> usize {
    16
}

/// Chart canvas size in pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    450
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the slides and reports are written to.
    #[serde(default = "default_directory")]
    pub directory: String,

    /// Default output format (`svg`, `markdown` or `json`).
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            format: default_format(),
        }
    }
}

fn default_directory() -> String {
    "slides".to_string()
}

fn default_format() -> String {
    "svg".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.population_url {
            self.sources.population_url = url.clone();
        }
        if let Some(ref url) = args.registrations_url {
            self.sources.registrations_url = url.clone();
        }
        if let Some(ref url) = args.boundaries_url {
            self.sources.boundaries_url = url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.sources.timeout_seconds = timeout;
        }
        if let Some(ref dir) = args.output_dir {
            self.output.directory = dir.display().to_string();
        }
        if let Some(format) = args.format {
            self.output.format = format.as_str().to_string();
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sources.state_fips, "53");
        assert_eq!(config.layout.county_column, 9);
        assert_eq!(config.layout.model_year_column, 13);
        assert_eq!(config.layout.ev_type_column, 16);
        assert_eq!(config.canvas.width, 800);
        assert_eq!(config.canvas.height, 450);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[sources]
population_url = "http://localhost:8080/pop.json"
timeout_seconds = 10

[layout]
ev_type_column = 17

[output]
directory = "out"
format = "json"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.sources.population_url, "http://localhost:8080/pop.json");
        assert_eq!(config.sources.timeout_seconds, 10);
        assert_eq!(config.sources.state_fips, "53");
        assert_eq!(config.layout.ev_type_column, 17);
        assert_eq!(config.layout.county_column, 9);
        assert_eq!(config.output.directory, "out");
        assert_eq!(config.output.format, "json");
        assert_eq!(config.canvas.width, 800);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[sources]"));
        assert!(toml_str.contains("[layout]"));
        assert!(toml_str.contains("[canvas]"));
        assert!(toml_str.contains("[output]"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[canvas]\nwidth = 1024\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.canvas.width, 1024);
        assert_eq!(config.canvas.height, 450);
    }
}
