//! Configuration loading and generation.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SightError;

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Enable debug logging to file
    pub debug: bool,

    /// Path to log directory
    pub log_path: PathBuf,

    /// Days to keep rotated log files
    pub log_retention_days: u64,

    /// Analysis thresholds and tuning
    pub analysis: AnalysisOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            log_path: default_log_path(),
            log_retention_days: 3,
            analysis: AnalysisOptions::default(),
        }
    }
}

/// Knobs for the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Two instances belong together when their similarity exceeds this value.
    pub similarity_threshold: f64,
    /// Templates are scanned in chunks of this many bytes.
    pub chunk_size: usize,
    pub complexity_threshold: f64,
    pub maintainability_threshold: f64,
    pub accessibility_threshold: f64,
    /// More distinct variations than this triggers a consistency warning.
    pub variation_limit: usize,
    /// Skip the accessibility warning for classes no accessibility check applies to.
    pub skip_unchecked_accessibility: bool,
    /// Extract components and score relationships on the rayon pool.
    pub parallel: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.7,
            chunk_size: 5000,
            complexity_threshold: 0.7,
            maintainability_threshold: 0.5,
            accessibility_threshold: 0.7,
            variation_limit: 5,
            skip_unchecked_accessibility: false,
            parallel: true,
        }
    }
}

/// Smallest chunk that still fits a typical element.
pub const MIN_CHUNK_SIZE: usize = 64;

impl AnalysisOptions {
    /// Reject thresholds outside `[0, 1]` and unusably small chunks.
    pub fn validate(&self) -> Result<(), SightError> {
        let thresholds = [
            ("similarity_threshold", self.similarity_threshold),
            ("complexity_threshold", self.complexity_threshold),
            ("maintainability_threshold", self.maintainability_threshold),
            ("accessibility_threshold", self.accessibility_threshold),
        ];
        for (name, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(SightError::invalid_request(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.chunk_size < MIN_CHUNK_SIZE {
            return Err(SightError::invalid_request(format!(
                "chunk_size must be at least {MIN_CHUNK_SIZE}, got {}",
                self.chunk_size
            )));
        }
        Ok(())
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("pattern-sight")
}

/// Default log path: ~/.config/pattern-sight/logs
fn default_log_path() -> PathBuf {
    config_dir().join("logs")
}

/// Configuration service.
pub struct ConfigService;

impl ConfigService {
    /// Get the default configuration file path.
    pub fn default_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    /// Load configuration from file.
    ///
    /// A missing file yields the defaults; nothing is created on disk.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let path = path.map(PathBuf::from).unwrap_or_else(Self::default_path);
        let config_dir = path.parent();

        if !path.exists() {
            let mut config = Config::default();
            if let Some(dir) = config_dir {
                config.log_path = dir.join("logs");
            }
            return Ok(config);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if config.log_path == default_log_path()
            && let Some(dir) = config_dir
        {
            config.log_path = dir.join("logs");
        }

        config.analysis.validate()?;
        Ok(config)
    }

    /// Generate default configuration file at the default path.
    pub fn generate_default() -> Result<()> {
        Self::generate_at(&Self::default_path())
    }

    /// Generate default configuration file at the specified path.
    pub fn generate_at(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, Self::default_config_content())
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn default_config_content() -> String {
        r#"# pattern-sight configuration file

# Enable debug logging to file (default: false)
debug = false

# Path to log directory (default: ~/.config/pattern-sight/logs)
# log_path = "~/.config/pattern-sight/logs"

# Days to keep rotated log files (default: 3)
log_retention_days = 3

[analysis]
# Instances whose similarity exceeds this value share a pattern class
similarity_threshold = 0.7

# Templates are scanned in chunks of this many bytes
chunk_size = 5000

# Recommendation thresholds
complexity_threshold = 0.7
maintainability_threshold = 0.5
accessibility_threshold = 0.7

# Warn when a pattern has more distinct variations than this
variation_limit = 5

# Do not warn about accessibility for patterns without elements, e.g. {{ value }}
skip_unchecked_accessibility = false

# Extract components in parallel
parallel = true
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path_ends_with_config_toml() {
        let path = ConfigService::default_path();
        assert!(path.ends_with("pattern-sight/config.toml"));
    }

    #[test]
    fn test_generate_at_creates_parent_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("nested").join("dir").join("config.toml");

        ConfigService::generate_at(&config_path).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("similarity_threshold = 0.7"));
    }

    #[test]
    fn test_generated_file_round_trips_to_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        ConfigService::generate_at(&config_path).unwrap();

        let config = ConfigService::load(Some(&config_path)).unwrap();
        assert!(!config.debug);
        assert_eq!(config.log_retention_days, 3);
        assert_eq!(config.analysis, AnalysisOptions::default());
        assert_eq!(config.log_path, dir.path().join("logs"));
    }

    #[test]
    fn test_load_returns_defaults_when_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("nonexistent.toml");

        let config = ConfigService::load(Some(&config_path)).unwrap();

        assert!(!config_path.exists());
        assert_eq!(config.analysis.chunk_size, 5000);
    }

    #[test]
    fn test_partial_analysis_table_keeps_other_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "[analysis]\nsimilarity_threshold = 0.8\n").unwrap();

        let config = ConfigService::load(Some(&config_path)).unwrap();
        assert_eq!(config.analysis.similarity_threshold, 0.8);
        assert_eq!(config.analysis.variation_limit, 5);
        assert!(config.analysis.parallel);
    }

    #[test]
    fn test_out_of_range_threshold_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "[analysis]\naccessibility_threshold = 1.5\n").unwrap();

        let err = ConfigService::load(Some(&config_path)).unwrap_err();
        let sight = err.downcast_ref::<SightError>().unwrap();
        assert_eq!(sight.code, crate::error::ErrorCode::InvalidRequest);
    }

    #[test]
    fn test_tiny_chunk_size_is_rejected() {
        let options = AnalysisOptions {
            chunk_size: 8,
            ..AnalysisOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_load_invalid_toml_returns_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("bad.toml");
        fs::write(&config_path, "not valid [[[").unwrap();

        assert!(ConfigService::load(Some(&config_path)).is_err());
    }
}
