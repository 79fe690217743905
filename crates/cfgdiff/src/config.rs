//! Configuration file support
//!
//! Read from `<config_dir>/cfgdiff/config.toml`, e.g.
//!
//! ```toml
//! [diff]
//! colorize = true
//! side_by_side_width = 0
//! mode = "side-by-side"
//! hint_cutoff = 0.75
//! algorithm = "patience"
//! ```

use anyhow::{Context, Result};
use cfgdiff_core::{Algorithm, DiffEngine, DEFAULT_HINT_CUTOFF};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// How the diff is printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    #[default]
    Unified,
    SideBySide,
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmName {
    #[default]
    Myers,
    Patience,
    Lcs,
}

impl AlgorithmName {
    pub fn algorithm(self) -> Algorithm {
        match self {
            AlgorithmName::Myers => Algorithm::Myers,
            AlgorithmName::Patience => Algorithm::Patience,
            AlgorithmName::Lcs => Algorithm::Lcs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    pub colorize: bool,
    /// 0 means use the terminal width
    pub side_by_side_width: usize,
    pub mode: ViewMode,
    pub hint_cutoff: f32,
    pub algorithm: AlgorithmName,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            colorize: true,
            side_by_side_width: 0,
            mode: ViewMode::default(),
            hint_cutoff: DEFAULT_HINT_CUTOFF,
            algorithm: AlgorithmName::default(),
        }
    }
}

impl DiffConfig {
    pub fn engine(&self) -> DiffEngine {
        DiffEngine::new()
            .with_algorithm(self.algorithm.algorithm())
            .with_hint_cutoff(self.hint_cutoff)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub diff: DiffConfig,
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cfgdiff").join("config.toml"))
    }

    /// Load from an explicit path, or from the default path if it exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn load_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::parse(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.diff.colorize);
        assert_eq!(config.diff.mode, ViewMode::Unified);
    }

    #[test]
    fn test_parse_diff_section() {
        let config = Config::parse(
            r#"
            [diff]
            colorize = false
            side_by_side_width = 120
            mode = "side-by-side"
            algorithm = "patience"
            "#,
        )
        .unwrap();

        assert!(!config.diff.colorize);
        assert_eq!(config.diff.side_by_side_width, 120);
        assert_eq!(config.diff.mode, ViewMode::SideBySide);
        assert_eq!(config.diff.algorithm, AlgorithmName::Patience);
        assert_eq!(config.diff.hint_cutoff, DEFAULT_HINT_CUTOFF);
    }

    #[test]
    fn test_invalid_mode_rejected() {
        assert!(Config::parse("[diff]\nmode = \"sideways\"\n").is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/cfgdiff.toml"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/cfgdiff.toml"));
    }
}
