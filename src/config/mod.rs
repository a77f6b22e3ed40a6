//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::FinishType;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Points awarded to the winner per finish type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishPoints {
    #[serde(default = "default_spin")]
    pub spin: u32,

    #[serde(default = "default_burst")]
    pub burst: u32,

    #[serde(default = "default_over")]
    pub over: u32,

    #[serde(default = "default_extreme")]
    pub extreme: u32,
}

fn default_spin() -> u32 {
    1
}

fn default_burst() -> u32 {
    2
}

fn default_over() -> u32 {
    2
}

fn default_extreme() -> u32 {
    3
}

impl Default for FinishPoints {
    fn default() -> Self {
        Self {
            spin: default_spin(),
            burst: default_burst(),
            over: default_over(),
            extreme: default_extreme(),
        }
    }
}

impl FinishPoints {
    /// Table value for a finish; unrecognised finishes are worth 0.
    pub fn points_for(&self, finish: &FinishType) -> u32 {
        match finish {
            FinishType::Spin => self.spin,
            FinishType::Burst => self.burst,
            FinishType::Over => self.over,
            FinishType::Extreme => self.extreme,
            FinishType::Other(_) | FinishType::Unknown => 0,
        }
    }

    /// Highest value in the table.
    pub fn max(&self) -> u32 {
        self.spin.max(self.burst).max(self.over).max(self.extreme)
    }
}

/// Constants of the scoring formulas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// z value of the Wilson lower bound (1.96 = 95%)
    #[serde(default = "default_wilson_z")]
    pub wilson_z: f64,

    /// Pseudo-count damping the weighted win rate
    #[serde(default = "default_pseudo_count")]
    pub pseudo_count: f64,

    /// Normaliser for average points in the combo score
    #[serde(default = "default_max_finish_points")]
    pub max_finish_points: u32,

    /// Combos and parts with fewer matches are left out of listings
    #[serde(default)]
    pub min_matches: u32,
}

fn default_wilson_z() -> f64 {
    crate::calculate::WILSON_Z
}

fn default_pseudo_count() -> f64 {
    crate::calculate::PSEUDO_COUNT
}

fn default_max_finish_points() -> u32 {
    crate::calculate::MAX_FINISH_POINTS
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            wilson_z: default_wilson_z(),
            pseudo_count: default_pseudo_count(),
            max_finish_points: default_max_finish_points(),
            min_matches: 0,
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub finish_points: FinishPoints,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            scoring: ScoringConfig::default(),
            finish_points: FinishPoints::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scoring.wilson_z.is_nan() || self.scoring.wilson_z <= 0.0 {
            return Err(ConfigError::ValidationError(
                "Wilson z must be greater than 0".to_string(),
            ));
        }

        if self.scoring.pseudo_count.is_nan() || self.scoring.pseudo_count < 0.0 {
            return Err(ConfigError::ValidationError(
                "Pseudo-count must not be negative".to_string(),
            ));
        }

        if self.scoring.max_finish_points == 0 {
            return Err(ConfigError::ValidationError(
                "Max finish points must be greater than 0".to_string(),
            ));
        }

        if self.scoring.max_finish_points < self.finish_points.max() {
            return Err(ConfigError::ValidationError(format!(
                "Max finish points ({}) is below the best finish value ({})",
                self.scoring.max_finish_points,
                self.finish_points.max()
            )));
        }

        Ok(())
    }
}
