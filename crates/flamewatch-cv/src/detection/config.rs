//! Monitor configuration

use crate::region::Connectivity;
use crate::segment::ColorBand;
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Main monitor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub band: ColorBand,
    /// Largest-region area a frame must exceed to count as a detection
    pub area_threshold: u32,
    pub connectivity: Connectivity,
    pub cooldown_ms: u64,
    /// Upper bound on cycles per second
    pub max_fps: f64,
    pub max_frames: Option<u64>,
    pub pin: PinConfig,
    pub visualization: VisualizationConfig,
}

/// Output line configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinConfig {
    /// BCM line number
    pub line: u32,
    pub active_low: bool,
}

/// Debug output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationConfig {
    pub save_masks: bool,
    pub save_frames: bool,
    pub every_n_frames: u64,
    pub output_dir: PathBuf,
}

/// Rejected configuration values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid color band: {0}")]
    InvalidBand(String),
    #[error("max_fps must be a positive rate with a representable frame budget, got {0}")]
    InvalidFrameRate(f64),
    #[error("visualization.every_n_frames must be at least 1")]
    ZeroDumpInterval,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            band: ColorBand::flame(),
            area_threshold: 100,
            connectivity: Connectivity::Eight,
            cooldown_ms: 500,
            max_fps: 30.0,
            max_frames: None,
            pin: PinConfig::default(),
            visualization: VisualizationConfig::default(),
        }
    }
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            line: 17,
            active_low: false,
        }
    }
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            save_masks: false,
            save_frames: false,
            every_n_frames: 1,
            output_dir: "outputs".into(),
        }
    }
}

impl MonitorConfig {
    /// Load from a JSON file; a missing file yields the defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {:?}", path))?;
            let config: MonitorConfig = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config: {:?}", path))?;
            log::info!("Loaded configuration from {:?}", path);
            config
        } else {
            log::info!("Configuration file {:?} not found, using defaults", path);
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).with_context(|| format!("Failed to write config: {:?}", path))?;
        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if let Some(problem) = self.band.problem() {
            return Err(ConfigError::InvalidBand(problem));
        }
        if !self.max_fps.is_finite()
            || self.max_fps <= 0.0
            || Duration::try_from_secs_f64(1.0 / self.max_fps).is_err()
        {
            return Err(ConfigError::InvalidFrameRate(self.max_fps));
        }
        if self.visualization.every_n_frames == 0 {
            return Err(ConfigError::ZeroDumpInterval);
        }
        Ok(())
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Minimum duration of one cycle, zero (uncapped) for a rate `validate` rejects
    pub fn cycle_budget(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.max_fps).unwrap_or(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Hsv;

    #[test]
    fn test_defaults_match_flame_setup() {
        let config = MonitorConfig::default();
        assert_eq!(config.band, ColorBand::flame());
        assert_eq!(config.area_threshold, 100);
        assert_eq!(config.cooldown(), Duration::from_millis(500));
        assert_eq!(config.pin.line, 17);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_yields_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = MonitorConfig::load(dir.path().join("absent.json"))?;
        assert_eq!(config, MonitorConfig::default());
        Ok(())
    }

    #[test]
    fn test_partial_file_fills_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "area_threshold": 250, "pin": { "line": 27 } }"#)?;

        let config = MonitorConfig::load(&path)?;
        assert_eq!(config.area_threshold, 250);
        assert_eq!(config.pin.line, 27);
        assert!(!config.pin.active_low);
        assert_eq!(config.cooldown_ms, 500);
        Ok(())
    }

    #[test]
    fn test_save_then_load() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.json");
        let mut config = MonitorConfig::default();
        config.connectivity = Connectivity::Four;
        config.max_frames = Some(42);
        config.save(&path)?;

        assert_eq!(MonitorConfig::load(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_unparsable_file_is_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json")?;
        assert!(MonitorConfig::load(&path).is_err());
        Ok(())
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = MonitorConfig::default();
        config.band.lower = Hsv::new(40, 50, 50);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidBand(_))));

        let mut config = MonitorConfig::default();
        config.max_fps = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidFrameRate(0.0)));

        let mut config = MonitorConfig::default();
        config.visualization.every_n_frames = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroDumpInterval));
    }

    #[test]
    fn test_cycle_budget() {
        let mut config = MonitorConfig::default();
        config.max_fps = 20.0;
        assert_eq!(config.cycle_budget(), Duration::from_millis(50));
    }

    #[test]
    fn test_budget_too_long_for_duration_is_rejected() {
        let mut config = MonitorConfig::default();
        config.max_fps = 1e-20;
        assert_eq!(config.validate(), Err(ConfigError::InvalidFrameRate(1e-20)));
        assert_eq!(config.cycle_budget(), Duration::ZERO);

        config.max_fps = -5.0;
        assert_eq!(config.cycle_budget(), Duration::ZERO);
    }
}
