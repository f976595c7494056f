//! Configuration types for the ping-pong simulation renderer.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default sub-step count (one update pass per displayed frame).
fn default_substeps() -> u32 {
    1
}

/// Default alive fraction for sparse random seeding.
fn default_seed_threshold() -> f32 {
    0.05
}

fn default_window_width() -> u32 {
    640
}

fn default_window_height() -> u32 {
    480
}

fn default_show_diagnostics() -> bool {
    true
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// State grid width in cells. Fixed for the lifetime of the buffers.
    pub width: u32,
    /// State grid height in cells. Fixed for the lifetime of the buffers.
    pub height: u32,
    /// Update passes per displayed frame. Each pass reads the previous
    /// pass's output, so the count is strictly sequential.
    #[serde(default = "default_substeps")]
    pub substeps: u32,
    /// Probability that a cell starts alive. A uniform draw in [0, 1) below
    /// this value seeds the cell as (1, 1, 1, 1), otherwise (0, 0, 0, 1).
    #[serde(default = "default_seed_threshold")]
    pub seed_threshold: f32,
    /// Initial window width in logical pixels.
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    /// Initial window height in logical pixels.
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    /// Draw the diagnostics strip (seed texture plus both state buffers).
    #[serde(default = "default_show_diagnostics")]
    pub show_diagnostics: bool,
    /// Optional path to a WGSL update rule. When unset, the embedded
    /// default rule is used.
    #[serde(default)]
    pub update_shader: Option<PathBuf>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            substeps: default_substeps(),
            seed_threshold: default_seed_threshold(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            show_diagnostics: default_show_diagnostics(),
            update_shader: None,
        }
    }
}

impl SimulationConfig {
    /// Get total cell count (width * height).
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.substeps == 0 {
            return Err(ConfigError::InvalidSubsteps);
        }
        if !(0.0..=1.0).contains(&self.seed_threshold) {
            return Err(ConfigError::InvalidSeedThreshold(self.seed_threshold));
        }
        if self.window_width == 0 || self.window_height == 0 {
            return Err(ConfigError::InvalidWindowSize);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Grid dimensions (width, height) must be non-zero")]
    InvalidDimensions,
    #[error("Sub-step count must be at least 1")]
    InvalidSubsteps,
    #[error("Seed threshold must lie in [0, 1], got {0}")]
    InvalidSeedThreshold(f32),
    #[error("Window dimensions must be non-zero")]
    InvalidWindowSize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let mut config = SimulationConfig::default();
        config.width = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions)
        ));
    }

    #[test]
    fn test_zero_substeps_rejected() {
        let mut config = SimulationConfig::default();
        config.substeps = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidSubsteps)));
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let mut config = SimulationConfig::default();
        config.seed_threshold = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSeedThreshold(_))
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{"width": 256, "height": 128}"#).unwrap();
        assert_eq!(config.width, 256);
        assert_eq!(config.height, 128);
        assert_eq!(config.substeps, 1);
        assert!(config.update_shader.is_none());
    }
}
