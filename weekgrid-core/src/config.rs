//! Global weekgrid configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{WeekgridError, WeekgridResult};
use crate::layout::DEFAULT_PIXELS_PER_MINUTE;
use crate::recurrence::DEFAULT_HORIZON_MONTHS;

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("weekgrid")
}

fn default_horizon_months() -> u32 {
    DEFAULT_HORIZON_MONTHS
}

fn default_pixels_per_minute() -> f64 {
    DEFAULT_PIXELS_PER_MINUTE
}

/// Configuration at ~/.config/weekgrid/config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekgridConfig {
    /// Where the event buckets live.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// How far forward open-ended recurrences are materialized.
    #[serde(default = "default_horizon_months")]
    pub horizon_months: u32,

    /// Vertical scale of the day grid.
    #[serde(default = "default_pixels_per_minute")]
    pub pixels_per_minute: f64,
}

impl Default for WeekgridConfig {
    fn default() -> Self {
        WeekgridConfig {
            data_dir: default_data_dir(),
            horizon_months: default_horizon_months(),
            pixels_per_minute: default_pixels_per_minute(),
        }
    }
}

impl WeekgridConfig {
    pub fn config_path() -> WeekgridResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| WeekgridError::Config("Could not determine config directory".into()))?
            .join("weekgrid");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file, falling back to defaults when it doesn't exist.
    pub fn load() -> WeekgridResult<Self> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| WeekgridError::Config(format!("Could not read config file: {e}")))?;
        toml::from_str(&content).map_err(|e| WeekgridError::Config(e.to_string()))
    }

    /// Save the current config to ~/.config/weekgrid/config.toml
    pub fn save(&self) -> WeekgridResult<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                WeekgridError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| WeekgridError::Config(e.to_string()))?;

        std::fs::write(&config_path, content)
            .map_err(|e| WeekgridError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &std::path::Path) -> WeekgridResult<()> {
        let contents = "\
# weekgrid configuration

# Where your event buckets live:
# data_dir = \"~/.local/share/weekgrid\"

# How many months ahead recurring events are materialized:
# horizon_months = 3

# Vertical scale of the day grid:
# pixels_per_minute = 0.75
";

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                WeekgridError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| WeekgridError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: WeekgridConfig = toml::from_str("").unwrap();
        assert_eq!(config.horizon_months, DEFAULT_HORIZON_MONTHS);
        assert_eq!(config.pixels_per_minute, DEFAULT_PIXELS_PER_MINUTE);
    }

    #[test]
    fn explicit_fields_override_defaults() {
        let config: WeekgridConfig = toml::from_str(
            "data_dir = \"/tmp/cal\"\nhorizon_months = 6\npixels_per_minute = 1.5\n",
        )
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/cal"));
        assert_eq!(config.horizon_months, 6);
        assert_eq!(config.pixels_per_minute, 1.5);
    }
}
