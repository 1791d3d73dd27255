use crate::timeline::{SpeedLimits, DEFAULT_MAX_SPEED, DEFAULT_MIN_SPEED, DEFAULT_SPEED};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    #[serde(default = "default_min_speed")]
    pub min_speed: f64,

    #[serde(default = "default_max_speed")]
    pub max_speed: f64,

    #[serde(default = "default_speed")]
    pub default_speed: f64,

    /// Roster file; the built-in voyages are used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roster_path: Option<PathBuf>,

    #[serde(default = "default_show_legend")]
    pub show_legend: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            min_speed: default_min_speed(),
            max_speed: default_max_speed(),
            default_speed: default_speed(),
            roster_path: None,
            show_legend: default_show_legend(),
        }
    }
}

fn default_tick_interval_ms() -> u64 {
    500
}

fn default_min_speed() -> f64 {
    DEFAULT_MIN_SPEED
}

fn default_max_speed() -> f64 {
    DEFAULT_MAX_SPEED
}

fn default_speed() -> f64 {
    DEFAULT_SPEED
}

fn default_show_legend() -> bool {
    true
}

impl Config {
    /// `$CHRONOMAP_CONFIG` if set, else `<config dir>/chronomap/config.toml`.
    pub fn path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os("CHRONOMAP_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join("chronomap").join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config = Self::from_toml_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            anyhow::bail!("tick_interval_ms must be greater than zero");
        }
        let speeds = [self.min_speed, self.default_speed, self.max_speed];
        if speeds.iter().any(|s| !s.is_finite()) {
            anyhow::bail!("speeds must be finite numbers");
        }
        if self.min_speed <= 0.0 {
            anyhow::bail!("min_speed must be positive, got {}", self.min_speed);
        }
        if !(self.min_speed <= self.default_speed && self.default_speed <= self.max_speed) {
            anyhow::bail!(
                "expected min_speed <= default_speed <= max_speed, got {} / {} / {}",
                self.min_speed,
                self.default_speed,
                self.max_speed
            );
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn speed_limits(&self) -> SpeedLimits {
        SpeedLimits {
            min: self.min_speed,
            max: self.max_speed,
            default: self.default_speed,
        }
    }
}
