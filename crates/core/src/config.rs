//! Startup configuration.
//!
//! Values come from environment variables, falling back to the defaults in
//! [`crate::types`]:
//!
//! - `BLOCKFALL_GRID_WIDTH` / `BLOCKFALL_GRID_HEIGHT`: grid size in cells
//! - `BLOCKFALL_FRAME_MS`: target frame duration of the render loop
//! - `BLOCKFALL_DESCEND_CYCLE_MS`: wake-up interval of the descend task
//! - `BLOCKFALL_BASE_SPEED`: cells per cycle at level 1
//! - `BLOCKFALL_SEED`: piece generator seed (defaults to the clock)
//! - `BLOCKFALL_LOG_PATH`: file receiving log output

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::ConfigError;
use crate::types::{
    BASE_DESCEND_SPEED, DEFAULT_FRAME_MS, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH,
    DESCEND_CYCLE_MS, MIN_GRID_SIDE,
};

/// Game configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub grid_width: u8,
    pub grid_height: u8,
    pub frame_ms: u32,
    pub descend_cycle_ms: u32,
    pub base_speed: f32,
    pub seed: u32,
    pub log_path: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_HEIGHT,
            frame_ms: DEFAULT_FRAME_MS,
            descend_cycle_ms: DESCEND_CYCLE_MS,
            base_speed: BASE_DESCEND_SPEED,
            seed: 1,
            log_path: None,
        }
    }
}

impl GameConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::from_lookup(|key| env::var(key).ok())?;
        if env::var_os("BLOCKFALL_SEED").is_none() {
            config.seed = clock_seed();
        }
        Ok(config)
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            grid_width: parse(&lookup, "BLOCKFALL_GRID_WIDTH", defaults.grid_width)?,
            grid_height: parse(&lookup, "BLOCKFALL_GRID_HEIGHT", defaults.grid_height)?,
            frame_ms: parse(&lookup, "BLOCKFALL_FRAME_MS", defaults.frame_ms)?,
            descend_cycle_ms: parse(
                &lookup,
                "BLOCKFALL_DESCEND_CYCLE_MS",
                defaults.descend_cycle_ms,
            )?,
            base_speed: parse(&lookup, "BLOCKFALL_BASE_SPEED", defaults.base_speed)?,
            seed: parse(&lookup, "BLOCKFALL_SEED", defaults.seed)?,
            log_path: lookup("BLOCKFALL_LOG_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width < MIN_GRID_SIDE || self.grid_height < MIN_GRID_SIDE {
            return Err(ConfigError::GridTooSmall {
                width: self.grid_width,
                height: self.grid_height,
                min: MIN_GRID_SIDE,
            });
        }
        if self.frame_ms == 0 {
            return Err(ConfigError::Zero {
                key: "BLOCKFALL_FRAME_MS",
            });
        }
        if self.descend_cycle_ms == 0 {
            return Err(ConfigError::Zero {
                key: "BLOCKFALL_DESCEND_CYCLE_MS",
            });
        }
        if !self.base_speed.is_finite() || self.base_speed <= 0.0 {
            return Err(ConfigError::Speed(self.base_speed));
        }
        Ok(())
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.frame_ms))
    }

    pub fn descend_cycle(&self) -> Duration {
        Duration::from_millis(u64::from(self.descend_cycle_ms))
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = GameConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.descend_cycle(), Duration::from_millis(100));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = GameConfig::from_lookup(lookup(&[
            ("BLOCKFALL_GRID_WIDTH", "12"),
            ("BLOCKFALL_GRID_HEIGHT", " 24 "),
            ("BLOCKFALL_FRAME_MS", "33"),
            ("BLOCKFALL_SEED", "7"),
            ("BLOCKFALL_LOG_PATH", "/tmp/blockfall.log"),
        ]))
        .unwrap();
        assert_eq!(config.grid_width, 12);
        assert_eq!(config.grid_height, 24);
        assert_eq!(config.frame_duration(), Duration::from_millis(33));
        assert_eq!(config.seed, 7);
        assert_eq!(config.log_path, Some(PathBuf::from("/tmp/blockfall.log")));
    }

    #[test]
    fn malformed_value_names_the_key() {
        let err = GameConfig::from_lookup(lookup(&[("BLOCKFALL_GRID_WIDTH", "wide")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "BLOCKFALL_GRID_WIDTH",
                value: "wide".to_string()
            }
        );
    }

    #[test]
    fn rejects_tiny_grid_and_zero_durations() {
        assert!(matches!(
            GameConfig::from_lookup(lookup(&[("BLOCKFALL_GRID_HEIGHT", "3")])),
            Err(ConfigError::GridTooSmall { .. })
        ));
        assert!(matches!(
            GameConfig::from_lookup(lookup(&[("BLOCKFALL_DESCEND_CYCLE_MS", "0")])),
            Err(ConfigError::Zero { .. })
        ));
        assert!(matches!(
            GameConfig::from_lookup(lookup(&[("BLOCKFALL_BASE_SPEED", "-1")])),
            Err(ConfigError::Speed(_))
        ));
    }
}
