use serde::Deserialize;
use std::time::Duration;

use crate::services::controller::{ControllerError, TickConfig, DEFAULT_HISTORY};

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000"). Unused by the simulate binary.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Milliseconds between progress ticks
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Progress percent added per tick
    #[serde(default = "default_tick_step")]
    pub tick_step: u8,

    /// Number of recent jobs kept observable by id
    #[serde(default = "default_job_history")]
    pub job_history: usize,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_tick_interval_ms() -> u64 {
    50
}

fn default_tick_step() -> u8 {
    1
}

fn default_job_history() -> usize {
    DEFAULT_HISTORY
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Validated tick cadence.
    pub fn tick_config(&self) -> Result<TickConfig, ControllerError> {
        TickConfig::new(Duration::from_millis(self.tick_interval_ms), self.tick_step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<AppConfig, envy::Error> {
        envy::from_iter(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        )
    }

    #[test]
    fn test_defaults() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.job_history, DEFAULT_HISTORY);
        assert_eq!(config.tick_config().unwrap(), TickConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[("TICK_INTERVAL_MS", "10"), ("TICK_STEP", "5")]).unwrap();
        let tick = config.tick_config().unwrap();
        assert_eq!(tick.interval(), Duration::from_millis(10));
        assert_eq!(tick.step(), 5);
    }

    #[test]
    fn test_zero_step_rejected() {
        let config = from_pairs(&[("TICK_STEP", "0")]).unwrap();
        assert!(config.tick_config().is_err());
    }
}
