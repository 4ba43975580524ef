//! Configuration loading and management

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tracing::Level;

/// Facade configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Display name for the logging context
    pub logger_name: String,

    /// Logfile to attach at construction, if any
    pub log_file: Option<PathBuf>,

    /// Explicit log level; None leaves the level to RUST_LOG (default info)
    pub log_level: Option<Level>,

    /// Receive timeout of the listener's dispatch loop
    pub poll_interval: Duration,

    /// Bounded join timeout when disabling the listener
    pub shutdown_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logger_name: "essentials".to_string(),
            log_file: None,
            log_level: None,
            poll_interval: Duration::from_millis(100),
            shutdown_timeout: Duration::from_secs(2),
        }
    }
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("ESSENTIALS_LOG_FILE") {
            config.log_file = Some(PathBuf::from(path));
        }

        if let Ok(level) = std::env::var("ESSENTIALS_LOG_LEVEL") {
            config.log_level = Some(
                level
                    .parse()
                    .map_err(|_| anyhow!("invalid ESSENTIALS_LOG_LEVEL {level:?}"))?,
            );
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.logger_name, "essentials");
        assert!(config.log_file.is_none());
        assert!(config.log_level.is_none());
        assert_eq!(config.poll_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_level_strings_parse() {
        let level: Level = "debug".parse().unwrap();
        assert_eq!(level, Level::DEBUG);
        assert!("loud".parse::<Level>().is_err());
    }
}
