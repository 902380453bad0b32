//! Log output for the command line runner

use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::Level;

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    pub fn parse_level(&self) -> Result<Level> {
        parse_level(&self.level)
    }
}

pub fn parse_level(level: &str) -> Result<Level> {
    Level::from_str(level.trim()).map_err(|_| anyhow!("Unknown log level '{level}'"))
}

/// Install a global fmt subscriber writing to stderr. A subscriber that is
/// already installed is left in place.
pub fn init_tracing(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_level("WARN").unwrap(), Level::WARN);
        assert!(parse_level("loud").is_err());
    }

    #[test]
    fn test_default_level_is_info() {
        assert_eq!(LoggingConfig::default().parse_level().unwrap(), Level::INFO);
        let config: LoggingConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_tracing(Level::WARN);
        init_tracing(Level::DEBUG);
    }
}
