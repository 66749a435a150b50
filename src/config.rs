//! Configuration management for epex-imbalance
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files. Every section has defaults, so a file only
//! needs to carry the values that differ.

use crate::error::{EpexError, Result};
use crate::reading::CombineSign;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod defaults;

pub use defaults::{DEFAULT_CONFIG_PATHS, DEFAULT_NAME};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Display name of the published reading
    pub name: String,

    /// Imbalance price dataset selection
    pub imbalance: ImbalanceConfig,

    /// Auction market-data page parameters
    pub auction: AuctionConfig,

    /// How the two prices are combined into the total
    pub combine_sign: CombineSign,

    /// Polling cadence
    pub schedule: ScheduleConfig,

    /// Outbound HTTP settings shared by both fetchers
    pub http: HttpConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// JSON HTTP surface for the published reading
    pub web: WebConfig,
}

/// Imbalance dataset endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImbalanceConfig {
    /// Catalog base URL; the dataset id is appended as a path segment
    pub base_url: String,

    /// Dataset identifier (e.g. `ods161`)
    pub dataset_id: String,

    /// Numeric field read from the most recent record
    pub price_field: String,
}

/// Auction market-data page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuctionConfig {
    /// Market-data page URL without query string
    pub market_url: String,

    /// Market area code (e.g. `BE`)
    pub market_area: String,

    /// Auction code (e.g. `IDA1`)
    pub auction: String,

    /// Modality (e.g. `Auction`)
    pub modality: String,

    /// Sub modality (e.g. `Intraday`)
    pub sub_modality: String,

    /// IANA timezone the market time windows are expressed in
    pub timezone: String,
}

/// Which cadences drive the poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleMode {
    /// Fixed ticks gated by a minimum interval
    Throttle,
    /// Offsets after each grid mark
    GridAligned,
    /// Union of both
    Both,
}

/// Polling cadence configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Cadence selection
    pub mode: ScheduleMode,

    /// Minimum seconds between two executions in throttle mode
    pub min_interval_seconds: u64,

    /// Grid size in minutes; must divide an hour
    pub grid_minutes: u32,

    /// Minutes after each grid mark at which a poll fires
    pub offsets_minutes: Vec<u32>,
}

/// Outbound HTTP settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// User-Agent header sent on every request
    pub user_agent: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Path to log file; its parent directory receives daily-rotated files
    pub file: String,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,

    /// Number of rotated files to keep
    pub backup_count: u32,
}

/// HTTP surface binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Serve `/api/*` routes
    pub enabled: bool,

    /// Bind address
    pub host: String,

    /// TCP port
    pub port: u16,
}

impl AuctionConfig {
    /// Resolve the configured market timezone
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        self.timezone.parse::<chrono_tz::Tz>().map_err(|_| {
            EpexError::validation(
                "auction.timezone".to_string(),
                format!("Unknown timezone '{}'", self.timezone),
            )
        })
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from `EPEX_CONFIG` or the default locations
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var("EPEX_CONFIG")
            && !path.trim().is_empty()
        {
            return Self::from_file(path.trim());
        }

        for path in DEFAULT_CONFIG_PATHS {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        // Fall back to default configuration
        Ok(Self::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(EpexError::validation("name", "Name cannot be empty"));
        }

        require_http_url("imbalance.base_url", &self.imbalance.base_url)?;
        if self.imbalance.dataset_id.trim().is_empty() {
            return Err(EpexError::validation(
                "imbalance.dataset_id",
                "Dataset id cannot be empty",
            ));
        }
        if self.imbalance.price_field.trim().is_empty() {
            return Err(EpexError::validation(
                "imbalance.price_field",
                "Price field cannot be empty",
            ));
        }

        require_http_url("auction.market_url", &self.auction.market_url)?;
        self.auction.tz()?;

        if self.schedule.min_interval_seconds == 0 {
            return Err(EpexError::validation(
                "schedule.min_interval_seconds",
                "Must be greater than 0",
            ));
        }
        let grid = self.schedule.grid_minutes;
        if grid == 0 || grid > 60 || 60 % grid != 0 {
            return Err(EpexError::validation(
                "schedule.grid_minutes",
                "Must divide 60",
            ));
        }
        if self.schedule.mode != ScheduleMode::Throttle {
            if self.schedule.offsets_minutes.is_empty() {
                return Err(EpexError::validation(
                    "schedule.offsets_minutes",
                    "At least one offset is required for grid-aligned polling",
                ));
            }
            if self.schedule.offsets_minutes.iter().any(|m| *m >= grid) {
                return Err(EpexError::validation(
                    "schedule.offsets_minutes",
                    "Offsets must be smaller than the grid size",
                ));
            }
        }

        if self.http.timeout_seconds == 0 {
            return Err(EpexError::validation(
                "http.timeout_seconds",
                "Must be greater than 0",
            ));
        }

        crate::logging::parse_log_level(&self.logging.level)?;

        if self.web.enabled && self.web.port == 0 {
            return Err(EpexError::validation(
                "web.port",
                "Port must be greater than 0",
            ));
        }

        Ok(())
    }
}

fn require_http_url(field: &str, value: &str) -> Result<()> {
    let v = value.trim();
    if v.starts_with("http://") || v.starts_with("https://") {
        Ok(())
    } else {
        Err(EpexError::validation(
            field.to_string(),
            format!("'{value}' is not an http(s) URL"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.name, "EPEX Imbalance Costs");
        assert_eq!(config.imbalance.dataset_id, "ods161");
        assert_eq!(config.imbalance.price_field, "imbalanceprice");
        assert_eq!(config.auction.timezone, "Europe/Brussels");
        assert_eq!(config.schedule.offsets_minutes, vec![1, 7]);
        assert_eq!(config.http.timeout_seconds, 10);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.auction.timezone = "Mars/Olympus".to_string();
        assert!(config.validate().is_err());

        config = Config::default();
        config.schedule.grid_minutes = 7;
        assert!(config.validate().is_err());

        config = Config::default();
        config.schedule.offsets_minutes = vec![1, 15];
        assert!(config.validate().is_err());

        config = Config::default();
        config.imbalance.base_url = "opendata.elia.be".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_yaml_uses_defaults() {
        let yaml = "name: Injection\ncombine_sign: injection\nimbalance:\n  dataset_id: ods136\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.name, "Injection");
        assert_eq!(config.combine_sign, CombineSign::Injection);
        assert_eq!(config.imbalance.dataset_id, "ods136");
        assert_eq!(config.imbalance.price_field, "imbalanceprice");
        assert_eq!(config.auction.market_area, "BE");
    }

    #[test]
    fn offsets_are_not_checked_in_throttle_mode() {
        let mut config = Config::default();
        config.schedule.mode = ScheduleMode::Throttle;
        config.schedule.offsets_minutes.clear();
        assert!(config.validate().is_ok());
    }
}
