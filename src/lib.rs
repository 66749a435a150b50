//! # epex-imbalance - EPEX intraday price with Elia imbalance costs
//!
//! Periodically fetches the latest grid-imbalance price from an open-data
//! REST endpoint and the intraday auction price for the current time window
//! from the public market-data page, combines them into one total, and
//! publishes the result as a named sensor reading.
//!
//! ## Architecture
//!
//! - `imbalance`: imbalance price fetcher (REST/JSON, degrades to 0)
//! - `auction`: auction price scraper (HTML table, degrades to none)
//! - `reading`: combiner and the published reading type
//! - `schedule`: throttle and grid-aligned poll triggers
//! - `sensor`: host-facing sensor capability and its poll loop
//! - `config`: YAML configuration and validation
//! - `logging`: structured logging and tracing
//! - `web`: JSON HTTP surface for the reading

pub mod auction;
pub mod config;
pub mod error;
pub mod http;
pub mod imbalance;
pub mod logging;
pub mod reading;
pub mod schedule;
pub mod sensor;
#[cfg(feature = "web")]
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use error::{EpexError, Result};
pub use reading::{CombineSign, Reading};
pub use sensor::{EpexImbalanceSensor, Sensor, SensorRunner};
