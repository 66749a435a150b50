//! Sensor adapter
//!
//! [`Sensor`] is the capability a host platform binds to: a name, the current
//! state, an attribute map, and an update hook. [`EpexImbalanceSensor`]
//! implements it on top of the two fetchers and the combiner without
//! depending on any particular host.

mod runner;

pub use runner::SensorRunner;

use crate::auction::AuctionPriceScraper;
use crate::config::Config;
use crate::error::Result;
use crate::imbalance::ImbalancePriceFetcher;
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::reading::{CombineSign, Reading, combine};
use crate::schedule::{PollSchedule, Throttle, Trigger};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};

/// Latest published reading, shared with consumers
pub type ReadingCell = Option<Arc<Reading>>;

/// Host-facing sensor capability
#[async_trait]
pub trait Sensor: Send + Sync {
    /// Display name
    fn name(&self) -> &str;

    /// Current state; `None` means unavailable
    fn state(&self) -> Option<f64>;

    /// Current attribute map
    fn attributes(&self) -> BTreeMap<String, f64>;

    /// Throttled refresh; returns whether a poll actually ran
    async fn update(&self) -> bool;
}

/// Auction price plus imbalance cost, published as one reading
pub struct EpexImbalanceSensor {
    name: String,
    sign: CombineSign,
    imbalance: ImbalancePriceFetcher,
    auction: AuctionPriceScraper,
    // Held for the whole poll so two polls never overlap
    throttle: Mutex<Throttle>,
    reading_tx: watch::Sender<ReadingCell>,
    logger: StructuredLogger,
}

impl EpexImbalanceSensor {
    pub fn new(
        name: impl Into<String>,
        sign: CombineSign,
        imbalance: ImbalancePriceFetcher,
        auction: AuctionPriceScraper,
        throttle: Throttle,
    ) -> Self {
        let name = name.into();
        let logger = get_logger_with_context(LogContext::new("sensor").with_sensor(&name));
        let (reading_tx, _rx) = watch::channel(None);
        Self {
            name,
            sign,
            imbalance,
            auction,
            throttle: Mutex::new(throttle),
            reading_tx,
            logger,
        }
    }

    /// Build the sensor and its HTTP client from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = crate::http::build_client(&config.http)?;
        let imbalance = ImbalancePriceFetcher::new(client.clone(), config.imbalance.clone());
        let auction = AuctionPriceScraper::new(client, config.auction.clone())?;
        let throttle = PollSchedule::from_config(&config.schedule).throttle();
        Ok(Self::new(
            config.name.clone(),
            config.combine_sign,
            imbalance,
            auction,
            throttle,
        ))
    }

    /// Receiver that observes every published reading
    pub fn subscribe(&self) -> watch::Receiver<ReadingCell> {
        self.reading_tx.subscribe()
    }

    /// Most recently published reading
    pub fn latest(&self) -> ReadingCell {
        self.reading_tx.borrow().clone()
    }

    /// One full fetch-and-combine cycle for `now`, without publishing
    pub async fn poll(&self, now: DateTime<Utc>) -> Reading {
        let (imbalance, auction) =
            tokio::join!(self.imbalance.fetch(), self.auction.fetch(now));
        combine(self.sign, imbalance, auction, now)
    }

    /// Poll and publish, honoring the throttle for throttled triggers
    ///
    /// Returns the new reading, or `None` when the throttle skipped the poll.
    pub async fn refresh(&self, trigger: Trigger) -> ReadingCell {
        let mut throttle = self.throttle.lock().await;
        let now = Utc::now();
        let last_run = throttle.last_run();
        if !trigger.is_throttled() {
            throttle.mark(now);
        } else if !throttle.try_acquire(now) {
            self.logger.debug(&format!(
                "Skipping {} poll; last run at {:?}",
                trigger.as_str(),
                last_run
            ));
            return None;
        }

        let reading = Arc::new(self.poll(now).await);
        if reading.is_available() {
            self.logger.info(&format!(
                "Published {} reading: state={:?} epex={:?} imbalance={:.2}",
                trigger.as_str(),
                reading.state,
                reading.epex_price,
                reading.imbalance_cost
            ));
        } else {
            self.logger.warn(&format!(
                "{} poll produced no state; sensor unavailable",
                trigger.as_str()
            ));
        }
        self.reading_tx.send_replace(Some(reading.clone()));
        Some(reading)
    }
}

#[async_trait]
impl Sensor for EpexImbalanceSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> Option<f64> {
        self.reading_tx.borrow().as_ref().and_then(|r| r.state)
    }

    fn attributes(&self) -> BTreeMap<String, f64> {
        self.reading_tx
            .borrow()
            .as_ref()
            .map(|r| r.attributes.clone())
            .unwrap_or_default()
    }

    async fn update(&self) -> bool {
        self.refresh(Trigger::Manual).await.is_some()
    }
}
