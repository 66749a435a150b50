//! Intraday auction price scraper
//!
//! Fetches the public market-data page for today's delivery day, parses the
//! time-window labels and the price column, and returns the price of the
//! window containing the current market time.
//!
//! - `url`: query URL for the trading/delivery dates
//! - `table`: HTML extraction and price-text normalization
//! - `window`: label parsing and time matching

pub mod table;
pub mod url;
pub mod window;

pub use table::{parse_page, parse_price_text};
pub use self::url::build_url;
pub use window::{TimeWindowPrice, market_time, parse_window_label, select_price};

use crate::config::AuctionConfig;
use crate::error::{EpexError, Result};
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Scrapes the auction price for the current time window
#[derive(Debug, Clone)]
pub struct AuctionPriceScraper {
    client: reqwest::Client,
    config: AuctionConfig,
    tz: Tz,
    logger: StructuredLogger,
}

impl AuctionPriceScraper {
    /// Fails only when the configured timezone is unknown
    pub fn new(client: reqwest::Client, config: AuctionConfig) -> Result<Self> {
        let tz = config.tz()?;
        let logger = get_logger_with_context(
            LogContext::new("auction")
                .with_field("market", config.market_area.clone())
                .with_field("auction", config.auction.clone()),
        );
        Ok(Self {
            client,
            config,
            tz,
            logger,
        })
    }

    /// Download the market-data page for the delivery day containing `now`
    pub async fn fetch_page(&self, now: DateTime<Utc>) -> Result<String> {
        let url = build_url(&self.config, now, self.tz)?;
        self.logger.trace(&format!("GET {url}"));

        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(EpexError::network(format!(
                "Market page returned {}",
                resp.status()
            )));
        }
        Ok(resp.text().await?)
    }

    /// Single attempt with the failure classified
    pub async fn try_fetch(&self, now: DateTime<Utc>) -> Result<f64> {
        let html = self.fetch_page(now).await?;
        let windows = parse_page(&html)?;
        let local = market_time(now, self.tz);
        self.logger.debug(&format!(
            "Parsed {} time windows; market time {}",
            windows.len(),
            local.format("%H:%M")
        ));
        select_price(&windows, local).ok_or_else(|| {
            EpexError::no_match(format!(
                "no time window contains {}",
                local.format("%H:%M")
            ))
        })
    }

    /// Auction price for `now`, or `None` on any failure
    pub async fn fetch(&self, now: DateTime<Utc>) -> Option<f64> {
        match self.try_fetch(now).await {
            Ok(price) => {
                self.logger.debug(&format!("Auction price fetched: {price}"));
                Some(price)
            }
            Err(e) => {
                self.logger
                    .warn(&format!("Auction fetch failed ({}): {}", e.kind(), e));
                None
            }
        }
    }
}
