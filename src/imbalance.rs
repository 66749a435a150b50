//! Imbalance price fetcher
//!
//! Reads the most recent record of an open-data dataset and extracts one
//! numeric field. The value is a best-effort correction: every failure
//! degrades to `0.0` instead of blocking the reading.

use crate::config::ImbalanceConfig;
use crate::error::{EpexError, Result};
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use serde_json::Value;

/// Fetches the latest imbalance price from the configured dataset
#[derive(Debug, Clone)]
pub struct ImbalancePriceFetcher {
    client: reqwest::Client,
    config: ImbalanceConfig,
    logger: StructuredLogger,
}

impl ImbalancePriceFetcher {
    pub fn new(client: reqwest::Client, config: ImbalanceConfig) -> Self {
        let logger = get_logger_with_context(
            LogContext::new("imbalance")
                .with_field("dataset", config.dataset_id.clone())
                .with_field("field", config.price_field.clone()),
        );
        Self {
            client,
            config,
            logger,
        }
    }

    /// Records endpoint of the configured dataset
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}/records",
            self.config.base_url.trim_end_matches('/'),
            self.config.dataset_id.trim()
        )
    }

    /// Single attempt; `Ok(None)` when the record has no usable value
    pub async fn try_fetch(&self) -> Result<Option<f64>> {
        let resp = self
            .client
            .get(self.endpoint())
            .query(&[("limit", "1"), ("sort", "-datetime")])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(EpexError::network(format!(
                "Imbalance API returned {}",
                resp.status()
            )));
        }

        let text = resp.text().await?;
        let body: Value = serde_json::from_str(&text)?;
        extract_price(&body, &self.config.price_field)
    }

    /// Latest imbalance price, or `0.0` on any failure
    pub async fn fetch(&self) -> f64 {
        match self.try_fetch().await {
            Ok(Some(price)) => {
                self.logger
                    .debug(&format!("Imbalance price fetched: {price}"));
                price
            }
            Ok(None) => {
                self.logger
                    .debug("Latest record carries no price; using 0");
                0.0
            }
            Err(e) => {
                self.logger.warn(&format!(
                    "Imbalance fetch failed ({}): {}; using 0",
                    e.kind(),
                    e
                ));
                0.0
            }
        }
    }
}

/// Extract `field` from the first entry of `results`
///
/// An empty or missing `results` array is a no-match failure; a record whose
/// field is absent, null or not a number yields `Ok(None)`.
pub fn extract_price(body: &Value, field: &str) -> Result<Option<f64>> {
    let record = body
        .get("results")
        .and_then(Value::as_array)
        .and_then(|results| results.first())
        .ok_or_else(|| EpexError::no_match("Imbalance dataset returned no results"))?;

    let price = match record.get(field) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(price.filter(|p| p.is_finite()))
}
