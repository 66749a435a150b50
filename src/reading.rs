//! Reading combiner
//!
//! Merges the imbalance cost and the auction price into the published
//! [`Reading`]. A reading is rebuilt from scratch on every poll; nothing from
//! the previous cycle is carried over.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute label for the auction price
pub const ATTR_EPEX_PRICE: &str = "EPEX Price";
/// Attribute label for the imbalance cost
pub const ATTR_IMBALANCE_COSTS: &str = "Imbalance Costs";

/// Sign convention used to derive the total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineSign {
    /// `auction + imbalance`, published as "Total Price"
    #[default]
    Additive,
    /// `-(imbalance - auction)`, published as "Total Injection Price"
    Injection,
}

impl CombineSign {
    /// Derive the total from the two inputs
    pub fn apply(self, imbalance: f64, auction: f64) -> f64 {
        match self {
            Self::Additive => auction + imbalance,
            Self::Injection => -(imbalance - auction),
        }
    }

    /// Attribute label of the derived total
    pub const fn total_label(self) -> &'static str {
        match self {
            Self::Additive => "Total Price",
            Self::Injection => "Total Injection Price",
        }
    }
}

/// Where a price came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    Imbalance,
    Auction,
}

/// One fetched input value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub value: f64,
    pub source: PriceSource,
    pub observed_at: DateTime<Utc>,
}

/// Published sensor reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Derived total, `None` when the auction price was unavailable
    pub state: Option<f64>,
    pub epex_price: Option<f64>,
    pub imbalance_cost: f64,
    pub total_price: Option<f64>,
    /// Labeled inputs and total; empty when `state` is `None`
    pub attributes: BTreeMap<String, f64>,
    pub observed_at: DateTime<Utc>,
}

impl Reading {
    /// Reading for a cycle in which nothing could be published
    pub fn unavailable(imbalance: f64, observed_at: DateTime<Utc>) -> Self {
        Self {
            state: None,
            epex_price: None,
            imbalance_cost: imbalance,
            total_price: None,
            attributes: BTreeMap::new(),
            observed_at,
        }
    }

    pub const fn is_available(&self) -> bool {
        self.state.is_some()
    }

    /// The inputs this reading was built from
    pub fn records(&self) -> Vec<PriceRecord> {
        let mut out = vec![PriceRecord {
            value: self.imbalance_cost,
            source: PriceSource::Imbalance,
            observed_at: self.observed_at,
        }];
        if let Some(price) = self.epex_price {
            out.push(PriceRecord {
                value: price,
                source: PriceSource::Auction,
                observed_at: self.observed_at,
            });
        }
        out
    }
}

/// Combine the two inputs into a reading
pub fn combine(
    sign: CombineSign,
    imbalance: f64,
    auction: Option<f64>,
    observed_at: DateTime<Utc>,
) -> Reading {
    let Some(auction) = auction.filter(|p| p.is_finite()) else {
        return Reading::unavailable(imbalance, observed_at);
    };

    let total = sign.apply(imbalance, auction);
    let mut attributes = BTreeMap::new();
    attributes.insert(ATTR_EPEX_PRICE.to_string(), auction);
    attributes.insert(ATTR_IMBALANCE_COSTS.to_string(), imbalance);
    attributes.insert(sign.total_label().to_string(), total);

    Reading {
        state: Some(total),
        epex_price: Some(auction),
        imbalance_cost: imbalance,
        total_price: Some(total),
        attributes,
        observed_at,
    }
}
