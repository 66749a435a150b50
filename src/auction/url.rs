use crate::config::AuctionConfig;
use crate::error::{EpexError, Result};
use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use reqwest::Url;

/// Trading date (yesterday) and delivery date (today) in the market timezone
pub fn trading_and_delivery_dates(now: DateTime<Utc>, tz: Tz) -> (NaiveDate, NaiveDate) {
    let delivery = now.with_timezone(&tz).date_naive();
    let trading = delivery.checked_sub_days(Days::new(1)).unwrap_or(delivery);
    (trading, delivery)
}

/// Market-data page URL for the delivery day containing `now`
pub fn build_url(config: &AuctionConfig, now: DateTime<Utc>, tz: Tz) -> Result<Url> {
    let (trading, delivery) = trading_and_delivery_dates(now, tz);
    let trading = trading.format("%Y-%m-%d").to_string();
    let delivery = delivery.format("%Y-%m-%d").to_string();

    // The site expects the empty parameters to be present
    Url::parse_with_params(
        &config.market_url,
        &[
            ("market_area", config.market_area.as_str()),
            ("auction", config.auction.as_str()),
            ("trading_date", trading.as_str()),
            ("delivery_date", delivery.as_str()),
            ("underlying_year", ""),
            ("modality", config.modality.as_str()),
            ("sub_modality", config.sub_modality.as_str()),
            ("technology", ""),
            ("data_mode", "table"),
            ("period", ""),
            ("production_period", ""),
        ],
    )
    .map_err(|e| EpexError::config(format!("Invalid market URL '{}': {}", config.market_url, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Brussels;

    #[test]
    fn dates_follow_market_calendar() {
        // 23:30 UTC on 31 Dec is already 1 Jan in Brussels
        let now = Utc.with_ymd_and_hms(2023, 12, 31, 23, 30, 0).unwrap();
        let (trading, delivery) = trading_and_delivery_dates(now, Brussels);
        assert_eq!(delivery, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(trading, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn url_carries_all_parameters() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let url = build_url(&AuctionConfig::default(), now, Brussels).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.epexspot.com/en/market-data?market_area=BE&auction=IDA1&\
             trading_date=2024-02-29&delivery_date=2024-03-01&underlying_year=&\
             modality=Auction&sub_modality=Intraday&technology=&data_mode=table&\
             period=&production_period="
        );
    }

    #[test]
    fn invalid_market_url_is_config_error() {
        let cfg = AuctionConfig {
            market_url: "not a url".to_string(),
            ..AuctionConfig::default()
        };
        let err = build_url(&cfg, Utc::now(), Brussels).unwrap_err();
        assert!(matches!(err, EpexError::Config { .. }));
    }
}
