use super::*;

/// Display name used when the configuration does not set one
pub const DEFAULT_NAME: &str = "EPEX Imbalance Costs";

/// Locations searched by [`Config::load`], in order
pub const DEFAULT_CONFIG_PATHS: [&str; 3] = [
    "epex_imbalance.yaml",
    "/data/epex_imbalance.yaml",
    "/etc/epex-imbalance/config.yaml",
];

impl ImbalanceConfig {
    /// Published imbalance prices (`ods161`)
    pub fn published() -> Self {
        Self {
            base_url: "https://opendata.elia.be/api/explore/v2.1/catalog/datasets".to_string(),
            dataset_id: "ods161".to_string(),
            price_field: "imbalanceprice".to_string(),
        }
    }

    /// Forecast imbalance prices (`ods136`)
    pub fn forecast() -> Self {
        Self {
            dataset_id: "ods136".to_string(),
            price_field: "predictions_silinearregressionforecast".to_string(),
            ..Self::published()
        }
    }
}

impl Default for ImbalanceConfig {
    fn default() -> Self {
        Self::published()
    }
}

impl Default for AuctionConfig {
    fn default() -> Self {
        Self {
            market_url: "https://www.epexspot.com/en/market-data".to_string(),
            market_area: "BE".to_string(),
            auction: "IDA1".to_string(),
            modality: "Auction".to_string(),
            sub_modality: "Intraday".to_string(),
            timezone: "Europe/Brussels".to_string(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            mode: ScheduleMode::Both,
            min_interval_seconds: 60,
            grid_minutes: 15,
            offsets_minutes: vec![1, 7],
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            user_agent: format!("epex-imbalance/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: "/tmp/epex-imbalance.log".to_string(),
            console_output: true,
            json_format: false,
            backup_count: 5,
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: 8089,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            imbalance: ImbalanceConfig::default(),
            auction: AuctionConfig::default(),
            combine_sign: CombineSign::default(),
            schedule: ScheduleConfig::default(),
            http: HttpConfig::default(),
            logging: LoggingConfig::default(),
            web: WebConfig::default(),
        }
    }
}
