//! Shared outbound HTTP client

use crate::config::HttpConfig;
use crate::error::{EpexError, Result};
use std::time::Duration;

/// Build the client used by both fetchers
///
/// One client is shared so connections to the same host are pooled; the
/// timeout applies per request and a timed-out request counts as a transport
/// failure.
pub fn build_client(config: &HttpConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| EpexError::config(format!("Failed to build HTTP client: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_client_builds() {
        assert!(build_client(&HttpConfig::default()).is_ok());
    }
}
