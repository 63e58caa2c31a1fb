//! SDK configuration
//!
//! Explicitly constructed and injected; there is no implicit global
//! configuration so tests can instantiate isolated instances.

use std::time::Duration;

/// Stable account/application identity used for the validation handshake.
#[derive(Debug, Clone)]
pub struct SdkConfig {
    /// Base URL of the campaign backend (e.g. `https://api.example.com/v1`)
    pub base_url: String,
    /// Stable account identifier issued to the host app
    pub account_id: String,
    /// Application identifier within the account
    pub app_id: String,
    /// Per-attempt network timeout
    pub request_timeout: Duration,
}

impl SdkConfig {
    /// Default per-attempt network budget.
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

    /// Create a config with the default 15s request timeout.
    #[must_use]
    pub fn new(base_url: String, account_id: String, app_id: String) -> Self {
        Self { base_url, account_id, app_id, request_timeout: Self::DEFAULT_REQUEST_TIMEOUT }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_applies_default_timeout() {
        let config = SdkConfig::new(
            "https://api.example.com".to_string(),
            "acct-1".to_string(),
            "app-1".to_string(),
        );
        assert_eq!(config.request_timeout, Duration::from_secs(15));
    }
}
