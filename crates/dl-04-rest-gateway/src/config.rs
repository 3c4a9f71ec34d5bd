//! Gateway configuration.

use shared_types::LedgerError;
use std::time::Duration;

/// Where the REST API lives and how long single requests may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Base URL, e.g. `http://localhost:8008`.
    pub base_url: String,
    /// Upper bound for one HTTP exchange, independent of the caller deadline.
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8008".to_string(),
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(2),
        }
    }
}

impl GatewayConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(LedgerError::InvalidInput(format!(
                "REST API URL must be http(s): {}",
                self.base_url
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(LedgerError::InvalidInput("request timeout must be > 0".into()));
        }
        Ok(())
    }
}
