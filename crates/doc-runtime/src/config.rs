//! # Runtime Configuration
//!
//! Defaults suit a validator and REST API on localhost. Every value can be
//! overridden through a `DL_*` environment variable.

use dl_04_rest_gateway::GatewayConfig;
use dl_05_batch_submitter::SubmitterConfig;
use dl_08_event_listener::{ListenerConfig, DEFAULT_EVENT_PORT};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{variable} has an invalid value {value:?}")]
    InvalidValue { variable: &'static str, value: String },

    #[error("{0}")]
    Invalid(String),
}

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Ledger REST API base URL.
    pub rest_api_url: String,
    pub validator_host: String,
    pub validator_event_port: u16,
    /// Total bounded wait for a batch status.
    pub submit_max_wait: Duration,
    pub status_poll_interval: Duration,
    pub http_timeout: Duration,
    /// Subscribe and unsubscribe acknowledgement timeout.
    pub listener_request_timeout: Duration,
    /// Deadline of one request-driven or event-driven workflow.
    pub operation_timeout: Duration,
    pub log_level: String,
    pub json_logs: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            rest_api_url: "http://localhost:8008".to_string(),
            validator_host: "localhost".to_string(),
            validator_event_port: DEFAULT_EVENT_PORT,
            submit_max_wait: Duration::from_secs(10),
            status_poll_interval: Duration::from_millis(250),
            http_timeout: Duration::from_secs(10),
            listener_request_timeout: Duration::from_secs(5),
            operation_timeout: Duration::from_secs(10),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("DL_REST_API_URL") {
            config.rest_api_url = url;
        }
        if let Some(host) = lookup("DL_VALIDATOR_HOST") {
            config.validator_host = host;
        }
        if let Some(port) = parsed(&lookup, "DL_VALIDATOR_EVENT_PORT")? {
            config.validator_event_port = port;
        }
        if let Some(secs) = parsed(&lookup, "DL_SUBMIT_MAX_WAIT_SECS")? {
            config.submit_max_wait = Duration::from_secs(secs);
        }
        if let Some(ms) = parsed(&lookup, "DL_STATUS_POLL_INTERVAL_MS")? {
            config.status_poll_interval = Duration::from_millis(ms);
        }
        if let Some(secs) = parsed(&lookup, "DL_HTTP_TIMEOUT_SECS")? {
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parsed(&lookup, "DL_LISTENER_REQUEST_TIMEOUT_SECS")? {
            config.listener_request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parsed(&lookup, "DL_OPERATION_TIMEOUT_SECS")? {
            config.operation_timeout = Duration::from_secs(secs);
        }
        if let Some(level) = lookup("DL_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            config.log_level = level;
        }
        if let Some(json) = lookup("DL_JSON_LOGS") {
            config.json_logs = json.eq_ignore_ascii_case("true") || json == "1";
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gateway()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.submitter()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.listener()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.operation_timeout.is_zero() {
            return Err(ConfigError::Invalid("operation timeout must be > 0".into()));
        }
        Ok(())
    }

    pub fn gateway(&self) -> GatewayConfig {
        GatewayConfig {
            base_url: self.rest_api_url.clone(),
            request_timeout: self.http_timeout,
            ..GatewayConfig::default()
        }
    }

    pub fn submitter(&self) -> SubmitterConfig {
        SubmitterConfig {
            max_wait: self.submit_max_wait,
            poll_interval: self.status_poll_interval,
        }
    }

    pub fn listener(&self) -> ListenerConfig {
        ListenerConfig {
            validator_host: self.validator_host.clone(),
            event_port: self.validator_event_port,
            request_timeout: self.listener_request_timeout,
        }
    }
}

fn parsed<F, T>(lookup: &F, variable: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(variable) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { variable, value }),
    }
}
