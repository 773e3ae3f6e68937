use std::time::Duration;

use serde_json::{json, Value};
use thiserror::Error;

use crate::config::RelayConfig;

/// Failure modes of a single upstream call. None of them are retried.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("cannot connect to {label} at {target}: {detail}")]
    Unavailable {
        label: String,
        target: String,
        detail: String,
    },
    #[error("{label} did not respond within {timeout_ms}ms")]
    Timeout {
        label: String,
        timeout_ms: u64,
        status: u16,
    },
    #[error("{label} responded with status {status}")]
    Upstream { label: String, status: u16 },
    #[error("relay failure: {0}")]
    Internal(String),
}

impl RelayError {
    /// Classifies a failed call that ran under `timeout`.
    pub fn from_reqwest(err: reqwest::Error, config: &RelayConfig, timeout: Duration) -> Self {
        if err.is_timeout() {
            RelayError::Timeout {
                label: config.upstream_label.clone(),
                timeout_ms: timeout.as_millis() as u64,
                status: config.timeout_status,
            }
        } else if err.is_connect() {
            RelayError::Unavailable {
                label: config.upstream_label.clone(),
                target: config.target_url.clone(),
                detail: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            RelayError::Upstream {
                label: config.upstream_label.clone(),
                status: status.as_u16(),
            }
        } else {
            RelayError::Internal(err.to_string())
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::Unavailable { .. } => 503,
            RelayError::Timeout { status, .. } => *status,
            RelayError::Upstream { status, .. } => *status,
            RelayError::Internal(_) => 500,
        }
    }

    /// Label used for the `outcome` metric.
    pub fn outcome(&self) -> &'static str {
        match self {
            RelayError::Unavailable { .. } => "unavailable",
            RelayError::Timeout { .. } => "timeout",
            RelayError::Upstream { .. } => "upstream_error",
            RelayError::Internal(_) => "internal",
        }
    }

    pub fn to_body(&self, relay_time: &str) -> Value {
        match self {
            RelayError::Unavailable { label, target, .. } => json!({
                "error": format!("{label} unavailable"),
                "message": format!("Cannot connect to {label}"),
                "target": target,
                "relay_time": relay_time,
            }),
            RelayError::Timeout {
                label, timeout_ms, ..
            } => json!({
                "error": format!("{label} timeout"),
                "message": format!("{label} took too long to respond"),
                "timeout": format!("{timeout_ms}ms"),
                "relay_time": relay_time,
            }),
            RelayError::Upstream { label, status } => json!({
                "error": format!("{label} error"),
                "status": status,
                "message": format!("Request failed with status code {status}"),
                "relay_time": relay_time,
            }),
            RelayError::Internal(message) => json!({
                "error": "Relay server error",
                "message": message,
                "relay_time": relay_time,
            }),
        }
    }
}
