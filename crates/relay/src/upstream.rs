use std::time::{Duration, Instant};

use anyhow::Result;
use metrics::{Histogram, IntCounterVec, MetricsHandle};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::RelayConfig;
use crate::error::RelayError;

/// A successful upstream response, ready to be written back verbatim.
#[derive(Debug, Clone)]
pub struct Forwarded {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub duration: Duration,
}

impl Forwarded {
    /// Number of notices in a listing envelope, if the body is one.
    pub fn notice_count(&self) -> Option<usize> {
        serde_json::from_slice::<Value>(&self.body)
            .ok()?
            .pointer("/data/notices")?
            .as_array()
            .map(Vec::len)
    }
}

#[derive(Debug, Clone)]
pub struct Probe {
    pub duration: Duration,
    pub data: Value,
}

struct RelayMetrics {
    requests: IntCounterVec,
    upstream_seconds: Histogram,
}

/// Forwards announcement queries to one configured upstream.
pub struct Relay {
    config: RelayConfig,
    client: reqwest::Client,
    metrics: MetricsHandle,
    counters: RelayMetrics,
    started: Instant,
}

impl Relay {
    pub fn new(config: RelayConfig, metrics: MetricsHandle) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.upstream_headers {
            headers.insert(
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        let counters = RelayMetrics {
            requests: metrics.counter_vec(
                "relay_requests_total",
                "Relayed announcement requests by outcome",
                &["outcome"],
            )?,
            upstream_seconds: metrics.histogram(
                "relay_upstream_seconds",
                "Latency of successful upstream calls",
            )?,
        };

        Ok(Self {
            config,
            client,
            metrics,
            counters,
            started: Instant::now(),
        })
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn metrics(&self) -> &MetricsHandle {
        &self.metrics
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    /// One GET against the upstream. Non-2xx responses become
    /// [`RelayError::Upstream`].
    pub async fn forward(&self, query: Option<&str>) -> Result<Forwarded, RelayError> {
        let url = self.config.upstream_url(query);
        info!(target_url = %url, "relaying announcement request");

        let result = self.fetch(&url).await;
        match &result {
            Ok(forwarded) => {
                self.counters.requests.with_label_values(&["success"]).inc();
                self.counters
                    .upstream_seconds
                    .observe(forwarded.duration.as_secs_f64());
                info!(
                    status = forwarded.status,
                    duration_ms = forwarded.duration.as_millis() as u64,
                    notices = ?forwarded.notice_count(),
                    "relay succeeded"
                );
            }
            Err(err) => {
                self.counters
                    .requests
                    .with_label_values(&[err.outcome()])
                    .inc();
                warn!(error = %err, status = err.status_code(), "relay failed");
            }
        }
        result
    }

    async fn fetch(&self, url: &str) -> Result<Forwarded, RelayError> {
        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| RelayError::from_reqwest(err, &self.config, self.config.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Upstream {
                label: self.config.upstream_label.clone(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|err| RelayError::from_reqwest(err, &self.config, self.config.timeout))?;

        Ok(Forwarded {
            status: status.as_u16(),
            content_type,
            body: body.to_vec(),
            duration: start.elapsed(),
        })
    }

    /// Connectivity check against the configured probe URL.
    pub async fn probe(&self) -> Result<Probe, RelayError> {
        let timeout = self.config.probe_timeout;
        let start = Instant::now();
        let response = self
            .client
            .get(&self.config.probe_url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|err| RelayError::from_reqwest(err, &self.config, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Upstream {
                label: self.config.upstream_label.clone(),
                status: status.as_u16(),
            });
        }
        let data = response
            .json::<Value>()
            .await
            .map_err(|err| RelayError::Internal(err.to_string()))?;
        Ok(Probe {
            duration: start.elapsed(),
            data,
        })
    }
}
