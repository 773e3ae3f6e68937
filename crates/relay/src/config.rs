use std::time::Duration;

pub const ANNOUNCEMENTS_PATH: &str = "/api/v1/announcements";
pub const DEFAULT_SIMULATOR_URL: &str = "http://localhost:8000";
pub const DEFAULT_UPSTREAM_URL: &str = "https://api-manager.upbit.com/api/v1/announcements";

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

const SIMULATOR_HEADERS: &[(&str, &str)] = &[
    ("User-Agent", "Korean-Relay-Server/1.0.0"),
    ("Accept", "application/json"),
];

/// Headers a desktop Chrome sends when loading the notice board.
const BROWSER_HEADERS: &[(&str, &str)] = &[
    (
        "User-Agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/128.0.0.0 Safari/537.36",
    ),
    ("Accept", "application/json, text/plain, */*"),
    ("Accept-Language", "en-US,en;q=0.9,ko;q=0.8"),
    ("Referer", "https://upbit.com/"),
    ("Origin", "https://upbit.com"),
    ("Cache-Control", "no-cache"),
    ("Pragma", "no-cache"),
];

#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Human readable service name reported on `/health` and `/`.
    pub service: String,
    pub version: String,
    /// Value of the `X-Relay-Server` header.
    pub relay_id: String,
    /// Name used for the upstream in error bodies, e.g. "Korean server".
    pub upstream_label: String,
    /// Full URL of the upstream announcements endpoint.
    pub target_url: String,
    /// URL hit by `/relay/test`.
    pub probe_url: String,
    pub timeout: Duration,
    /// Timeout of the `/relay/test` probe, independent of `timeout`.
    pub probe_timeout: Duration,
    /// Status returned when the upstream times out.
    pub timeout_status: u16,
    pub upstream_headers: Vec<(String, String)>,
    /// Adds the `X-Relay-*` timing headers to relayed responses.
    pub debug_headers: bool,
    pub environment: String,
    /// Externally visible base URL, only used in informational output.
    pub public_base_url: String,
}

impl RelayConfig {
    /// Relay in front of the local simulator: short timeout, debug headers.
    pub fn for_simulator(server_url: &str) -> Self {
        let base = server_url.trim_end_matches('/');
        Self {
            service: "Korean Relay Server".into(),
            version: "1.0.0".into(),
            relay_id: "Korean-Relay-UTC".into(),
            upstream_label: "Korean server".into(),
            target_url: format!("{base}{ANNOUNCEMENTS_PATH}"),
            probe_url: format!("{base}/health"),
            timeout: Duration::from_secs(5),
            probe_timeout: PROBE_TIMEOUT,
            timeout_status: 504,
            upstream_headers: owned(SIMULATOR_HEADERS),
            debug_headers: true,
            environment: "development".into(),
            public_base_url: "http://localhost:9000".into(),
        }
    }

    /// Relay in front of the real exchange endpoint with browser headers.
    pub fn for_upstream(target_url: &str) -> Self {
        Self {
            service: "Upbit Announcement Relay Server".into(),
            version: "1.1.0".into(),
            relay_id: "Upbit-Relay".into(),
            upstream_label: "Upbit API".into(),
            target_url: target_url.to_string(),
            probe_url: target_url.to_string(),
            timeout: Duration::from_secs(10),
            probe_timeout: PROBE_TIMEOUT,
            timeout_status: 408,
            upstream_headers: owned(BROWSER_HEADERS),
            debug_headers: false,
            environment: "development".into(),
            public_base_url: "http://localhost:3000".into(),
        }
    }

    /// Upstream URL with the inbound query string appended verbatim.
    pub fn upstream_url(&self, query: Option<&str>) -> String {
        match query.filter(|q| !q.is_empty()) {
            Some(query) if self.target_url.contains('?') => {
                format!("{}&{}", self.target_url, query)
            }
            Some(query) => format!("{}?{}", self.target_url, query),
            None => self.target_url.clone(),
        }
    }

    pub fn example_endpoint(&self) -> String {
        format!(
            "{}{}?os=web&page=1&per_page=1&category=trade",
            self.public_base_url.trim_end_matches('/'),
            ANNOUNCEMENTS_PATH
        )
    }
}

fn owned(headers: &[(&str, &str)]) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}
