pub mod config;
pub mod error;
pub mod routes;
pub mod upstream;

pub use config::{RelayConfig, ANNOUNCEMENTS_PATH, DEFAULT_SIMULATOR_URL, DEFAULT_UPSTREAM_URL};
pub use error::RelayError;
pub use upstream::{Forwarded, Probe, Relay};
