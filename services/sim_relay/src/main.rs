use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use metrics::MetricsHandle;
use relay::{routes, Relay, RelayConfig, DEFAULT_SIMULATOR_URL};
use tracing::{info, Level};
use uuid::Uuid;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, env = "PORT", default_value_t = 9000)]
    port: u16,

    #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Base URL of the simulated Korean announcement server.
    #[arg(long, env = "KOREAN_SERVER_URL", default_value = DEFAULT_SIMULATOR_URL)]
    korean_server: String,

    #[arg(long, env = "RELAY_TIMEOUT_MS", default_value_t = 5000)]
    timeout_ms: u64,
}

impl Args {
    fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    fn relay_config(&self) -> RelayConfig {
        let mut config = RelayConfig::for_simulator(&self.korean_server);
        config.timeout = Duration::from_millis(self.timeout_ms);
        config.public_base_url = format!("http://localhost:{}", self.port);
        config
    }
}

fn log_startup(args: &Args, config: &RelayConfig, run_id: &str) {
    info!(addr = %args.bind_addr(), "relay bind planned");
    info!(
        target_url = %config.target_url,
        timeout_ms = args.timeout_ms,
        "korean server configured"
    );
    info!(
        endpoint = %config.example_endpoint(),
        "relay endpoint"
    );
    info!("relay path: detector (KST) -> korean relay (UTC) -> korean server (KST)");
    info!(%run_id, "run initialized");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let run_id = Uuid::new_v4().to_string();
    let config = args.relay_config();
    log_startup(&args, &config, &run_id);

    let relay = Arc::new(Relay::new(config, MetricsHandle::new())?);
    let listener = web::bind(args.bind_addr())?;
    info!(run_id = %run_id, "ready");

    web::serve(
        listener,
        move |req| routes::handle(relay.clone(), req),
        web::shutdown_signal(),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_build_simulator_relay_config() {
        let args = Args::parse_from([
            "sim_relay",
            "--korean-server",
            "http://10.0.0.5:8000",
            "--timeout-ms",
            "750",
        ]);
        let config = args.relay_config();
        assert_eq!(args.port, 9000);
        assert_eq!(config.target_url, "http://10.0.0.5:8000/api/v1/announcements");
        assert_eq!(config.timeout, Duration::from_millis(750));
        assert_eq!(config.timeout_status, 504);
    }

    #[test]
    fn advertised_endpoint_follows_port() {
        let args = Args::parse_from(["sim_relay", "--port", "19000"]);
        let config = args.relay_config();
        assert_eq!(args.bind_addr().to_string(), "0.0.0.0:19000");
        assert_eq!(config.target_url, "http://localhost:8000/api/v1/announcements");
        assert_eq!(
            config.example_endpoint(),
            "http://localhost:19000/api/v1/announcements?os=web&page=1&per_page=1&category=trade"
        );
    }
}
