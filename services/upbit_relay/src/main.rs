use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use metrics::MetricsHandle;
use relay::{routes, Relay, RelayConfig, DEFAULT_UPSTREAM_URL};
use tracing::{info, Level};
use uuid::Uuid;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Full URL of the upstream announcements endpoint.
    #[arg(long, env = "TARGET_URL", default_value = DEFAULT_UPSTREAM_URL)]
    target_url: String,

    /// Host name advertised in startup output.
    #[arg(long, env = "HOST", default_value = "localhost")]
    public_host: String,

    #[arg(long, env = "PROTOCOL", default_value = "http")]
    protocol: String,

    #[arg(long, env = "NODE_ENV", default_value = "development")]
    environment: String,

    #[arg(long, env = "RELAY_TIMEOUT_MS", default_value_t = 10_000)]
    timeout_ms: u64,
}

impl Args {
    fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    fn public_base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.public_host, self.port)
    }

    fn relay_config(&self) -> RelayConfig {
        let mut config = RelayConfig::for_upstream(&self.target_url);
        config.timeout = Duration::from_millis(self.timeout_ms);
        config.environment = self.environment.clone();
        config.public_base_url = self.public_base_url();
        config
    }
}

fn log_startup(args: &Args, config: &RelayConfig, run_id: &str) {
    info!(addr = %args.bind_addr(), environment = %config.environment, "relay bind planned");
    info!(target_url = %config.target_url, timeout_ms = args.timeout_ms, "proxying requests");
    info!(health = %format!("{}/health", args.public_base_url()), "health check");
    info!(endpoint = %config.example_endpoint(), "relay endpoint");
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
