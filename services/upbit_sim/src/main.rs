use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use clap::Parser;
use listings::{Clock, ListingFeed, SharedFeed};
use metrics::MetricsHandle;
use rand::Rng;
use tokio::task::{self, JoinHandle};
use tokio::time;
use tracing::{info, Level};
use uuid::Uuid;

mod app;
mod routes;

use app::{AppState, SimMetrics, SERVICE_NAME};

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, env = "PORT", default_value_t = 8000)]
    port: u16,

    #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// How often the generator checks whether a listing is due.
    #[arg(long, env = "POLL_SECS", default_value_t = 10)]
    poll_secs: u64,

    /// Minimum time between two automatic listings.
    #[arg(long, env = "TICK_SECS", default_value_t = 60)]
    tick_secs: u64,
}

impl Args {
    fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn log_startup(args: &Args, run_id: &str, kst_time: &str, seeded: usize) {
    info!(addr = %args.bind_addr(), "simulator bind planned");
    info!(
        poll_secs = args.poll_secs,
        tick_secs = args.tick_secs,
        "listing generator configured"
    );
    info!(%kst_time, announcements = seeded, "feed seeded");
    info!(
        endpoint = %format!("http://localhost:{}{}", args.port, routes::ANNOUNCEMENTS_PATH),
        "announcement endpoint"
    );
    info!(
        new_listing = %format!("curl -X POST http://localhost:{}/control/new-listing-now", args.port),
        old_listing = %format!("curl -X POST http://localhost:{}/control/old-listing-now", args.port),
        status = %format!("curl http://localhost:{}/control/status", args.port),
        "control commands"
    );
    info!(%run_id, "run initialized");
}

fn spawn_generator<R, C>(state: AppState<R, C>, poll: Duration) -> JoinHandle<()>
where
    R: Rng + Send + 'static,
    C: Clock + 'static,
{
    task::spawn(async move {
        let mut ticker = time::interval(poll);
        loop {
            ticker.tick().await;
            state.auto_tick();
        }
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let run_id = Uuid::new_v4().to_string();

    let feed = SharedFeed::new(ListingFeed::with_entropy(Duration::from_secs(
        args.tick_secs,
    )));
    let metrics = SimMetrics::register(MetricsHandle::new())?;
    let state = AppState::new(feed, metrics);

    let (kst_time, seeded) = {
        let feed = state.feed.lock();
        (feed.kst_now(), feed.len())
    };
    log_startup(&args, &run_id, &kst_time, seeded);

    let generator = spawn_generator(state.clone(), Duration::from_secs(args.poll_secs.max(1)));

    let listener = web::bind(args.bind_addr())?;
    info!(service = SERVICE_NAME, run_id = %run_id, "ready");
    let result = web::serve(
        listener,
        move |req| routes::handle(state.clone(), req),
        web::shutdown_signal(),
    )
    .await;

    generator.abort();
    info!(run_id = %run_id, "stopped");
    result
}
