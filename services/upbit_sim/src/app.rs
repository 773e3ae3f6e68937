use anyhow::Result;
use listings::{Announcement, Clock, ListingKind, SharedFeed, SystemClock, Trigger};
use metrics::{IntCounter, IntCounterVec, MetricsHandle};
use rand::rngs::StdRng;
use rand::Rng;

pub const SERVICE_NAME: &str = "Korean Upbit Simulator";
pub const VERSION: &str = "1.0.0";

/// Counters exported on `/metrics`.
#[derive(Clone)]
pub struct SimMetrics {
    handle: MetricsHandle,
    listings: IntCounterVec,
    queries: IntCounter,
}

impl SimMetrics {
    pub fn register(handle: MetricsHandle) -> Result<Self> {
        let listings = handle.counter_vec(
            "listings_generated_total",
            "Synthetic listings inserted into the feed",
            &["kind", "trigger"],
        )?;
        let queries = handle.counter(
            "announcement_queries_total",
            "Announcement list requests served",
        )?;
        Ok(Self {
            handle,
            listings,
            queries,
        })
    }

    pub fn handle(&self) -> &MetricsHandle {
        &self.handle
    }

    pub fn record_listing(&self, kind: ListingKind, trigger: Trigger) {
        self.listings
            .with_label_values(&[kind.as_str(), trigger.as_str()])
            .inc();
    }

    pub fn record_query(&self) {
        self.queries.inc();
    }
}

/// Everything a request handler or the tick loop needs.
pub struct AppState<R = StdRng, C = SystemClock> {
    pub feed: SharedFeed<R, C>,
    pub metrics: SimMetrics,
}

impl<R, C> Clone for AppState<R, C> {
    fn clone(&self) -> Self {
        Self {
            feed: self.feed.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

impl<R: Rng, C: Clock> AppState<R, C> {
    pub fn new(feed: SharedFeed<R, C>, metrics: SimMetrics) -> Self {
        Self { feed, metrics }
    }

    pub fn auto_tick(&self) -> Option<Announcement> {
        let mut feed = self.feed.lock();
        let kind = feed.next_phase();
        let listing = feed.tick()?;
        self.metrics.record_listing(kind, Trigger::Auto);
        Some(listing)
    }

    pub fn force(&self, kind: ListingKind) -> Announcement {
        let listing = self.feed.lock().force(kind);
        self.metrics.record_listing(kind, Trigger::Manual);
        listing
    }
}
