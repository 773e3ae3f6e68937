use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

use crate::clock::{kst_timestamp, Clock, SystemClock};
use crate::generator::ListingGenerator;
use crate::model::{Announcement, ListingKind};
use crate::query::{self, ListQuery, NoticePage};
use crate::store::AnnouncementStore;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Auto,
    Manual,
}

impl Trigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Trigger::Auto => "auto",
            Trigger::Manual => "manual",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedStatus {
    pub current_time: String,
    pub total_announcements: usize,
    pub next_phase: &'static str,
    pub current_listing_id: u64,
}

/// Store, generator, phase flag and tick clock owned together.
///
/// Only [`ListingFeed::tick`] flips the phase. Manual triggers insert their
/// named kind and leave both the phase and the tick clock untouched.
pub struct ListingFeed<R = StdRng, C = SystemClock> {
    store: AnnouncementStore,
    generator: ListingGenerator<R>,
    clock: C,
    next_phase: ListingKind,
    last_tick: DateTime<Utc>,
    tick_interval: Duration,
}

impl ListingFeed<StdRng, SystemClock> {
    pub fn with_entropy(tick_interval: Duration) -> Self {
        Self::new(StdRng::from_entropy(), SystemClock, tick_interval)
    }
}

impl<R: Rng, C: Clock> ListingFeed<R, C> {
    pub fn new(rng: R, clock: C, tick_interval: Duration) -> Self {
        let last_tick = clock.now();
        Self {
            store: AnnouncementStore::seeded(),
            generator: ListingGenerator::new(rng),
            clock,
            next_phase: ListingKind::New,
            last_tick,
            tick_interval,
        }
    }

    /// Emits one listing if a full interval has elapsed since the last
    /// emitting tick; otherwise does nothing.
    pub fn tick(&mut self) -> Option<Announcement> {
        let now = self.clock.now();
        let due = (now - self.last_tick)
            .to_std()
            .map(|elapsed| elapsed >= self.tick_interval)
            .unwrap_or(false);
        if !due {
            return None;
        }
        self.last_tick = now;

        let kind = self.next_phase;
        let listing = self.apply(kind, now, Trigger::Auto);
        self.next_phase = kind.toggled();
        Some(listing)
    }

    pub fn force(&mut self, kind: ListingKind) -> Announcement {
        let now = self.clock.now();
        self.apply(kind, now, Trigger::Manual)
    }

    pub fn force_new(&mut self) -> Announcement {
        self.force(ListingKind::New)
    }

    pub fn force_old(&mut self) -> Announcement {
        self.force(ListingKind::Old)
    }

    pub fn list(&self, query: &ListQuery) -> NoticePage {
        query::list(self.store.as_slice(), query)
    }

    pub fn snapshot(&self) -> Vec<Announcement> {
        self.store.snapshot()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn next_phase(&self) -> ListingKind {
        self.next_phase
    }

    pub fn current_listing_id(&self) -> u64 {
        self.generator.last_id()
    }

    pub fn kst_now(&self) -> String {
        kst_timestamp(self.clock.now(), 0)
    }

    pub fn status(&self) -> FeedStatus {
        FeedStatus {
            current_time: self.kst_now(),
            total_announcements: self.store.len(),
            next_phase: self.next_phase.phase_label(),
            current_listing_id: self.generator.last_id(),
        }
    }

    fn apply(&mut self, kind: ListingKind, now: DateTime<Utc>, trigger: Trigger) -> Announcement {
        let listing = self.generator.generate(kind, now);
        match kind {
            ListingKind::New => self.store.prepend(listing.clone()),
            ListingKind::Old => self.store.append(listing.clone()),
        }

        let kst_time = kst_timestamp(now, 0);
        info!(
            kind = kind.as_str(),
            id = listing.id,
            title = %listing.title,
            trigger = trigger.as_str(),
            %kst_time,
            "{} listing posted",
            kind.as_str()
        );
        listing
    }
}

/// Cloneable handle to a feed shared between the tick loop and request
/// handlers.
pub struct SharedFeed<R = StdRng, C = SystemClock> {
    inner: Arc<Mutex<ListingFeed<R, C>>>,
}

impl<R, C> Clone for SharedFeed<R, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, C> SharedFeed<R, C> {
    pub fn new(feed: ListingFeed<R, C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(feed)),
        }
    }

    /// Every mutation completes under the lock, so a poisoned guard still
    /// holds a consistent feed.
    pub fn lock(&self) -> MutexGuard<'_, ListingFeed<R, C>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
