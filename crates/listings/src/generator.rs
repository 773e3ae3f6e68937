use chrono::{DateTime, Utc};
use rand::Rng;

use crate::clock::kst_timestamp;
use crate::model::{Announcement, ListingKind, TRADE_CATEGORY};

pub const NEW_LISTING_SYMBOLS: [&str; 10] = [
    "DOGE", "SHIB", "PEPE", "FLOKI", "BONK", "WIF", "POPCAT", "MEW", "BRETT", "MOODENG",
];
pub const OLD_LISTING_SYMBOLS: [&str; 5] = ["OLD1", "OLD2", "OLD3", "PAST", "HIST"];

/// Ids handed out by the generator start right after this value.
pub const LISTING_ID_SEED: u64 = 10_000;

const NEW_LISTING_LEAD_MINUTES: i64 = 1;
const OLD_LISTING_LAG_MINUTES: i64 = 60;

/// Builds synthetic listings. The id counter only ever moves forward.
#[derive(Debug)]
pub struct ListingGenerator<R> {
    rng: R,
    last_id: u64,
}

impl<R: Rng> ListingGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            last_id: LISTING_ID_SEED,
        }
    }

    pub fn last_id(&self) -> u64 {
        self.last_id
    }

    pub fn generate(&mut self, kind: ListingKind, now: DateTime<Utc>) -> Announcement {
        match kind {
            ListingKind::New => self.generate_new(now),
            ListingKind::Old => self.generate_old(now),
        }
    }

    pub fn generate_new(&mut self, now: DateTime<Utc>) -> Announcement {
        let symbol = self.pick(&NEW_LISTING_SYMBOLS);
        let listed_at = kst_timestamp(now, NEW_LISTING_LEAD_MINUTES);
        Announcement {
            first_listed_at: listed_at.clone(),
            listed_at,
            id: self.next_id(),
            title: format!("🚀 {symbol}({symbol}) 신규 상장 (KRW Market)"),
            category: TRADE_CATEGORY.to_string(),
            need_new_badge: true,
            need_update_badge: false,
        }
    }

    pub fn generate_old(&mut self, now: DateTime<Utc>) -> Announcement {
        let symbol = self.pick(&OLD_LISTING_SYMBOLS);
        let listed_at = kst_timestamp(now, -OLD_LISTING_LAG_MINUTES);
        Announcement {
            first_listed_at: listed_at.clone(),
            listed_at,
            id: self.next_id(),
            title: format!("📜 {symbol}({symbol}) 과거 공지사항 (Old Announcement)"),
            category: TRADE_CATEGORY.to_string(),
            need_new_badge: false,
            need_update_badge: false,
        }
    }

    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    fn pick(&mut self, candidates: &[&'static str]) -> &'static str {
        candidates[self.rng.gen_range(0..candidates.len())]
    }
}
