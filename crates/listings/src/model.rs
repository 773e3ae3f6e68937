use serde::{Deserialize, Serialize};

/// A single exchange notice, shaped like the upstream listing API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub listed_at: String,
    pub first_listed_at: String,
    pub id: u64,
    pub title: String,
    pub category: String,
    pub need_new_badge: bool,
    pub need_update_badge: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListingKind {
    /// Forward-dated listing a detector is expected to catch.
    New,
    /// Backdated listing that should be ignored as stale.
    Old,
}

impl ListingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ListingKind::New => "new",
            ListingKind::Old => "old",
        }
    }

    pub fn phase_label(self) -> &'static str {
        match self {
            ListingKind::New => "new-listing",
            ListingKind::Old => "old-listing",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ListingKind::New => ListingKind::Old,
            ListingKind::Old => ListingKind::New,
        }
    }
}

pub const TRADE_CATEGORY: &str = "Trade";

fn seed(listed_at: &str, id: u64, title: &str) -> Announcement {
    Announcement {
        listed_at: listed_at.to_string(),
        first_listed_at: listed_at.to_string(),
        id,
        title: title.to_string(),
        category: TRADE_CATEGORY.to_string(),
        need_new_badge: false,
        need_update_badge: false,
    }
}

/// The three historical notices every fresh feed starts with.
pub fn seed_announcements() -> Vec<Announcement> {
    vec![
        seed(
            "2025-11-18T15:20:00+09:00",
            5769,
            "Market Support for Meteora(MET2) (KRW, BTC, USDT Market)",
        ),
        seed("2025-11-07T17:00:02+09:00", 5740, "랠리(RLY) 원화 마켓 거래 지원"),
        seed(
            "2025-10-25T11:30:00+09:00",
            5701,
            "비트코인(BTC) 원화 마켓 거래 지원 종료 예정",
        ),
    ]
}
