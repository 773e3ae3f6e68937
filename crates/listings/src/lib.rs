pub mod clock;
pub mod feed;
pub mod generator;
pub mod model;
pub mod query;
pub mod store;

pub use clock::{kst_timestamp, Clock, SystemClock, KST_LABEL};
pub use feed::{FeedStatus, ListingFeed, SharedFeed, Trigger};
pub use generator::ListingGenerator;
pub use model::{seed_announcements, Announcement, ListingKind};
pub use query::{ListQuery, NoticePage, NoticePageData};
pub use store::{AnnouncementStore, STORE_CAPACITY};
