use crate::model::{seed_announcements, Announcement};

pub const STORE_CAPACITY: usize = 10;

/// Insertion-ordered working set of announcements.
///
/// Both insert paths truncate to the first [`STORE_CAPACITY`] records, so
/// once the cap is reached appended records are the first to be dropped.
#[derive(Debug, Clone)]
pub struct AnnouncementStore {
    items: Vec<Announcement>,
}

impl Default for AnnouncementStore {
    fn default() -> Self {
        Self::seeded()
    }
}

impl AnnouncementStore {
    pub fn seeded() -> Self {
        Self::from_records(seed_announcements())
    }

    pub fn from_records(records: Vec<Announcement>) -> Self {
        let mut store = Self { items: records };
        store.enforce_cap();
        store
    }

    pub fn prepend(&mut self, record: Announcement) {
        self.items.insert(0, record);
        self.enforce_cap();
    }

    pub fn append(&mut self, record: Announcement) {
        self.items.push(record);
        self.enforce_cap();
    }

    /// Owned copy so readers never alias the live list.
    pub fn snapshot(&self) -> Vec<Announcement> {
        self.items.clone()
    }

    pub fn as_slice(&self) -> &[Announcement] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn enforce_cap(&mut self) {
        self.items.truncate(STORE_CAPACITY);
    }
}
