use serde::{Deserialize, Serialize};

use crate::model::Announcement;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PER_PAGE: usize = 20;

/// The only category value that turns filtering on.
const TRADE_FILTER: &str = "trade";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: usize,
    pub per_page: usize,
    pub category: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            category: None,
        }
    }
}

impl ListQuery {
    /// Builds a query from raw parameter values. Missing, non-numeric and
    /// zero values fall back to the defaults instead of being rejected.
    pub fn from_raw(page: Option<&str>, per_page: Option<&str>, category: Option<&str>) -> Self {
        Self {
            page: page.and_then(parse_leading_int).unwrap_or(DEFAULT_PAGE),
            per_page: per_page
                .and_then(parse_leading_int)
                .unwrap_or(DEFAULT_PER_PAGE),
            category: category.filter(|c| !c.is_empty()).map(str::to_string),
        }
    }

    /// Reads `page`, `per_page` and `category` out of decoded key/value
    /// pairs. The first occurrence of a key wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut page = None;
        let mut per_page = None;
        let mut category = None;
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "page" => &mut page,
                "per_page" => &mut per_page,
                "category" => &mut category,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        Self::from_raw(
            page.as_ref().map(|v| v.as_ref()),
            per_page.as_ref().map(|v| v.as_ref()),
            category.as_ref().map(|v| v.as_ref()),
        )
    }

    fn filters_trade(&self) -> bool {
        self.category.as_deref() == Some(TRADE_FILTER)
    }
}

/// Leading-digit integer parse: `"3"` and `"3abc"` give 3; empty,
/// signed-negative, non-numeric and zero give `None`.
fn parse_leading_int(raw: &str) -> Option<usize> {
    let trimmed = raw.trim_start();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..digits_end]
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticePage {
    pub success: bool,
    pub data: NoticePageData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticePageData {
    pub total_pages: usize,
    pub total_count: usize,
    pub notices: Vec<Announcement>,
    pub fixed_notices: Vec<Announcement>,
}

/// Filters and paginates `records` in their stored order. A zero `page` or
/// `per_page` is read as 1.
pub fn list(records: &[Announcement], query: &ListQuery) -> NoticePage {
    let page = query.page.max(1);
    let per_page = query.per_page.max(1);
    let filtered: Vec<&Announcement> = records
        .iter()
        .filter(|a| !query.filters_trade() || a.category.to_lowercase() == TRADE_FILTER)
        .collect();

    let total_count = filtered.len();
    let start = (page - 1).saturating_mul(per_page);
    let notices = filtered
        .into_iter()
        .skip(start)
        .take(per_page)
        .cloned()
        .collect();

    NoticePage {
        success: true,
        data: NoticePageData {
            total_pages: total_count.div_ceil(per_page),
            total_count,
            notices,
            fixed_notices: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, category: &str) -> Announcement {
        Announcement {
            listed_at: "2025-01-01T00:00:00+09:00".into(),
            first_listed_at: "2025-01-01T00:00:00+09:00".into(),
            id,
            title: format!("notice {id}"),
            category: category.into(),
            need_new_badge: false,
            need_update_badge: false,
        }
    }

    fn query(page: usize, per_page: usize, category: Option<&str>) -> ListQuery {
        ListQuery {
            page,
            per_page,
            category: category.map(str::to_string),
        }
    }

    fn ids(page: &NoticePage) -> Vec<u64> {
        page.data.notices.iter().map(|a| a.id).collect()
    }

    #[test]
    fn second_page_of_two_returns_tail_pair() {
        let records: Vec<_> = (0..4).map(|id| record(id, "Trade")).collect();
        let page = list(&records, &query(2, 2, Some("trade")));
        assert_eq!(ids(&page), vec![2, 3]);
        assert_eq!(page.data.total_count, 4);
        assert_eq!(page.data.total_pages, 2);
        assert!(page.success);
        assert!(page.data.fixed_notices.is_empty());
    }

    #[test]
    fn out_of_range_page_is_empty_not_error() {
        let records: Vec<_> = (0..3).map(|id| record(id, "Trade")).collect();
        let page = list(&records, &query(5, 20, None));
        assert!(page.data.notices.is_empty());
        assert_eq!(page.data.total_count, 3);
        assert_eq!(page.data.total_pages, 1);
    }

    #[test]
    fn trade_filter_is_case_insensitive_on_stored_category() {
        let records = vec![
            record(1, "Trade"),
            record(2, "General"),
            record(3, "TRADE"),
            record(4, "trade"),
        ];
        let filtered = list(&records, &query(1, 20, Some("trade")));
        let unfiltered = list(&records, &query(1, 20, None));
        assert_eq!(ids(&filtered), vec![1, 3, 4]);
        assert_eq!(ids(&unfiltered), vec![1, 2, 3, 4]);
        for notice in &filtered.data.notices {
            assert_eq!(notice.category.to_lowercase(), "trade");
            assert!(unfiltered.data.notices.contains(notice));
        }
    }

    #[test]
    fn other_category_values_do_not_filter() {
        let records = vec![record(1, "Trade"), record(2, "General")];
        for category in ["Trade", "TRADE", "general", "all"] {
            let page = list(&records, &query(1, 20, Some(category)));
            assert_eq!(page.data.total_count, 2, "category `{category}`");
        }
    }

    #[test]
    fn pagination_bounds_hold_for_all_windows() {
        let records: Vec<_> = (0..10).map(|id| record(id, "Trade")).collect();
        for per_page in 1..=12 {
            for page in 1..=12 {
                let result = list(&records, &query(page, per_page, None));
                assert!(result.data.notices.len() <= per_page);
                assert_eq!(result.data.total_pages, 10usize.div_ceil(per_page));
            }
        }
    }

    #[test]
    fn zero_page_reads_as_first_page() {
        let records: Vec<_> = (0..3).map(|id| record(id, "Trade")).collect();
        let page = list(&records, &query(0, 2, None));
        assert_eq!(ids(&page), vec![0, 1]);
        assert_eq!(page.data.total_pages, 2);
    }

    #[test]
    fn zero_per_page_reads_as_one() {
        let records: Vec<_> = (0..3).map(|id| record(id, "Trade")).collect();
        let page = list(&records, &query(1, 0, None));
        assert_eq!(ids(&page), vec![0]);
        assert_eq!(page.data.total_pages, 3);
        assert_eq!(page.data.total_count, 3);
    }

    #[test]
    fn repeated_reads_are_identical() {
        let records: Vec<_> = (0..5).map(|id| record(id, "Trade")).collect();
        let q = query(1, 3, Some("trade"));
        assert_eq!(list(&records, &q), list(&records, &q));
    }

    #[test]
    fn raw_values_default_when_missing_or_invalid() {
        assert_eq!(ListQuery::from_raw(None, None, None), ListQuery::default());
        let q = ListQuery::from_raw(Some("abc"), Some("0"), Some(""));
        assert_eq!(q, ListQuery::default());
        let q = ListQuery::from_raw(Some("-2"), Some(""), None);
        assert_eq!(q.page, DEFAULT_PAGE);
        assert_eq!(q.per_page, DEFAULT_PER_PAGE);
    }

    #[test]
    fn raw_values_accept_leading_digits() {
        let q = ListQuery::from_raw(Some("3x"), Some(" 5"), Some("trade"));
        assert_eq!(q.page, 3);
        assert_eq!(q.per_page, 5);
        assert_eq!(q.category.as_deref(), Some("trade"));
    }

    #[test]
    fn pairs_use_first_occurrence() {
        let q = ListQuery::from_pairs([
            ("os", "web"),
            ("page", "2"),
            ("page", "9"),
            ("per_page", "1"),
            ("category", "trade"),
        ]);
        assert_eq!(q, query(2, 1, Some("trade")));

        let owned = vec![("page".to_string(), "4".to_string())];
        assert_eq!(ListQuery::from_pairs(owned).page, 4);
    }
}
