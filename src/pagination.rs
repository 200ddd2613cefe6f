//! Page query planning: request normalisation, list filters and the
//! page-window arithmetic behind the pagination controls.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::TodoSummary;

/// Number of page links shown per pagination block.
pub const WINDOW_BLOCK: u64 = 10;

/// Allowed page sizes. Requested sizes are clamped into `min_size..=max_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub min_size: u32,
    pub max_size: u32,
    pub default_size: u32,
}

impl PageLimits {
    pub const DEFAULT: PageLimits = PageLimits {
        min_size: 10,
        max_size: 100,
        default_size: 10,
    };

    /// Returns `None` unless `0 < min_size <= default_size <= max_size`.
    pub fn new(min_size: u32, max_size: u32, default_size: u32) -> Option<Self> {
        if min_size == 0 || min_size > max_size || !(min_size..=max_size).contains(&default_size)
        {
            return None;
        }
        Some(Self {
            min_size,
            max_size,
            default_size,
        })
    }

    pub fn clamp(&self, size: Option<i64>) -> u32 {
        match size {
            Some(size) => size.clamp(i64::from(self.min_size), i64::from(self.max_size)) as u32,
            None => self.default_size,
        }
    }
}

impl Default for PageLimits {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Which column a free-text `query` is matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Title,
    Author,
    #[default]
    All,
}

impl SearchType {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchType::Title => "title",
            SearchType::Author => "author",
            SearchType::All => "all",
        }
    }
}

/// Raw list parameters as they arrive in the query string or a form.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number; values below 1 are treated as 1.
    pub page: Option<i64>,
    /// Rows per page; clamped to the configured range.
    pub size: Option<i64>,
    /// Substring of the author's name.
    pub author_name: Option<String>,
    #[serde(default)]
    #[param(inline)]
    pub search_type: SearchType,
    /// Free text matched according to `searchType`.
    pub query: Option<String>,
}

/// Substring filter applied to both the page query and the count query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoFilter {
    pub author_name: Option<String>,
    pub text: Option<(SearchType, String)>,
}

impl TodoFilter {
    pub fn is_empty(&self) -> bool {
        self.author_name.is_none() && self.text.is_none()
    }
}

/// A `PageQuery` after defaults and clamping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub filter: TodoFilter,
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.size)
    }
}

impl PageQuery {
    pub fn normalize(&self, limits: &PageLimits) -> PageRequest {
        let page = self.page.unwrap_or(1).clamp(1, i64::from(u32::MAX)) as u32;
        let size = limits.clamp(self.size);

        let filter = TodoFilter {
            author_name: non_blank(self.author_name.as_deref()),
            text: non_blank(self.query.as_deref()).map(|text| (self.search_type, text)),
        };

        PageRequest { page, size, filter }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Range of page links to render, plus whether the previous/next block exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageWindow {
    pub start: u64,
    pub end: u64,
    pub prev: bool,
    pub next: bool,
}

/// Pagination controls are grouped in blocks of [`WINDOW_BLOCK`] pages.
/// `start` is the first page of the block holding `page`; `end` is the last
/// page of that block, cut down to the last page that has rows. A page past
/// the end is placed in the last block.
pub fn compute_window(page: u32, size: u32, total: u64) -> PageWindow {
    let size = u64::from(size.max(1));
    let last = total.div_ceil(size);
    let page = u64::from(page.max(1)).min(last.max(1));

    let block_end = page.div_ceil(WINDOW_BLOCK) * WINDOW_BLOCK;
    let start = block_end - (WINDOW_BLOCK - 1);
    let end = block_end.min(last);

    PageWindow {
        start,
        end,
        prev: start > 1,
        next: total > end * size,
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[aliases(TodoPage = PageResult<TodoSummary>)]
pub struct PageResult<T> {
    pub dto_list: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub start: u64,
    pub end: u64,
    pub prev: bool,
    pub next: bool,
    pub author_name: Option<String>,
    pub search_type: SearchType,
    pub query: Option<String>,
}

impl<T> PageResult<T> {
    pub fn new(request: &PageRequest, search_type: SearchType, dto_list: Vec<T>, total: u64) -> Self {
        let window = compute_window(request.page, request.size, total);
        Self {
            dto_list,
            total,
            page: request.page,
            size: request.size,
            start: window.start,
            end: window.end,
            prev: window.prev,
            next: window.next,
            author_name: request.filter.author_name.clone(),
            search_type,
            query: request.filter.text.as_ref().map(|(_, text)| text.clone()),
        }
    }

    pub fn window(&self) -> PageWindow {
        PageWindow {
            start: self.start,
            end: self.end,
            prev: self.prev,
            next: self.next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn window(start: u64, end: u64, prev: bool, next: bool) -> PageWindow {
        PageWindow {
            start,
            end,
            prev,
            next,
        }
    }

    #[rstest]
    #[case::first_page_partial_block(1, 10, 25, window(1, 3, false, false))]
    #[case::empty(1, 10, 0, window(1, 0, false, false))]
    #[case::exact_fit(1, 10, 100, window(1, 10, false, false))]
    #[case::more_blocks_follow(3, 10, 101, window(1, 10, false, true))]
    #[case::second_block(11, 10, 250, window(11, 20, true, true))]
    #[case::last_block_cut_short(12, 10, 115, window(11, 12, true, false))]
    #[case::first_page_of_short_block(11, 10, 120, window(11, 12, true, false))]
    #[case::past_last_in_later_block(40, 10, 115, window(11, 12, true, false))]
    #[case::page_past_last(50, 10, 25, window(1, 3, false, false))]
    #[case::larger_size(2, 20, 45, window(1, 3, false, false))]
    fn computes_window(
        #[case] page: u32,
        #[case] size: u32,
        #[case] total: u64,
        #[case] expected: PageWindow,
    ) {
        assert_eq!(compute_window(page, size, total), expected);
    }

    #[rstest]
    #[case(None, None, 1, 10)]
    #[case(Some(0), Some(5), 1, 10)]
    #[case(Some(-3), Some(500), 1, 100)]
    #[case(Some(4), Some(25), 4, 25)]
    fn normalizes_page_and_size(
        #[case] page: Option<i64>,
        #[case] size: Option<i64>,
        #[case] expected_page: u32,
        #[case] expected_size: u32,
    ) {
        let query = PageQuery {
            page,
            size,
            ..PageQuery::default()
        };
        let request = query.normalize(&PageLimits::DEFAULT);
        assert_eq!(request.page, expected_page);
        assert_eq!(request.size, expected_size);
    }

    #[test]
    fn blank_filters_are_dropped() {
        let query = PageQuery {
            author_name: Some("   ".to_string()),
            query: Some(String::new()),
            search_type: SearchType::Title,
            ..PageQuery::default()
        };
        assert!(query.normalize(&PageLimits::DEFAULT).filter.is_empty());
    }

    #[test]
    fn query_keeps_search_type() {
        let query = PageQuery {
            author_name: Some(" kim ".to_string()),
            query: Some("milk".to_string()),
            search_type: SearchType::Title,
            ..PageQuery::default()
        };
        let filter = query.normalize(&PageLimits::DEFAULT).filter;
        assert_eq!(filter.author_name.as_deref(), Some("kim"));
        assert_eq!(filter.text, Some((SearchType::Title, "milk".to_string())));
    }

    #[test]
    fn page_limits_reject_inconsistent_ranges() {
        assert!(PageLimits::new(0, 10, 5).is_none());
        assert!(PageLimits::new(20, 10, 15).is_none());
        assert!(PageLimits::new(10, 100, 5).is_none());
        assert_eq!(PageLimits::new(10, 100, 10), Some(PageLimits::DEFAULT));
    }

    #[test]
    fn result_echoes_request() {
        let request = PageQuery {
            page: Some(2),
            author_name: Some("lee".to_string()),
            ..PageQuery::default()
        }
        .normalize(&PageLimits::DEFAULT);
        let result = PageResult::new(&request, SearchType::All, vec![1, 2, 3], 13);
        assert_eq!(result.page, 2);
        assert_eq!(result.size, 10);
        assert_eq!(result.author_name.as_deref(), Some("lee"));
        assert_eq!(result.window(), window(1, 2, false, false));
    }

    proptest! {
        #[test]
        fn empty_total_yields_empty_window(page in 1u32..100_000, size in 1u32..1_000) {
            prop_assert_eq!(compute_window(page, size, 0), window(1, 0, false, false));
        }

        #[test]
        fn offset_follows_page_and_size(page in 1i64..1_000_000, size in 10i64..=100) {
            let request = PageQuery { page: Some(page), size: Some(size), ..PageQuery::default() }
                .normalize(&PageLimits::DEFAULT);
            prop_assert_eq!(request.offset(), ((page - 1) * size) as u64);
        }

        #[test]
        fn end_never_exceeds_last_page(page in 1u32..10_000, size in 1u32..200, total in 0u64..1_000_000) {
            let w = compute_window(page, size, total);
            prop_assert!(w.end <= total.div_ceil(u64::from(size)));
            prop_assert!(w.start >= 1);
            prop_assert_eq!(w.start % WINDOW_BLOCK, 1);
            prop_assert!(total == 0 || w.start <= w.end);
            prop_assert!(w.end - w.start.min(w.end) < WINDOW_BLOCK);
            prop_assert_eq!(w.prev, w.start > 1);
            prop_assert_eq!(w.next, total > w.end * u64::from(size));
        }
    }
}
