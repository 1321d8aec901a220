//! Page-number pagination primitives shared by the user admin client.
//!
//! Remote list endpoints address a slice of a collection with `limit` and
//! `skip` query parameters. [`PageRequest`] holds a validated one-based page
//! number together with a positive limit and derives the `skip` offset from
//! them. [`Paginated`] carries one page of items alongside the total count
//! reported by the server.
//!
//! # Example
//!
//! ```
//! use pagination::{PageRequest, page_count};
//!
//! let request = PageRequest::new(3, 10).expect("valid page request");
//! assert_eq!(request.skip(), 20);
//! assert_eq!(request.expected_len(25), 5);
//! assert_eq!(page_count(25, request.limit()), 3);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Query parameter carrying the page size.
pub const LIMIT_PARAM: &str = "limit";

/// Query parameter carrying the number of leading items to skip.
pub const SKIP_PARAM: &str = "skip";

/// Reasons a `(page, limit)` pair is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// Pages are numbered from one.
    #[error("page must be at least 1")]
    ZeroPage,
    /// A page must be able to hold at least one item.
    #[error("limit must be greater than zero")]
    ZeroLimit,
}

/// A validated request for one page of a remote collection.
///
/// ## Invariants
/// - `page >= 1`
/// - `limit > 0`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PageRequestDto", into = "PageRequestDto")]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Validate and construct a page request.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError::ZeroPage`] when `page` is zero and
    /// [`PageRequestError::ZeroLimit`] when `limit` is zero.
    pub const fn new(page: u32, limit: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::ZeroPage);
        }
        if limit == 0 {
            return Err(PageRequestError::ZeroLimit);
        }
        Ok(Self { page, limit })
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of items preceding this page, `(page - 1) * limit`.
    #[must_use]
    pub const fn skip(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    /// Return the same limit pointed at another page.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError::ZeroPage`] when `page` is zero.
    pub const fn with_page(self, page: u32) -> Result<Self, PageRequestError> {
        Self::new(page, self.limit)
    }

    /// Number of items a server holding `total` items returns for this page.
    ///
    /// This is `min(limit, total - skip)`, or zero once the page lies past
    /// the end of the collection.
    #[must_use]
    pub fn expected_len(&self, total: u64) -> usize {
        let remaining = total.saturating_sub(self.skip());
        let len = remaining.min(u64::from(self.limit));
        usize::try_from(len).unwrap_or(usize::MAX)
    }

    /// `limit` and `skip` query pairs, in that order.
    #[must_use]
    pub fn query_pairs(&self) -> [(&'static str, String); 2] {
        [
            (LIMIT_PARAM, self.limit.to_string()),
            (SKIP_PARAM, self.skip().to_string()),
        ]
    }

    /// Append the `limit` and `skip` query pairs to `url`.
    pub fn apply_to(&self, url: &mut Url) {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in self.query_pairs() {
            pairs.append_pair(key, value.as_str());
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PageRequestDto {
    page: u32,
    limit: u32,
}

impl From<PageRequest> for PageRequestDto {
    fn from(value: PageRequest) -> Self {
        Self {
            page: value.page,
            limit: value.limit,
        }
    }
}

impl TryFrom<PageRequestDto> for PageRequest {
    type Error = PageRequestError;

    fn try_from(value: PageRequestDto) -> Result<Self, Self::Error> {
        Self::new(value.page, value.limit)
    }
}

/// Number of pages needed to show `total` items, `limit` at a time.
///
/// A zero limit yields zero pages.
#[must_use]
pub const fn page_count(total: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(limit as u64)
}

/// One page of items as answered by the server for a [`PageRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginated<T> {
    items: Vec<T>,
    total: u64,
    request: PageRequest,
}

impl<T> Paginated<T> {
    /// Wrap one page of items with the collection total.
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            request,
        }
    }

    /// Items on this page, in server order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        self.items.as_slice()
    }

    /// Total number of items in the collection.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// The request this page answers.
    #[must_use]
    pub const fn request(&self) -> PageRequest {
        self.request
    }

    /// Split into the items and the collection total.
    #[must_use]
    pub fn into_parts(self) -> (Vec<T>, u64) {
        (self.items, self.total)
    }
}

#[cfg(test)]
mod tests {
    //! Unit coverage for page arithmetic and query encoding.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, 10, PageRequestError::ZeroPage)]
    #[case(1, 0, PageRequestError::ZeroLimit)]
    #[case(0, 0, PageRequestError::ZeroPage)]
    fn rejects_invalid_pairs(
        #[case] page: u32,
        #[case] limit: u32,
        #[case] expected: PageRequestError,
    ) {
        assert_eq!(PageRequest::new(page, limit), Err(expected));
    }

    #[rstest]
    #[case(1, 10, 0)]
    #[case(2, 10, 10)]
    #[case(5, 30, 120)]
    #[case(u32::MAX, u32::MAX, (u64::from(u32::MAX) - 1) * u64::from(u32::MAX))]
    fn skip_is_derived_from_page_and_limit(
        #[case] page: u32,
        #[case] limit: u32,
        #[case] skip: u64,
    ) {
        let request = PageRequest::new(page, limit).expect("valid request");
        assert_eq!(request.skip(), skip);
    }

    #[rstest]
    #[case(1, 10, 208, 10)]
    #[case(21, 10, 208, 8)]
    #[case(22, 10, 208, 0)]
    #[case(1, 10, 0, 0)]
    #[case(3, 5, 15, 5)]
    fn expected_len_matches_remaining_items(
        #[case] page: u32,
        #[case] limit: u32,
        #[case] total: u64,
        #[case] expected: usize,
    ) {
        let request = PageRequest::new(page, limit).expect("valid request");
        assert_eq!(request.expected_len(total), expected);
    }

    #[rstest]
    #[case(0, 10, 0)]
    #[case(10, 10, 1)]
    #[case(11, 10, 2)]
    #[case(208, 10, 21)]
    #[case(5, 0, 0)]
    fn page_count_rounds_up(#[case] total: u64, #[case] limit: u32, #[case] expected: u64) {
        assert_eq!(page_count(total, limit), expected);
    }

    #[test]
    fn apply_to_appends_limit_then_skip() {
        let mut url = Url::parse("https://dummyjson.com/users").expect("static url");
        PageRequest::new(3, 10)
            .expect("valid request")
            .apply_to(&mut url);
        assert_eq!(url.as_str(), "https://dummyjson.com/users?limit=10&skip=20");
    }

    #[test]
    fn with_page_keeps_limit() {
        let request = PageRequest::new(1, 25).expect("valid request");
        let next = request.with_page(4).expect("valid page");
        assert_eq!(next.limit(), 25);
        assert_eq!(next.page(), 4);
        assert_eq!(request.with_page(0), Err(PageRequestError::ZeroPage));
    }

    #[test]
    fn deserialisation_enforces_invariants() {
        let parsed: PageRequest =
            serde_json::from_str(r#"{"page":2,"limit":5}"#).expect("valid payload");
        assert_eq!(parsed.skip(), 5);

        let rejected = serde_json::from_str::<PageRequest>(r#"{"page":0,"limit":5}"#);
        assert!(rejected.is_err(), "zero page must not deserialise");
    }

    #[test]
    fn paginated_splits_into_items_and_total() {
        let request = PageRequest::new(2, 2).expect("valid request");
        let last = Paginated::new(vec!["c"], 3, request);
        assert_eq!(last.request(), request);
        assert_eq!(last.into_parts(), (vec!["c"], 3));
    }
}
