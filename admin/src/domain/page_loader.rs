//! Paged list loader with last-request-wins semantics.
//!
//! The loader owns the requested `(page, limit)` pair and the last page the
//! service answered. Every change of page issues exactly one list fetch;
//! a response is applied only if no newer fetch started after it, so a slow
//! answer for an old page can never overwrite a newer one. Failures keep the
//! previous page on screen and raise the error flag instead.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pagination::{PageRequest, PageRequestError, Paginated, page_count};
use tracing::{debug, warn};

use super::error::AdminError;
use super::ports::UserDirectory;
use super::request_token::{RequestToken, RequestTokens};
use super::user::UserRecord;

/// One page of records exactly as answered for a single `(page, limit)`.
///
/// ## Invariants
/// - `records().len() <= limit()`
/// - records never mix two different pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    records: Vec<UserRecord>,
    request: PageRequest,
    total: u64,
}

impl PageState {
    /// An empty page for `request`, shown before the first fetch completes.
    pub const fn empty(request: PageRequest) -> Self {
        Self {
            records: Vec::new(),
            request,
            total: 0,
        }
    }

    pub fn records(&self) -> &[UserRecord] {
        self.records.as_slice()
    }

    pub const fn page(&self) -> u32 {
        self.request.page()
    }

    pub const fn limit(&self) -> u32 {
        self.request.limit()
    }

    /// Total users reported by the service.
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Number of pages the pager offers.
    pub const fn page_count(&self) -> u64 {
        page_count(self.total, self.request.limit())
    }

    /// Replace the record sharing `record.id`, keeping row order.
    fn merge(&mut self, record: UserRecord) -> bool {
        match self.records.iter_mut().find(|row| row.id == record.id) {
            Some(row) => {
                *row = record;
                true
            }
            None => false,
        }
    }
}

impl From<Paginated<UserRecord>> for PageState {
    /// Take one service answer, truncating it to the requested limit.
    fn from(page: Paginated<UserRecord>) -> Self {
        let request = page.request();
        let (mut records, total) = page.into_parts();
        let limit = usize::try_from(request.limit()).unwrap_or(usize::MAX);
        if records.len() > limit {
            warn!(
                received = records.len(),
                limit, "user service returned more records than requested; truncating"
            );
            records.truncate(limit);
        }
        Self {
            records,
            request,
            total,
        }
    }
}

/// Read-only view of the loader handed to views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderSnapshot {
    /// Last page applied from the service.
    pub page_state: PageState,
    /// Page and limit the user asked for most recently.
    pub requested: PageRequest,
    pub is_loading: bool,
    /// Cause of the last failed fetch, cleared when a new fetch starts.
    pub error: Option<AdminError>,
}

/// What happened to one list fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response replaced the page.
    Applied,
    /// The requested page was already loaded or loading; nothing was sent.
    Unchanged,
    /// A newer fetch started before this one resolved; the response was dropped.
    Superseded,
    /// The fetch failed; the previous page was kept.
    Failed(AdminError),
}

#[derive(Debug)]
struct LoaderState {
    page_state: PageState,
    requested: PageRequest,
    loaded: bool,
    loading: bool,
    error: Option<AdminError>,
    tokens: RequestTokens,
}

impl LoaderState {
    fn is_settled_on(&self, request: PageRequest) -> bool {
        request == self.requested && (self.loading || (self.loaded && self.error.is_none()))
    }

    fn begin(&mut self, request: PageRequest) -> RequestToken {
        self.requested = request;
        self.loading = true;
        self.error = None;
        self.tokens.issue()
    }
}

/// Cloneable handle over the shared list state.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use user_admin::domain::PagedListLoader;
/// use user_admin::domain::ports::FixtureUserDirectory;
///
/// # let runtime = tokio::runtime::Builder::new_current_thread().build().expect("runtime");
/// # runtime.block_on(async {
/// let directory = Arc::new(FixtureUserDirectory::sample(25));
/// let loader = PagedListLoader::open(directory, 1, 10).await.expect("valid page");
/// loader.set_page(3).await.expect("valid page");
///
/// let snapshot = loader.snapshot();
/// assert_eq!(snapshot.page_state.records().len(), 5);
/// assert_eq!(snapshot.page_state.page_count(), 3);
/// # });
/// ```
#[derive(Clone)]
pub struct PagedListLoader {
    directory: Arc<dyn UserDirectory>,
    state: Arc<Mutex<LoaderState>>,
}

impl PagedListLoader {
    /// Build a loader for `(initial_page, limit)` without fetching.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when `initial_page` or `limit` is zero.
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        initial_page: u32,
        limit: u32,
    ) -> Result<Self, PageRequestError> {
        let requested = PageRequest::new(initial_page, limit)?;
        let state = LoaderState {
            page_state: PageState::empty(requested),
            requested,
            loaded: false,
            loading: false,
            error: None,
            tokens: RequestTokens::new(),
        };
        Ok(Self {
            directory,
            state: Arc::new(Mutex::new(state)),
        })
    }

    /// Build a loader and fetch its initial page.
    ///
    /// A failed initial fetch is recorded in the snapshot, not returned.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when `initial_page` or `limit` is zero.
    pub async fn open(
        directory: Arc<dyn UserDirectory>,
        initial_page: u32,
        limit: u32,
    ) -> Result<Self, PageRequestError> {
        let loader = Self::new(directory, initial_page, limit)?;
        loader.refetch().await;
        Ok(loader)
    }

    /// Move to `page`, fetching it unless it is already loaded or loading.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError::ZeroPage`] when `page` is zero; the
    /// loader state is left untouched.
    pub async fn set_page(&self, page: u32) -> Result<LoadOutcome, PageRequestError> {
        let (token, request) = {
            let mut state = self.lock();
            let request = state.requested.with_page(page)?;
            if state.is_settled_on(request) {
                return Ok(LoadOutcome::Unchanged);
            }
            (state.begin(request), request)
        };
        Ok(self.fetch(token, request).await)
    }

    /// Fetch the current `(page, limit)` again.
    pub async fn refetch(&self) -> LoadOutcome {
        let (token, request) = {
            let mut state = self.lock();
            let request = state.requested;
            (state.begin(request), request)
        };
        self.fetch(token, request).await
    }

    /// Replace the row whose id matches `record`, preserving row order.
    ///
    /// Returns `false` when the record is not on the current page.
    pub fn merge_record(&self, record: UserRecord) -> bool {
        self.lock().page_state.merge(record)
    }

    pub fn snapshot(&self) -> LoaderSnapshot {
        let state = self.lock();
        LoaderSnapshot {
            page_state: state.page_state.clone(),
            requested: state.requested,
            is_loading: state.loading,
            error: state.error.clone(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    async fn fetch(&self, token: RequestToken, request: PageRequest) -> LoadOutcome {
        debug!(
            page = request.page(),
            limit = request.limit(),
            "fetching user page"
        );
        let result = self.directory.list_users(request).await;

        let mut state = self.lock();
        if !state.tokens.is_current(token) {
            debug!(
                page = request.page(),
                "discarding superseded user page response"
            );
            return LoadOutcome::Superseded;
        }
        state.loading = false;
        match result {
            Ok(page) => {
                state.page_state = PageState::from(page);
                state.loaded = true;
                state.error = None;
                LoadOutcome::Applied
            }
            Err(source) => {
                let error = AdminError::from(source);
                warn!(page = request.page(), error = %error, "user page fetch failed");
                state.error = Some(error.clone());
                LoadOutcome::Failed(error)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, LoaderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for PagedListLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedListLoader")
            .field("state", &*self.lock())
            .finish_non_exhaustive()
    }
}
