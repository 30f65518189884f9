//! One page of a remote collection plus the pagination state derived from
//! the last successful response.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    Arc,
};

use shared::protocol::{PageRequest, PageResult, DEFAULT_PAGE, DEFAULT_TAKE};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::{
    notice::Notifier,
    resource::{RemoteResource, Resource},
    InFlight, Outcome,
};

/// Which of several overlapping list responses ends up in state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseOrdering {
    /// Only the response to the most recently issued request is applied.
    #[default]
    LatestIssued,
    /// Every response is applied as it resolves; the last one to arrive wins.
    LastResolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationView {
    pub current_page: u32,
    pub page_size: u32,
    pub total_items: u64,
}

impl PaginationView {
    pub fn page_count(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total_items.div_ceil(u64::from(self.page_size))
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.current_page) < self.page_count()
    }

    fn request(&self) -> PageRequest {
        PageRequest::new(self.current_page, self.page_size)
    }
}

impl Default for PaginationView {
    fn default() -> Self {
        Self {
            current_page: DEFAULT_PAGE,
            page_size: DEFAULT_TAKE,
            total_items: 0,
        }
    }
}

impl<T> From<&PageResult<T>> for PaginationView {
    fn from(page: &PageResult<T>) -> Self {
        Self {
            current_page: page.page,
            page_size: page.take,
            total_items: page.total_items,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub pagination: PaginationView,
    pub loading: bool,
    pub error: Option<String>,
}

struct ListInner<T> {
    items: Vec<T>,
    pagination: PaginationView,
    error: Option<String>,
}

/// Clears the activation flag unless the first fetch ran to completion.
struct Activation<'a> {
    flag: &'a AtomicBool,
    completed: bool,
}

impl Drop for Activation<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.flag.store(false, Ordering::SeqCst);
        }
    }
}

pub struct ListController<R: Resource> {
    remote: Arc<dyn RemoteResource<R>>,
    notifier: Notifier,
    ordering: ResponseOrdering,
    inner: Mutex<ListInner<R::Item>>,
    in_flight: AtomicUsize,
    issued: AtomicU64,
    activated: AtomicBool,
}

impl<R: Resource> ListController<R> {
    pub fn new(remote: Arc<dyn RemoteResource<R>>, notifier: Notifier) -> Self {
        Self {
            remote,
            notifier,
            ordering: ResponseOrdering::default(),
            inner: Mutex::new(ListInner {
                items: Vec::new(),
                pagination: PaginationView::default(),
                error: None,
            }),
            in_flight: AtomicUsize::new(0),
            issued: AtomicU64::new(0),
            activated: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn with_ordering(mut self, ordering: ResponseOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Page size used until the first response echoes one back.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.inner.get_mut().pagination.page_size = page_size.max(1);
        self
    }

    /// Initial load. Only the first call fetches; if that fetch is dropped
    /// before it completes, the next call fetches again.
    pub async fn activate(&self) -> Outcome {
        if self.activated.swap(true, Ordering::SeqCst) {
            return Outcome::Skipped;
        }
        let mut activation = Activation {
            flag: &self.activated,
            completed: false,
        };
        let outcome = self.fetch_page(None).await;
        activation.completed = true;
        outcome
    }

    /// Re-fetches the current page, e.g. after a record was created.
    pub async fn refresh(&self) -> Outcome {
        self.fetch_page(None).await
    }

    /// Pagination control changed; fetch what it asks for without
    /// predicting the result locally.
    pub async fn on_page_change(&self, page: u32, page_size: u32) -> Outcome {
        self.fetch_page(Some(PageRequest::new(page, page_size))).await
    }

    /// Fetches one page. Without an explicit request the current page and
    /// page size are reused. Overlapping calls are allowed; see
    /// [`ResponseOrdering`] for which response is kept.
    pub async fn fetch_page(&self, request: Option<PageRequest>) -> Outcome {
        let request = match request {
            Some(request) => request,
            None => self.inner.lock().await.pagination.request(),
        };
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let _in_flight = InFlight::enter(&self.in_flight);
        info!(
            resource = R::LABEL,
            page = request.page,
            take = request.take,
            seq,
            "fetching page"
        );

        let result = self.remote.list(request).await;

        let mut inner = self.inner.lock().await;
        if self.ordering == ResponseOrdering::LatestIssued
            && seq != self.issued.load(Ordering::SeqCst)
        {
            debug!(resource = R::LABEL, seq, "discarding stale list response");
            return Outcome::Discarded;
        }

        match result {
            Ok(page) => {
                inner.pagination = PaginationView::from(&page);
                inner.items = page.items;
                inner.error = None;
                Outcome::Succeeded
            }
            Err(err) => {
                let message = err.user_message(&format!("Unable to fetch {} list", R::LABEL));
                error!(resource = R::LABEL, page = request.page, error = %err, "list fetch failed");
                self.notifier.error(message.clone());
                inner.error = Some(message);
                Outcome::Failed
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub async fn state(&self) -> ListState<R::Item> {
        let inner = self.inner.lock().await;
        ListState {
            items: inner.items.clone(),
            pagination: inner.pagination,
            loading: self.is_loading(),
            error: inner.error.clone(),
        }
    }
}

#[cfg(test)]
#[path = "tests/list_tests.rs"]
mod tests;
