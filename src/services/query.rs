use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use tokio::{
    sync::{mpsc, RwLock},
    task::JoinHandle,
};

use crate::{
    models::{PageState, SearchHit, SearchOutcome},
    services::{
        debounce::Debouncer,
        enricher::DetailEnricher,
        paginator::{total_pages_for, PaginationControls},
        providers::CatalogProvider,
    },
};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Side effects the controller asks the presentation layer to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// A non-empty query has been stable for the debounce delay
    ShowResults { query: String },
    /// The query became empty; results were cleared
    QueryCleared,
    /// The page changed; scroll the results viewport back to the top
    ScrollToTop,
}

/// Read-only copy of the controller state
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSnapshot {
    pub query: String,
    pub page: PageState,
    pub results: Vec<SearchHit>,
    pub is_loading: bool,
}

impl SearchSnapshot {
    pub fn controls(&self) -> PaginationControls {
        self.page.controls(self.is_loading)
    }
}

#[derive(Default)]
struct SearchState {
    query: String,
    page: PageState,
    results: Vec<SearchHit>,
    is_loading: bool,
    /// Sequence number of the most recently issued fetch
    latest_request: u64,
}

/// Owns the search query and pagination and keeps results in step with them
///
/// Every query or page change issues a catalog fetch right away. Only the
/// `ShowResults` navigation event is debounced. Fetches are tagged with a
/// sequence number and a response is applied only if no newer fetch (or
/// clear) was issued after it.
#[derive(Clone)]
pub struct QueryController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    provider: Arc<dyn CatalogProvider>,
    enricher: Option<Arc<DetailEnricher>>,
    state: RwLock<SearchState>,
    debouncer: Debouncer,
    events: mpsc::UnboundedSender<SearchEvent>,
}

impl QueryController {
    /// Creates a controller and the receiving end of its event stream
    ///
    /// When an enricher is given, every applied page of hits is handed to it
    /// before the fetch task completes.
    pub fn new(
        provider: Arc<dyn CatalogProvider>,
        enricher: Option<Arc<DetailEnricher>>,
        debounce: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SearchEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();

        let controller = Self {
            inner: Arc::new(ControllerInner {
                provider,
                enricher,
                state: RwLock::new(SearchState::default()),
                debouncer: Debouncer::new(debounce),
                events,
            }),
        };

        (controller, events_rx)
    }

    pub fn enricher(&self) -> Option<&Arc<DetailEnricher>> {
        self.inner.enricher.as_ref()
    }

    pub async fn snapshot(&self) -> SearchSnapshot {
        let state = self.inner.state.read().await;
        SearchSnapshot {
            query: state.query.clone(),
            page: state.page,
            results: state.results.clone(),
            is_loading: state.is_loading,
        }
    }

    /// Replace the query
    ///
    /// Resets to page 1. An empty query cancels pending navigation and clears
    /// results; anything else re-arms the navigation debounce and fetches
    /// page 1. Returns the fetch task, if one
    /// was issued.
    pub async fn set_query(&self, text: impl Into<String>) -> Option<JoinHandle<()>> {
        let query = text.into();
        {
            let mut state = self.inner.state.write().await;
            state.query = query.clone();
            state.page.reset();
        }

        if query.is_empty() {
            self.inner.debouncer.cancel().await;
            self.inner.clear_results().await;
            self.inner.emit(SearchEvent::QueryCleared);
            return None;
        }

        self.arm_navigation().await;
        Some(self.issue_fetch(query, 1).await)
    }

    /// Move to the next page, unless on the last page or a fetch is in flight
    pub async fn next(&self) -> Option<JoinHandle<()>> {
        self.turn_page(PageState::next).await
    }

    /// Move to the previous page, unless on page 1 or a fetch is in flight
    pub async fn prev(&self) -> Option<JoinHandle<()>> {
        self.turn_page(PageState::prev).await
    }

    /// Re-issue the fetch for the current query and page
    pub async fn refresh(&self) -> Option<JoinHandle<()>> {
        let (query, page) = {
            let state = self.inner.state.read().await;
            (state.query.clone(), state.page.current_page)
        };

        if query.is_empty() {
            return None;
        }
        Some(self.issue_fetch(query, page).await)
    }

    async fn turn_page(&self, step: fn(&mut PageState) -> bool) -> Option<JoinHandle<()>> {
        let (query, page) = {
            let mut state = self.inner.state.write().await;
            if state.is_loading {
                tracing::debug!("Page change ignored while a fetch is in flight");
                return None;
            }
            if !step(&mut state.page) {
                return None;
            }
            (state.query.clone(), state.page.current_page)
        };

        self.inner.emit(SearchEvent::ScrollToTop);

        if query.is_empty() {
            return None;
        }
        Some(self.issue_fetch(query, page).await)
    }

    async fn arm_navigation(&self) {
        let inner: Weak<ControllerInner> = Arc::downgrade(&self.inner);

        self.inner
            .debouncer
            .arm(async move {
                let Some(inner) = inner.upgrade() else {
                    return;
                };

                let query = inner.state.read().await.query.clone();
                if query.is_empty() {
                    tracing::debug!("Query empty when debounce settled, staying put");
                    return;
                }

                inner.emit(SearchEvent::ShowResults { query });
            })
            .await;
    }

    async fn issue_fetch(&self, query: String, page: u32) -> JoinHandle<()> {
        let request = {
            let mut state = self.inner.state.write().await;
            state.latest_request += 1;
            state.is_loading = true;
            state.latest_request
        };

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.fetch_page(request, &query, page).await })
    }
}

impl ControllerInner {
    fn emit(&self, event: SearchEvent) {
        if let Err(e) = self.events.send(event) {
            tracing::debug!(event = ?e.0, "No listener for search event");
        }
    }

    /// Clear results immediately and fence off any fetch still in flight
    async fn clear_results(&self) {
        let mut state = self.state.write().await;
        state.latest_request += 1;
        state.results.clear();
        state.page.clear();
        state.is_loading = false;

        // Enricher tickets are only taken under this lock
        if let Some(enricher) = &self.enricher {
            enricher.clear().await;
        }
    }

    async fn fetch_page(&self, request: u64, query: &str, page: u32) {
        let (results, total_pages) = match self.provider.search(query, page).await {
            Ok(SearchOutcome::Found {
                hits,
                total_results,
            }) => (hits, total_pages_for(total_results)),
            Ok(SearchOutcome::NotFound) => (Vec::new(), 0),
            Err(e) => {
                tracing::error!(error = %e, query = %query, page, "Error fetching movies");
                (Vec::new(), 0)
            }
        };

        let ticket = {
            let mut state = self.state.write().await;
            if state.latest_request != request {
                tracing::debug!(
                    request,
                    latest = state.latest_request,
                    query = %query,
                    "Discarding stale search response"
                );
                return;
            }

            state.results = results.clone();
            state.page.set_total_pages(total_pages);
            state.is_loading = false;

            self.enricher.as_ref().map(|enricher| enricher.begin())
        };

        tracing::info!(
            query = %query,
            page,
            results = results.len(),
            total_pages,
            "Search results applied"
        );

        if let (Some(enricher), Some(ticket)) = (&self.enricher, ticket) {
            enricher.refresh(ticket, results).await;
        }
    }
}
