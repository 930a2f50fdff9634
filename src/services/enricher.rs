use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use tokio::sync::RwLock;

use crate::{
    models::{DetailOutcome, MovieDetail, SearchHit},
    services::providers::CatalogProvider,
};

/// What the results list should show for the current page
#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    /// An aggregation is running; the previous page's details are gone
    Loading,
    /// Nothing to show: no hits, every hit skipped, or every lookup missed
    NoMovies,
    /// No lookup succeeded and the catalog could not be reached
    ConnectionFailed,
    Ready(Vec<MovieDetail>),
}

impl DetailState {
    pub fn details(&self) -> &[MovieDetail] {
        match self {
            DetailState::Ready(details) => details,
            _ => &[],
        }
    }
}

/// Hydrates a page of search hits into full detail records
///
/// Lookups fan out as one task per hit and are joined in hit order. Individual
/// misses and failures are dropped; only a page where nothing succeeded and at
/// least one lookup failed in transport is reported as `ConnectionFailed`.
pub struct DetailEnricher {
    provider: Arc<dyn CatalogProvider>,
    state: RwLock<DetailState>,
    generation: AtomicU64,
}

impl DetailEnricher {
    pub fn new(provider: Arc<dyn CatalogProvider>) -> Self {
        Self {
            provider,
            state: RwLock::new(DetailState::NoMovies),
            generation: AtomicU64::new(0),
        }
    }

    pub async fn state(&self) -> DetailState {
        self.state.read().await.clone()
    }

    /// Forget the current details, e.g. when the query is cleared
    ///
    /// Any refresh that began earlier will not store its result.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        *state = DetailState::NoMovies;
    }

    /// Reserve a generation for an upcoming [`DetailEnricher::refresh`]
    ///
    /// Refreshes and clears are ordered by when their ticket was taken, not by
    /// when they run.
    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Replace the current details with those of `hits`
    ///
    /// `generation` comes from [`DetailEnricher::begin`]. A refresh that is
    /// already superseded when it runs looks nothing up and returns the current
    /// state. One superseded mid-flight returns its result without storing it.
    pub async fn refresh(&self, generation: u64, hits: Vec<SearchHit>) -> DetailState {
        {
            let mut state = self.state.write().await;
            if !self.is_current(generation) {
                tracing::debug!(generation, "Detail refresh superseded before it started");
                return state.clone();
            }
            *state = DetailState::Loading;
        }

        let outcome = self.enrich(&hits).await;

        let mut state = self.state.write().await;
        if self.is_current(generation) {
            *state = outcome.clone();
        } else {
            tracing::debug!(generation, "Discarding superseded detail aggregation");
        }

        outcome
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Look up every well-formed hit and aggregate the results
    pub async fn enrich(&self, hits: &[SearchHit]) -> DetailState {
        let mut tasks = Vec::new();

        for hit in hits {
            if !hit.is_well_formed() {
                tracing::warn!(
                    imdb_id = %hit.imdb_id,
                    title = %hit.title,
                    "Movie data is incomplete, skipping"
                );
                continue;
            }

            let provider = Arc::clone(&self.provider);
            let imdb_id = hit.imdb_id.clone();
            tasks.push(tokio::spawn(
                async move { provider.fetch_detail(&imdb_id).await },
            ));
        }

        if tasks.is_empty() {
            return DetailState::NoMovies;
        }

        let requested = tasks.len();
        let mut details = Vec::new();
        let mut not_found = 0;
        let mut transport_errors = 0;

        for task in tasks {
            match task.await {
                Ok(Ok(DetailOutcome::Found(movie))) => details.push(movie),
                Ok(Ok(DetailOutcome::NotFound)) => not_found += 1,
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "Detail fetch failed for title");
                    if e.is_transport() {
                        transport_errors += 1;
                    } else {
                        not_found += 1;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Task join error");
                    transport_errors += 1;
                }
            }
        }

        if transport_errors > 0 || not_found > 0 {
            tracing::warn!(
                requested,
                success_count = details.len(),
                not_found,
                error_count = transport_errors,
                "Partial detail fetch failure"
            );
        }

        if !details.is_empty() {
            DetailState::Ready(details)
        } else if transport_errors > 0 {
            DetailState::ConnectionFailed
        } else {
            DetailState::NoMovies
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        models::fixtures::{detail, hit},
        services::providers::MockCatalogProvider,
    };

    fn enricher_with(mock: MockCatalogProvider) -> DetailEnricher {
        DetailEnricher::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn test_empty_input_is_no_movies() {
        let enricher = enricher_with(MockCatalogProvider::new());
        assert_eq!(enricher.enrich(&[]).await, DetailState::NoMovies);
    }

    #[tokio::test]
    async fn test_malformed_hits_skipped_without_lookup() {
        // No expectations: any lookup would panic the mock
        let enricher = enricher_with(MockCatalogProvider::new());
        let hits = vec![hit("", "No Id"), hit("tt1", "")];
        assert_eq!(enricher.enrich(&hits).await, DetailState::NoMovies);
    }

    #[tokio::test]
    async fn test_one_failure_among_four_keeps_the_rest() {
        let mut mock = MockCatalogProvider::new();
        mock.expect_fetch_detail().times(4).returning(|imdb_id| {
            if imdb_id == "tt3" {
                Err(AppError::ExternalApi("connection reset".to_string()))
            } else {
                Ok(DetailOutcome::Found(detail(imdb_id, "Batman")))
            }
        });
        let enricher = enricher_with(mock);

        let hits = vec![hit("tt1", "A"), hit("tt2", "B"), hit("tt3", "C"), hit("tt4", "D")];
        let state = enricher.enrich(&hits).await;

        let ids: Vec<&str> = state.details().iter().map(|d| d.imdb_id.as_str()).collect();
        assert_eq!(ids, vec!["tt1", "tt2", "tt4"]);
        assert!(matches!(state, DetailState::Ready(_)));
    }

    #[tokio::test]
    async fn test_not_found_lookups_dropped_silently() {
        let mut mock = MockCatalogProvider::new();
        mock.expect_fetch_detail().times(2).returning(|imdb_id| {
            if imdb_id == "tt1" {
                Ok(DetailOutcome::NotFound)
            } else {
                Ok(DetailOutcome::Found(detail(imdb_id, "Batman")))
            }
        });
        let enricher = enricher_with(mock);

        let state = enricher.enrich(&[hit("tt1", "A"), hit("tt2", "B")]).await;
        assert_eq!(state.details().len(), 1);
    }

    #[tokio::test]
    async fn test_all_transport_failures_is_connection_failed() {
        let mut mock = MockCatalogProvider::new();
        mock.expect_fetch_detail()
            .times(2)
            .returning(|_| Err(AppError::ExternalApi("OMDb API returned status 503".to_string())));
        let enricher = enricher_with(mock);

        let state = enricher.enrich(&[hit("tt1", "A"), hit("tt2", "B")]).await;
        assert_eq!(state, DetailState::ConnectionFailed);
    }

    #[tokio::test]
    async fn test_all_not_found_is_no_movies() {
        let mut mock = MockCatalogProvider::new();
        mock.expect_fetch_detail()
            .times(2)
            .returning(|_| Ok(DetailOutcome::NotFound));
        let enricher = enricher_with(mock);

        let state = enricher.enrich(&[hit("tt1", "A"), hit("tt2", "B")]).await;
        assert_eq!(state, DetailState::NoMovies);
    }

    #[tokio::test]
    async fn test_refresh_stores_state_and_clear_resets() {
        let mut mock = MockCatalogProvider::new();
        mock.expect_fetch_detail()
            .times(1)
            .returning(|imdb_id| Ok(DetailOutcome::Found(detail(imdb_id, "Batman Begins"))));
        let enricher = enricher_with(mock);

        let ticket = enricher.begin();
        let outcome = enricher
            .refresh(ticket, vec![hit("tt0372784", "Batman Begins")])
            .await;
        assert_eq!(enricher.state().await, outcome);
        assert_eq!(enricher.state().await.details().len(), 1);

        enricher.clear().await;
        assert_eq!(enricher.state().await, DetailState::NoMovies);
    }

    #[tokio::test]
    async fn test_clear_after_begin_wins_over_refresh() {
        // No expectations: the superseded refresh must not look anything up
        let enricher = enricher_with(MockCatalogProvider::new());

        let ticket = enricher.begin();
        enricher.clear().await;
        enricher
            .refresh(ticket, vec![hit("tt0372784", "Batman Begins")])
            .await;

        assert_eq!(enricher.state().await, DetailState::NoMovies);
    }

    #[tokio::test]
    async fn test_older_ticket_does_not_overwrite_newer_result() {
        let mut mock = MockCatalogProvider::new();
        mock.expect_fetch_detail()
            .times(1)
            .returning(|imdb_id| Ok(DetailOutcome::Found(detail(imdb_id, "The Dark Knight"))));
        let enricher = enricher_with(mock);

        let older = enricher.begin();
        let newer = enricher.begin();
        enricher
            .refresh(newer, vec![hit("tt0468569", "The Dark Knight")])
            .await;
        enricher
            .refresh(older, vec![hit("tt0372784", "Batman Begins")])
            .await;

        let ids: Vec<String> = enricher
            .state()
            .await
            .details()
            .iter()
            .map(|d| d.imdb_id.clone())
            .collect();
        assert_eq!(ids, vec!["tt0468569"]);
    }
}
