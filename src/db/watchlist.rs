use std::sync::Arc;

use chrono::Utc;

use crate::{
    db::storage::KeyValueStore,
    error::{AppResult, ValidationError},
    models::{MovieDetail, Rating, WatchedRecord},
};

/// Storage slot holding the serialized collection
pub const WATCHED_MOVIES_KEY: &str = "watchedMovies";

/// The user's watched movies, in the order they were first reviewed
///
/// The whole collection is written to storage after every successful
/// mutation. Memory is only updated once that write has succeeded, so the
/// two never disagree.
pub struct WatchlistStore {
    storage: Arc<dyn KeyValueStore>,
    records: Vec<WatchedRecord>,
}

impl WatchlistStore {
    /// Creates an empty store; call [`WatchlistStore::load`] to read storage
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            records: Vec::new(),
        }
    }

    /// Creates a store and loads whatever storage holds
    pub async fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let mut store = Self::new(storage);
        store.load().await;
        store
    }

    /// Replace the in-memory collection with the stored one
    ///
    /// A missing slot, unreadable storage, or unparseable contents all yield
    /// an empty collection.
    pub async fn load(&mut self) {
        self.records = match self.storage.get(WATCHED_MOVIES_KEY).await {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!(error = %e, "Stored watchlist is malformed, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => {
                tracing::debug!("No stored watchlist, starting empty");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored watchlist, starting empty");
                Vec::new()
            }
        };

        tracing::info!(records = self.records.len(), "Loaded watchlist");
    }

    /// Insert or replace the review for `movie`
    ///
    /// A replaced record keeps its position. Nothing changes, in memory or in
    /// storage, if the rating or review is invalid.
    pub async fn upsert(&mut self, movie: MovieDetail, rating: u8, review: &str) -> AppResult<()> {
        let user_rating = validate(rating, review)?;
        let imdb_id = movie.imdb_id.clone();

        let record = WatchedRecord {
            movie,
            user_rating,
            user_review: review.to_string(),
            watched_date: Utc::now(),
        };

        let mut updated = self.records.clone();
        let replaced = match updated.iter().position(|r| r.imdb_id() == imdb_id) {
            Some(index) => {
                updated[index] = record;
                true
            }
            None => {
                updated.push(record);
                false
            }
        };

        self.persist(&updated).await?;
        self.records = updated;

        tracing::info!(
            imdb_id = %imdb_id,
            rating,
            replaced,
            records = self.records.len(),
            "Watched movie saved"
        );
        Ok(())
    }

    /// Remove the record for `imdb_id`, if any
    ///
    /// Returns whether a record was removed. The collection is persisted
    /// either way.
    pub async fn remove(&mut self, imdb_id: &str) -> AppResult<bool> {
        let updated: Vec<WatchedRecord> = self
            .records
            .iter()
            .filter(|r| r.imdb_id() != imdb_id)
            .cloned()
            .collect();
        let removed = updated.len() != self.records.len();

        self.persist(&updated).await?;
        self.records = updated;

        tracing::info!(imdb_id = %imdb_id, removed, "Watched movie removed");
        Ok(removed)
    }

    pub fn get(&self, imdb_id: &str) -> Option<&WatchedRecord> {
        self.records.iter().find(|r| r.imdb_id() == imdb_id)
    }

    pub fn is_watched(&self, imdb_id: &str) -> bool {
        self.get(imdb_id).is_some()
    }

    pub fn records(&self) -> &[WatchedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    async fn persist(&self, records: &[WatchedRecord]) -> AppResult<()> {
        let json = serde_json::to_string(records)?;
        self.storage.set(WATCHED_MOVIES_KEY, &json).await
    }
}

/// Rating must be 1..=5 and the review must have non-whitespace content
fn validate(rating: u8, review: &str) -> Result<Rating, ValidationError> {
    let rating = Rating::try_from(rating)?;
    if review.trim().is_empty() {
        return Err(ValidationError::EmptyReview);
    }
    Ok(rating)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::storage::MemoryStore, error::AppError, models::fixtures::detail};

    async fn store_over(memory: &MemoryStore) -> WatchlistStore {
        WatchlistStore::open(Arc::new(memory.clone())).await
    }

    async fn stored(memory: &MemoryStore) -> Option<String> {
        memory.get(WATCHED_MOVIES_KEY).await.unwrap()
    }

    #[tokio::test]
    async fn test_load_missing_is_empty() {
        let store = store_over(&MemoryStore::new()).await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_load_malformed_is_empty() {
        let memory = MemoryStore::with_entry(WATCHED_MOVIES_KEY, "{not json");
        let store = store_over(&memory).await;
        assert!(store.is_empty());
        // Malformed contents are left alone until the next write
        assert_eq!(stored(&memory).await.as_deref(), Some("{not json"));
    }

    #[tokio::test]
    async fn test_upsert_appends_and_persists() {
        let memory = MemoryStore::new();
        let mut store = store_over(&memory).await;

        store
            .upsert(detail("tt0372784", "Batman Begins"), 4, "Dark and grounded")
            .await
            .unwrap();
        store
            .upsert(detail("tt0468569", "The Dark Knight"), 5, "Best of the trilogy")
            .await
            .unwrap();

        let ids: Vec<&str> = store.records().iter().map(|r| r.imdb_id()).collect();
        assert_eq!(ids, vec!["tt0372784", "tt0468569"]);

        let persisted: Vec<WatchedRecord> =
            serde_json::from_str(&stored(&memory).await.unwrap()).unwrap();
        assert_eq!(persisted, store.records());
    }

    #[tokio::test]
    async fn test_upsert_replaces_in_place() {
        let memory = MemoryStore::new();
        let mut store = store_over(&memory).await;

        store.upsert(detail("tt1", "First"), 3, "ok").await.unwrap();
        store.upsert(detail("tt2", "Second"), 4, "good").await.unwrap();
        store.upsert(detail("tt3", "Third"), 2, "meh").await.unwrap();
        store.upsert(detail("tt2", "Second"), 1, "worse on rewatch").await.unwrap();

        assert_eq!(store.len(), 3);
        let second = &store.records()[1];
        assert_eq!(second.imdb_id(), "tt2");
        assert_eq!(second.user_rating.value(), 1);
        assert_eq!(second.user_review, "worse on rewatch");
    }

    #[tokio::test]
    async fn test_review_stored_untrimmed() {
        let mut store = store_over(&MemoryStore::new()).await;
        store.upsert(detail("tt1", "First"), 3, "  spaced out  ").await.unwrap();
        assert_eq!(store.get("tt1").unwrap().user_review, "  spaced out  ");
    }

    #[tokio::test]
    async fn test_zero_rating_rejected_without_persisting() {
        let memory = MemoryStore::new();
        let mut store = store_over(&memory).await;
        store.upsert(detail("tt1", "First"), 3, "ok").await.unwrap();
        let before = stored(&memory).await;

        let result = store.upsert(detail("tt2", "Second"), 0, "great").await;

        assert!(matches!(
            result,
            Err(AppError::Validation(ValidationError::MissingRating))
        ));
        assert_eq!(store.len(), 1);
        assert_eq!(stored(&memory).await, before);
    }

    #[tokio::test]
    async fn test_blank_review_rejected() {
        let memory = MemoryStore::new();
        let mut store = store_over(&memory).await;

        let result = store.upsert(detail("tt1", "First"), 4, " \n\t ").await;

        assert!(matches!(
            result,
            Err(AppError::Validation(ValidationError::EmptyReview))
        ));
        assert!(store.is_empty());
        assert_eq!(stored(&memory).await, None);
    }

    #[tokio::test]
    async fn test_out_of_range_rating_rejected() {
        let mut store = store_over(&MemoryStore::new()).await;
        let result = store.upsert(detail("tt1", "First"), 6, "fine").await;
        assert!(matches!(
            result,
            Err(AppError::Validation(ValidationError::RatingOutOfRange(6)))
        ));
    }

    #[tokio::test]
    async fn test_remove_present_and_absent() {
        let memory = MemoryStore::new();
        let mut store = store_over(&memory).await;
        store.upsert(detail("tt1", "First"), 3, "ok").await.unwrap();
        store.upsert(detail("tt2", "Second"), 4, "good").await.unwrap();

        assert!(store.remove("tt1").await.unwrap());
        assert!(!store.is_watched("tt1"));
        assert!(!store.remove("tt1").await.unwrap());

        let persisted: Vec<WatchedRecord> =
            serde_json::from_str(&stored(&memory).await.unwrap()).unwrap();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].imdb_id(), "tt2");
    }

    #[tokio::test]
    async fn test_round_trip_through_storage() {
        let memory = MemoryStore::new();
        let mut store = store_over(&memory).await;
        store.upsert(detail("tt1", "First"), 3, "ok").await.unwrap();
        store.upsert(detail("tt2", "Second"), 5, "loved it").await.unwrap();

        let reloaded = store_over(&memory).await;
        assert_eq!(reloaded.records(), store.records());
    }

    #[tokio::test]
    async fn test_round_trip_empty_collection() {
        let memory = MemoryStore::new();
        let mut store = store_over(&memory).await;
        store.upsert(detail("tt1", "First"), 3, "ok").await.unwrap();
        store.remove("tt1").await.unwrap();

        assert_eq!(stored(&memory).await.as_deref(), Some("[]"));
        assert!(store_over(&memory).await.is_empty());
    }
}
