use serde::Serialize;

use crate::{
    db::watchlist::WatchlistStore,
    error::AppResult,
    models::{MovieDetail, Rating},
};

/// Where a movie sits in the watch-and-review flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WatchStatus {
    Unwatched,
    Watching,
    Submitted,
}

/// What happened on a submit attempt that did not fail validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Saved,
    /// Already submitted; nothing is written until the movie is unmarked
    AlreadySubmitted,
    /// The movie has not been marked as watched
    NotWatched,
}

/// Review form for one movie
#[derive(Debug, Clone)]
pub struct ReviewSession {
    movie: MovieDetail,
    status: WatchStatus,
    rating: u8,
    review: String,
}

impl ReviewSession {
    /// Opens the form for `movie`, picking up an existing record if there is one
    pub fn open(movie: MovieDetail, store: &WatchlistStore) -> Self {
        match store.get(&movie.imdb_id) {
            Some(record) => Self {
                status: WatchStatus::Submitted,
                rating: record.user_rating.value(),
                review: record.user_review.clone(),
                movie,
            },
            None => Self {
                movie,
                status: WatchStatus::Unwatched,
                rating: 0,
                review: String::new(),
            },
        }
    }

    pub fn movie(&self) -> &MovieDetail {
        &self.movie
    }

    pub fn status(&self) -> WatchStatus {
        self.status
    }

    /// Selected stars, 0 when none
    pub fn rating(&self) -> u8 {
        self.rating
    }

    pub fn review(&self) -> &str {
        &self.review
    }

    pub fn is_watched(&self) -> bool {
        self.status != WatchStatus::Unwatched
    }

    /// Mark or unmark the movie as watched
    ///
    /// Unmarking removes the stored record and resets the form.
    pub async fn set_watched(
        &mut self,
        watched: bool,
        store: &mut WatchlistStore,
    ) -> AppResult<()> {
        if watched {
            if self.status == WatchStatus::Unwatched {
                self.status = WatchStatus::Watching;
            }
            return Ok(());
        }

        store.remove(&self.movie.imdb_id).await?;
        self.status = WatchStatus::Unwatched;
        self.rating = 0;
        self.review.clear();
        Ok(())
    }

    /// Click on star `star`; clicking the selected star again clears the rating
    pub fn select_star(&mut self, star: u8) {
        if !self.is_editable() {
            return;
        }
        self.rating = if self.rating == star {
            0
        } else {
            star.min(Rating::MAX)
        };
    }

    pub fn set_rating(&mut self, rating: u8) {
        if self.is_editable() {
            self.rating = rating.min(Rating::MAX);
        }
    }

    pub fn set_review(&mut self, review: impl Into<String>) {
        if self.is_editable() {
            self.review = review.into();
        }
    }

    pub fn can_submit(&self) -> bool {
        self.status == WatchStatus::Watching
            && self.rating > 0
            && !self.review.trim().is_empty()
    }

    /// Save the review
    ///
    /// Validation failures are returned as errors and leave the session in
    /// `Watching`.
    pub async fn submit(&mut self, store: &mut WatchlistStore) -> AppResult<SubmitOutcome> {
        match self.status {
            WatchStatus::Unwatched => return Ok(SubmitOutcome::NotWatched),
            WatchStatus::Submitted => return Ok(SubmitOutcome::AlreadySubmitted),
            WatchStatus::Watching => {}
        }

        store
            .upsert(self.movie.clone(), self.rating, &self.review)
            .await?;
        self.status = WatchStatus::Submitted;
        Ok(SubmitOutcome::Saved)
    }

    fn is_editable(&self) -> bool {
        self.status == WatchStatus::Watching
    }
}
