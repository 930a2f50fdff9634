use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::MovieDetail;
use crate::error::ValidationError;

/// A user's star rating, always within 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MAX: u8 = 5;

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Err(ValidationError::MissingRating),
            1..=Self::MAX => Ok(Rating(value)),
            _ => Err(ValidationError::RatingOutOfRange(value)),
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.0, Self::MAX)
    }
}

/// A movie the user has watched and reviewed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchedRecord {
    pub movie: MovieDetail,
    pub user_rating: Rating,
    pub user_review: String,
    pub watched_date: DateTime<Utc>,
}

impl WatchedRecord {
    pub fn imdb_id(&self) -> &str {
        &self.movie.imdb_id
    }
}
