use serde::{Deserialize, Serialize};

pub mod omdb;
pub mod watched;

pub use omdb::{OmdbMovieDetail, OmdbSearchHit, OmdbSearchResponse};
pub use watched::{Rating, WatchedRecord};

/// Number of hits the catalog returns per search page
pub const PAGE_SIZE: u32 = 10;

const WATCH_SEARCH_URL: &str = "https://www.google.com/search";

/// Lightweight search result entry, replaced on every search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchHit {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster: Option<String>,
}

impl SearchHit {
    /// A hit needs an id, title and year before its details can be looked up
    pub fn is_well_formed(&self) -> bool {
        !self.imdb_id.trim().is_empty()
            && !self.title.trim().is_empty()
            && !self.year.trim().is_empty()
    }
}

/// Full catalog record for one title
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetail {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub rated: Option<String>,
    pub released: Option<String>,
    pub runtime: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub director: Option<String>,
    pub actors: Option<String>,
    pub plot: Option<String>,
    pub poster: Option<String>,
    pub imdb_rating: Option<String>,
    pub box_office: Option<String>,
}

impl MovieDetail {
    /// Web search link for finding somewhere to stream the title
    pub fn watch_link(&self) -> String {
        let query = format!("watch {} movie online", self.title);
        reqwest::Url::parse_with_params(WATCH_SEARCH_URL, &[("q", query.as_str())])
            .map(|url| url.to_string())
            .unwrap_or_else(|_| WATCH_SEARCH_URL.to_string())
    }
}

/// Result of a catalog search call
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found {
        hits: Vec<SearchHit>,
        total_results: u32,
    },
    NotFound,
}

/// Result of a catalog detail call
#[derive(Debug, Clone, PartialEq)]
pub enum DetailOutcome {
    Found(MovieDetail),
    NotFound,
}

/// Current position in a paginated result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageState {
    pub current_page: u32,
    pub total_pages: u32,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 0,
        }
    }
}
