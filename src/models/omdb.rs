// ============================================================================
// OMDb API Types
// ============================================================================

use serde::Deserialize;

use super::{MovieDetail, SearchHit};

/// Placeholder OMDb uses for fields it has no value for
const NOT_APPLICABLE: &str = "N/A";

/// Raw response from `GET /?s={query}&page={page}`
#[derive(Debug, Clone, Deserialize)]
pub struct OmdbSearchResponse {
    #[serde(rename = "Search", default)]
    pub search: Vec<OmdbSearchHit>,
    #[serde(rename = "totalResults", default)]
    pub total_results: Option<String>,
    #[serde(rename = "Response")]
    pub response: String,
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
}

impl OmdbSearchResponse {
    pub fn is_found(&self) -> bool {
        is_true(&self.response)
    }

    /// Total match count across all pages; unparseable counts read as zero
    pub fn total_results_count(&self) -> u32 {
        self.total_results
            .as_deref()
            .and_then(|count| count.trim().parse().ok())
            .unwrap_or(0)
    }
}

/// One entry of the `Search` array
#[derive(Debug, Clone, Deserialize)]
pub struct OmdbSearchHit {
    #[serde(rename = "imdbID", default)]
    pub imdb_id: String,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Poster", default)]
    pub poster: Option<String>,
}

impl From<OmdbSearchHit> for SearchHit {
    fn from(hit: OmdbSearchHit) -> Self {
        SearchHit {
            imdb_id: hit.imdb_id,
            title: hit.title,
            year: hit.year,
            poster: applicable(hit.poster),
        }
    }
}

/// Raw response from `GET /?i={imdb_id}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbMovieDetail {
    pub response: String,
    #[serde(rename = "imdbID", default)]
    pub imdb_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub rated: Option<String>,
    #[serde(default)]
    pub released: Option<String>,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub actors: Option<String>,
    #[serde(default)]
    pub plot: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: Option<String>,
    #[serde(default)]
    pub box_office: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl OmdbMovieDetail {
    pub fn is_found(&self) -> bool {
        is_true(&self.response)
    }
}

impl From<OmdbMovieDetail> for MovieDetail {
    fn from(raw: OmdbMovieDetail) -> Self {
        let genres = applicable(raw.genre)
            .map(|genre| {
                genre
                    .split(',')
                    .map(str::trim)
                    .filter(|g| !g.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        MovieDetail {
            imdb_id: raw.imdb_id,
            title: raw.title,
            year: raw.year,
            rated: applicable(raw.rated),
            released: applicable(raw.released),
            runtime: applicable(raw.runtime),
            genres,
            director: applicable(raw.director),
            actors: applicable(raw.actors),
            plot: applicable(raw.plot),
            poster: applicable(raw.poster),
            imdb_rating: applicable(raw.imdb_rating),
            box_office: applicable(raw.box_office),
        }
    }
}

fn is_true(response: &str) -> bool {
    response.eq_ignore_ascii_case("true")
}

fn applicable(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty() && v != NOT_APPLICABLE)
}
