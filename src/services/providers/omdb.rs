//! OMDb API provider
//!
//! API Flow:
//! 1. Title Search: `/?s={query}&page={page}` → up to 10 hits + total match count
//! 2. Details: `/?i={imdb_id}` → full record for one title
//!
//! OMDb answers HTTP 200 for misses and signals them with `"Response": "False"`.
use crate::{
    error::{AppError, AppResult},
    models::{DetailOutcome, MovieDetail, OmdbMovieDetail, OmdbSearchResponse, SearchHit, SearchOutcome},
    services::providers::CatalogProvider,
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::instrument;

#[derive(Clone)]
pub struct OmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl OmdbProvider {
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/", self.api_url.trim_end_matches('/'))
    }

    async fn get<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> AppResult<T> {
        let response = self
            .http_client
            .get(self.endpoint())
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "OMDb API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        tracing::debug!(response = %response_text, "Raw OMDb API response");

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                response = %response_text,
                "Failed to deserialize OMDb response"
            );
            AppError::ExternalApi(format!("Failed to parse OMDb response: {}", e))
        })
    }
}

#[async_trait::async_trait]
impl CatalogProvider for OmdbProvider {
    #[instrument(skip(self), fields(provider = "omdb"))]
    async fn search(&self, query: &str, page: u32) -> AppResult<SearchOutcome> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let page = page.max(1).to_string();
        let response: OmdbSearchResponse = self.get(&[("s", query), ("page", page.as_str())]).await?;

        if !response.is_found() {
            tracing::info!(
                query = %query,
                reason = response.error.as_deref().unwrap_or("unknown"),
                "Title search found nothing"
            );
            return Ok(SearchOutcome::NotFound);
        }

        let total_results = response.total_results_count();
        let hits: Vec<SearchHit> = response.search.into_iter().map(SearchHit::from).collect();

        tracing::info!(
            query = %query,
            results = hits.len(),
            total_results,
            "Title search completed"
        );

        Ok(SearchOutcome::Found {
            hits,
            total_results,
        })
    }

    #[instrument(skip(self), fields(provider = "omdb"))]
    async fn fetch_detail(&self, imdb_id: &str) -> AppResult<DetailOutcome> {
        if imdb_id.trim().is_empty() {
            return Err(AppError::InvalidInput("IMDb ID cannot be empty".to_string()));
        }

        let raw: OmdbMovieDetail = self.get(&[("i", imdb_id)]).await?;

        if !raw.is_found() {
            tracing::info!(
                imdb_id = %imdb_id,
                reason = raw.error.as_deref().unwrap_or("unknown"),
                "Title details not found"
            );
            return Ok(DetailOutcome::NotFound);
        }

        let movie = MovieDetail::from(raw);
        tracing::debug!(imdb_id = %imdb_id, title = %movie.title, "Title details fetched");

        Ok(DetailOutcome::Found(movie))
    }

    fn name(&self) -> &'static str {
        "omdb"
    }
}
