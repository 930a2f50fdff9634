//! Movie catalog provider abstraction
//!
//! The search core only talks to the catalog through this trait, so the
//! OMDb client can be swapped for a scripted catalog in tests.
use crate::{
    error::AppResult,
    models::{DetailOutcome, SearchOutcome},
};

pub mod omdb;

pub use omdb::OmdbProvider;

/// Trait for remote movie catalogs
///
/// Both calls distinguish "the catalog answered but had nothing" (`NotFound`)
/// from transport failures (`Err`). Callers decide whether that distinction
/// matters to them.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Search titles by free text, one 1-based page at a time
    async fn search(&self, query: &str, page: u32) -> AppResult<SearchOutcome>;

    /// Fetch the full record for one external id
    async fn fetch_detail(&self, imdb_id: &str) -> AppResult<DetailOutcome>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
