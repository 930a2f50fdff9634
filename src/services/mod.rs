pub mod debounce;
pub mod enricher;
pub mod paginator;
pub mod providers;
pub mod query;
pub mod review;

pub use debounce::Debouncer;
pub use enricher::{DetailEnricher, DetailState};
pub use paginator::{total_pages_for, PaginationControls};
pub use providers::{CatalogProvider, OmdbProvider};
pub use query::{QueryController, SearchEvent, SearchSnapshot, DEFAULT_DEBOUNCE};
pub use review::{ReviewSession, SubmitOutcome, WatchStatus};
