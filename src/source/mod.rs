//! Job listing sources.
//!
//! The aggregator only depends on the [`JobSource`] trait, so it can be
//! driven by the real search API client or by an in-memory source.

pub mod jsearch;

pub use jsearch::{JSearchClient, SearchClientConfig};

use crate::error::FetchError;
use crate::models::{JobRecord, SearchQuery};
use async_trait::async_trait;

/// A paginated source of job postings.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Fetch one page of records for a query.
    async fn fetch_page(&self, query: &SearchQuery) -> Result<Vec<JobRecord>, FetchError>;
}
