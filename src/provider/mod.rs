//! The contract between the controller and an external search library.

use std::future::Future;
use std::time::Duration;

use crate::config::ProviderOptions;
use crate::data_models::{FilterCounts, ResultRecord, SearchOptions, SearchResponse};
use crate::error::Result;

pub mod debounce;

pub use debounce::Debounced;

/// Lazily-resolved reference to one matched document. Only valid for the query that produced it.
pub trait ResultHandle: Send + Sync {
    fn resolve(&self) -> impl Future<Output = Result<ResultRecord>> + Send;
}

/// A search library that debounces queries itself.
///
/// `debounced_search` must resolve to `Ok(None)` when a newer call superseded
/// this one; the controller relies on that to never render a stale response.
pub trait SearchProvider: Send + Sync {
    type Handle: ResultHandle;

    fn configure(&self, options: &ProviderOptions) -> impl Future<Output = Result<()>> + Send;

    fn list_filters(&self) -> impl Future<Output = Result<FilterCounts>> + Send;

    fn debounced_search(
        &self,
        text: &str,
        options: &SearchOptions,
        delay: Duration,
    ) -> impl Future<Output = Result<Option<SearchResponse<Self::Handle>>>> + Send;
}

/// A search library without debouncing. Wrap it in [`Debounced`] to get a [`SearchProvider`].
pub trait SearchBackend: Send + Sync {
    type Handle: ResultHandle;

    fn configure(&self, options: &ProviderOptions) -> impl Future<Output = Result<()>> + Send;

    fn list_filters(&self) -> impl Future<Output = Result<FilterCounts>> + Send;

    fn search(
        &self,
        text: &str,
        options: &SearchOptions,
    ) -> impl Future<Output = Result<SearchResponse<Self::Handle>>> + Send;
}
