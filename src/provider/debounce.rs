use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::config::ProviderOptions;
use crate::data_models::{FilterCounts, SearchOptions, SearchResponse};
use crate::error::Result;

use super::{SearchBackend, SearchProvider};

/// Turns a [`SearchBackend`] into a "last call wins" [`SearchProvider`].
///
/// Every call takes a ticket. A call whose ticket is no longer the latest,
/// either after its delay or after the backend answers, resolves to `None`.
pub struct Debounced<B> {
    backend: B,
    latest: AtomicU64,
}

impl<B: SearchBackend> Debounced<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            latest: AtomicU64::new(0),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }
}

impl<B: SearchBackend> SearchProvider for Debounced<B> {
    type Handle = B::Handle;

    async fn configure(&self, options: &ProviderOptions) -> Result<()> {
        self.backend.configure(options).await
    }

    async fn list_filters(&self) -> Result<FilterCounts> {
        self.backend.list_filters().await
    }

    async fn debounced_search(
        &self,
        text: &str,
        options: &SearchOptions,
        delay: Duration,
    ) -> Result<Option<SearchResponse<Self::Handle>>> {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if !self.is_current(ticket) {
            log::debug!("search for {text:?} superseded during debounce");
            return Ok(None);
        }

        let response = self.backend.search(text, options).await;
        if !self.is_current(ticket) {
            // A superseded call stays silent even when its backend failed.
            log::debug!("search for {text:?} superseded while in flight");
            return Ok(None);
        }
        response.map(Some)
    }
}
