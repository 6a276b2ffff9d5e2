use std::collections::{BTreeSet, VecDeque};
use std::time::Duration;

use futures::future::try_join_all;
use tokio::sync::Mutex;

use crate::config::ControllerConfig;
use crate::data_models::{FilterCounts, FilterSelection, Query, SearchOptions, SortDirective};
use crate::error::Result;
use crate::provider::{ResultHandle, SearchProvider};
use crate::view::{self, ResultFragment, ResultsView};

struct ControllerState<H> {
    input: String,
    sort: Option<SortDirective>,
    filters: FilterSelection,
    /// `None` until a query answers, and again once every handle was taken.
    pending: Option<VecDeque<H>>,
    facets: FilterCounts,
    /// Facet rows the view was given at start-up; only these get count updates.
    facet_rows: BTreeSet<(String, String)>,
    /// Bumped for every accepted response.
    generation: u64,
    page_in_flight: Option<u64>,
}

impl<H> ControllerState<H> {
    fn new() -> Self {
        Self {
            input: String::new(),
            sort: None,
            filters: FilterSelection::new(),
            pending: None,
            facets: FilterCounts::new(),
            facet_rows: BTreeSet::new(),
            generation: 0,
            page_in_flight: None,
        }
    }

    fn query(&self, text: &str) -> Query {
        Query {
            text: text.to_string(),
            options: SearchOptions {
                sort: self.sort.clone(),
                filters: self.filters.clone(),
            },
        }
    }

    /// Pops the next page off the pending buffer and marks it in flight.
    fn take_page(&mut self, page_size: usize) -> Option<(Vec<H>, u64)> {
        let pending = self.pending.as_mut()?;
        let take = pending.len().min(page_size);
        let page: Vec<H> = pending.drain(..take).collect();
        if pending.is_empty() {
            self.pending = None;
        }
        self.page_in_flight = Some(self.generation);
        Some((page, self.generation))
    }

    fn has_more(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| !p.is_empty())
    }
}

/// Owns the query, sort and filter selection, and the pending buffer for one
/// results page, and renders pages of hits through a [`ResultsView`].
pub struct ResultsController<P: SearchProvider, V: ResultsView> {
    provider: P,
    view: V,
    config: ControllerConfig,
    state: Mutex<ControllerState<P::Handle>>,
}

impl<P: SearchProvider, V: ResultsView> ResultsController<P, V> {
    pub fn new(provider: P, view: V, config: ControllerConfig) -> Self {
        Self {
            provider,
            view,
            config,
            state: Mutex::new(ControllerState::new()),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Configures the provider, publishes the initial filter groups, and runs
    /// the search input's current text, if any.
    pub async fn start(&self) -> Result<()> {
        self.provider.configure(&self.config.provider).await?;

        let facets = self.provider.list_filters().await?;
        log::info!("loaded {} filter groups", facets.len());
        let input = {
            let mut state = self.state.lock().await;
            for (group, values) in &facets {
                state.filters.ensure_group(group);
                for facet in values.keys() {
                    state.facet_rows.insert((group.clone(), facet.clone()));
                }
            }
            state.facets = facets;
            if !state.facets.is_empty() {
                self.view.show_filter_groups(view::filter_groups(&state.facets));
            }
            state.input.clone()
        };

        if !input.is_empty() {
            self.submit_query(&input, true).await?;
        }
        Ok(())
    }

    /// Runs `text` with the current sort and filters. Superseded calls leave
    /// every piece of state untouched.
    pub async fn submit_query(&self, text: &str, immediate: bool) -> Result<()> {
        let query = self.state.lock().await.query(text);
        let delay = if immediate {
            Duration::ZERO
        } else {
            self.config.debounce
        };

        let Some(response) = self
            .provider
            .debounced_search(&query.text, &query.options, delay)
            .await?
        else {
            log::debug!("dropping superseded response for {text:?}");
            return Ok(());
        };

        let page = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            state.generation += 1;
            let count = response.results.len();
            state.pending = Some(response.results.into());

            if let Some(totals) = response.total_filters {
                state.facets = totals;
                self.publish_facet_counts(state);
            }
            self.view.set_status(&view::status_line(count, text));
            log::debug!("query {text:?} accepted with {count} results");
            state.take_page(self.config.page_size)
        };

        match page {
            Some((handles, generation)) => self.render_page(handles, generation, true).await,
            None => Ok(()),
        }
    }

    /// Renders the next page of the pending buffer. Ignored when nothing is
    /// pending or a page for the current query is already resolving.
    pub async fn load_more(&self, clear_first: bool) -> Result<()> {
        let page = {
            let mut state = self.state.lock().await;
            if !clear_first && state.page_in_flight == Some(state.generation) {
                log::debug!("load more ignored, a page is still resolving");
                return Ok(());
            }
            state.take_page(self.config.page_size)
        };

        match page {
            Some((handles, generation)) => {
                self.render_page(handles, generation, clear_first).await
            }
            None => Ok(()),
        }
    }

    pub async fn toggle_filter(&self, group: &str, value: &str, selected: bool) -> Result<()> {
        let input = {
            let mut state = self.state.lock().await;
            state.filters.set(group, value, selected);
            state.input.clone()
        };
        self.submit_query(&input, true).await
    }

    /// `None` means no sort control is active.
    pub async fn set_sort(&self, selection: Option<&str>) -> Result<()> {
        self.select_sort(selection).await?;
        let input = self.input_text().await;
        self.submit_query(&input, true).await
    }

    /// Updates the sort selection without running a query. An empty value
    /// counts as no active sort control.
    pub async fn select_sort(&self, selection: Option<&str>) -> Result<()> {
        let sort = selection
            .filter(|value| !value.is_empty())
            .map(SortDirective::parse)
            .transpose()?;
        self.state.lock().await.sort = sort;
        Ok(())
    }

    pub async fn on_search_input(&self, text: &str) -> Result<()> {
        self.set_input_text(text).await;
        self.submit_query(text, false).await
    }

    pub async fn on_search_change(&self, text: &str) -> Result<()> {
        self.on_search_input(text).await
    }

    /// A finished search text, e.g. a line entered at a prompt. Runs without debounce.
    pub async fn on_search_submit(&self, text: &str) -> Result<()> {
        self.set_input_text(text).await;
        self.submit_query(text, true).await
    }

    pub async fn on_load_more(&self) -> Result<()> {
        self.load_more(false).await
    }

    pub async fn on_sort_change(&self, selection: Option<&str>) -> Result<()> {
        self.set_sort(selection).await
    }

    pub async fn on_filter_change(&self, group: &str, value: &str, checked: bool) -> Result<()> {
        self.toggle_filter(group, value, checked).await
    }

    /// Updates the search input without running a query.
    pub async fn set_input_text(&self, text: &str) {
        self.state.lock().await.input = text.to_string();
    }

    pub async fn input_text(&self) -> String {
        self.state.lock().await.input.clone()
    }

    pub async fn sort(&self) -> Option<SortDirective> {
        self.state.lock().await.sort.clone()
    }

    pub async fn filters(&self) -> FilterSelection {
        self.state.lock().await.filters.clone()
    }

    pub async fn facet_counts(&self) -> FilterCounts {
        self.state.lock().await.facets.clone()
    }

    /// Handles not rendered yet, or `None` when the buffer is absent.
    pub async fn pending_len(&self) -> Option<usize> {
        self.state.lock().await.pending.as_ref().map(VecDeque::len)
    }

    async fn render_page(
        &self,
        handles: Vec<P::Handle>,
        generation: u64,
        clear_first: bool,
    ) -> Result<()> {
        // try_join_all keeps input order whatever order the handles finish in.
        let resolved = try_join_all(handles.iter().map(|h| h.resolve())).await;

        let mut state = self.state.lock().await;
        if state.page_in_flight == Some(generation) {
            state.page_in_flight = None;
        }
        let records = resolved?;

        if state.generation != generation {
            log::warn!(
                "dropping {} records from a superseded query",
                records.len()
            );
            return Ok(());
        }

        if clear_first {
            self.view.clear_output();
        }
        for record in records {
            self.view.append_result(ResultFragment::from(record));
        }
        self.view.set_load_more_visible(state.has_more());
        Ok(())
    }

    fn publish_facet_counts(&self, state: &ControllerState<P::Handle>) {
        for (group, facets) in &state.facets {
            for (facet, count) in facets {
                if state.facet_rows.contains(&(group.clone(), facet.clone())) {
                    self.view
                        .set_facet_count(group, facet, &view::count_label(*count));
                } else {
                    log::debug!("no filter row for {group}/{facet}, count not shown");
                }
            }
        }
    }
}
