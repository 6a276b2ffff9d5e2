//! JSON-over-HTTP search backend.

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::config::ProviderOptions;
use crate::data_models::{FilterCounts, ResultRecord, SearchOptions, SearchResponse};
use crate::error::{Error, Result};
use crate::provider::{ResultHandle, SearchBackend};

pub mod models;

use models::{PageData, SearchRequest, SearchResults};

pub struct HttpSearchBackend {
    client: Client,
    options: RwLock<ProviderOptions>,
}

impl HttpSearchBackend {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            options: RwLock::new(ProviderOptions::default()),
        }
    }

    async fn endpoint(&self, path: &str) -> Result<Url> {
        let options = self.options.read().await;
        endpoint(&options, path)
    }
}

impl Default for HttpSearchBackend {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

/// Resolves `path` against `base_url`, then `bundle_path` when one is set.
pub fn endpoint(options: &ProviderOptions, path: &str) -> Result<Url> {
    let mut root = parse_dir(&options.base_url, "base_url")?;
    if let Some(bundle) = &options.bundle_path {
        root = root
            .join(&with_trailing_slash(bundle.trim_start_matches('/')))
            .map_err(|e| Error::Config {
                key: "bundle_path",
                reason: e.to_string(),
            })?;
    }
    root.join(path).map_err(|e| Error::Config {
        key: "base_url",
        reason: e.to_string(),
    })
}

/// Appends `id` as a single percent-encoded path segment, so ids holding
/// `/`, `?`, `#` or a full url never leave the results endpoint.
pub fn result_url(results_root: &Url, id: &str) -> Result<Url> {
    let mut url = results_root.clone();
    url.path_segments_mut()
        .map_err(|_| Error::Config {
            key: "base_url",
            reason: format!("{results_root} cannot hold result paths"),
        })?
        .pop_if_empty()
        .push(id);
    Ok(url)
}

fn parse_dir(raw: &str, key: &'static str) -> Result<Url> {
    Url::parse(&with_trailing_slash(raw)).map_err(|e| Error::Config {
        key,
        reason: format!("{raw:?}: {e}"),
    })
}

fn with_trailing_slash(s: &str) -> String {
    if s.ends_with('/') {
        s.to_string()
    } else {
        format!("{s}/")
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Status {
            status,
            url: response.url().to_string(),
        });
    }
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

pub struct HttpResultHandle {
    client: Client,
    url: Url,
}

impl HttpResultHandle {
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl ResultHandle for HttpResultHandle {
    async fn resolve(&self) -> Result<ResultRecord> {
        let response = self.client.get(self.url.clone()).send().await?;
        let data: PageData = read_json(response).await?;
        Ok(ResultRecord::new(data.url, data.meta.title, data.excerpt))
    }
}

impl SearchBackend for HttpSearchBackend {
    type Handle = HttpResultHandle;

    async fn configure(&self, options: &ProviderOptions) -> Result<()> {
        // Fail fast on unusable locations.
        endpoint(options, "api/")?;
        log::info!("search backend configured for {}", options.base_url);
        *self.options.write().await = options.clone();
        Ok(())
    }

    async fn list_filters(&self) -> Result<FilterCounts> {
        let url = self.endpoint("api/filters").await?;
        let response = self.client.get(url).send().await?;
        read_json(response).await
    }

    async fn search(
        &self,
        text: &str,
        options: &SearchOptions,
    ) -> Result<SearchResponse<HttpResultHandle>> {
        let (url, request) = {
            let provider = self.options.read().await;
            let request = SearchRequest {
                query: text.to_string(),
                sort: options
                    .sort
                    .iter()
                    .map(|s| (s.field.clone(), s.direction))
                    .collect(),
                filters: options.filters.clone(),
                excerpt_length: provider.excerpt_length,
                highlight_param: provider.highlight_param.clone(),
                ranking: provider.ranking.clone(),
            };
            (endpoint(&provider, "api/search")?, request)
        };

        let response = self.client.post(url).json(&request).send().await?;
        let found: SearchResults = read_json(response).await?;
        log::debug!("{} hits for {text:?}", found.results.len());

        let results_root = self.endpoint("api/results/").await?;
        let results = found
            .results
            .into_iter()
            .map(|page| {
                Ok(HttpResultHandle {
                    client: self.client.clone(),
                    url: result_url(&results_root, &page.id)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(SearchResponse {
            results,
            total_filters: found.total_filters,
        })
    }
}
