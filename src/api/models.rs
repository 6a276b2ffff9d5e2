use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::RankingOptions;
use crate::data_models::{FilterCounts, FilterSelection, SortDirection};

/// Body of `POST /api/search`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// At most one entry: field name to direction.
    #[serde(default)]
    pub sort: BTreeMap<String, SortDirection>,
    #[serde(default)]
    pub filters: FilterSelection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt_length: Option<u32>,
    /// Query parameter the service appends to result urls to highlight terms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_param: Option<String>,
    #[serde(default)]
    pub ranking: RankingOptions,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResults {
    pub results: Vec<PageResult>,
    #[serde(default)]
    pub total_filters: Option<FilterCounts>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PageResult {
    pub id: String,
    #[serde(default)]
    pub score: Option<f64>,
}

/// Body of `GET /api/results/{id}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PageData {
    pub url: String,
    pub meta: PageMeta,
    pub excerpt: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub title: String,
}
