use dotenvy::dotenv;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_PAGE_SIZE: usize = 5;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Environment-derived configuration for the binary. Loaded on first access.
pub static CONFIG: Lazy<Result<Config>> = Lazy::new(Config::from_env);

/// Ranking weights forwarded untouched to the search provider.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RankingOptions {
    pub term_frequency: Option<f64>,
    pub page_length: Option<f64>,
    pub term_saturation: Option<f64>,
    pub term_similarity: Option<f64>,
}

/// Options handed to the provider once, before any query.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProviderOptions {
    pub base_url: String,
    /// Overrides the location of the search bundle relative to `base_url`.
    pub bundle_path: Option<String>,
    pub excerpt_length: Option<u32>,
    pub highlight_param: Option<String>,
    pub ranking: RankingOptions,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        ProviderOptions {
            base_url: DEFAULT_BASE_URL.to_string(),
            bundle_path: None,
            excerpt_length: None,
            highlight_param: None,
            ranking: RankingOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Records rendered per "load more".
    pub page_size: usize,
    /// Delay applied to non-immediate submissions.
    pub debounce: Duration,
    pub provider: ProviderOptions,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            page_size: DEFAULT_PAGE_SIZE,
            debounce: DEFAULT_DEBOUNCE,
            provider: ProviderOptions::default(),
        }
    }
}

impl ControllerConfig {
    pub fn with_page_size(mut self, page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(Error::Config {
                key: "page_size",
                reason: "must be at least 1".to_string(),
            });
        }
        self.page_size = page_size;
        Ok(self)
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

pub struct Config {
    pub controller: ControllerConfig,
}

impl Config {
    pub fn from_env() -> Result<Config> {
        dotenv().ok(); // Load .env file if present
        let mut controller = ControllerConfig::default();

        controller.provider.base_url = get_env_or_default("SEARCH_BASE_URL", DEFAULT_BASE_URL);
        controller.provider.bundle_path = env::var("SEARCH_BUNDLE_PATH").ok();
        controller.provider.excerpt_length = get_env_parsed("SEARCH_EXCERPT_LENGTH")?;

        if let Some(page_size) = get_env_parsed("RESULTS_PAGE_SIZE")? {
            controller = controller.with_page_size(page_size)?;
        }
        if let Some(ms) = get_env_parsed::<u64>("RESULTS_DEBOUNCE_MS")? {
            controller = controller.with_debounce(Duration::from_millis(ms));
        }

        Ok(Config { controller })
    }
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_env_parsed<T>(key: &'static str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|e: T::Err| Error::Config {
            key,
            reason: format!("{raw:?}: {e}"),
        }),
        Err(_) => Ok(None),
    }
}
