use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use search_results_ui::ResultsController;
use search_results_ui::config::{ControllerConfig, ProviderOptions};
use search_results_ui::data_models::{FilterCounts, ResultRecord, SearchOptions, SearchResponse};
use search_results_ui::provider::{Debounced, ResultHandle, SearchBackend, SearchProvider};
use search_results_ui::view::{FilterGroupFragment, ResultFragment, ResultsView};
use search_results_ui::{Error, Result};

mod test_helpers {
    use super::*;

    #[derive(Debug)]
    pub struct EchoHandle(pub String);

    impl ResultHandle for EchoHandle {
        async fn resolve(&self) -> Result<ResultRecord> {
            Ok(ResultRecord::new(
                format!("/{}/", self.0),
                self.0.clone(),
                String::new(),
            ))
        }
    }

    /// Returns one hit named after the query after `latency`, or fails for
    /// the query named in `failing`.
    #[derive(Default)]
    pub struct EchoBackend {
        pub latency: Duration,
        pub failing: Option<String>,
        pub searches: Mutex<Vec<String>>,
        pub configured: AtomicUsize,
    }

    impl EchoBackend {
        pub fn with_latency(latency: Duration) -> Self {
            EchoBackend {
                latency,
                ..Default::default()
            }
        }

        pub fn searches(&self) -> Vec<String> {
            self.searches.lock().unwrap().clone()
        }
    }

    impl SearchBackend for EchoBackend {
        type Handle = EchoHandle;

        async fn configure(&self, _options: &ProviderOptions) -> Result<()> {
            self.configured.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn list_filters(&self) -> Result<FilterCounts> {
            Ok(FilterCounts::new())
        }

        async fn search(
            &self,
            text: &str,
            _options: &SearchOptions,
        ) -> Result<SearchResponse<EchoHandle>> {
            self.searches.lock().unwrap().push(text.to_string());
            tokio::time::sleep(self.latency).await;
            if self.failing.as_deref() == Some(text) {
                return Err(Error::Provider("backend unavailable".into()));
            }
            Ok(SearchResponse {
                results: vec![EchoHandle(text.to_string())],
                total_filters: None,
            })
        }
    }

    pub fn hit_names(response: Option<SearchResponse<EchoHandle>>) -> Option<Vec<String>> {
        response.map(|r| r.results.into_iter().map(|h| h.0).collect())
    }

    #[derive(Default)]
    pub struct TitlesView {
        pub titles: Mutex<Vec<String>>,
        pub statuses: Mutex<Vec<String>>,
    }

    impl ResultsView for TitlesView {
        fn clear_output(&self) {
            self.titles.lock().unwrap().clear();
        }

        fn append_result(&self, fragment: ResultFragment) {
            self.titles.lock().unwrap().push(fragment.title);
        }

        fn set_status(&self, status: &str) {
            self.statuses.lock().unwrap().push(status.to_string());
        }

        fn set_load_more_visible(&self, _visible: bool) {}

        fn show_filter_groups(&self, _groups: Vec<FilterGroupFragment>) {}

        fn set_facet_count(&self, _group: &str, _facet: &str, _count_label: &str) {}
    }
}

use test_helpers::*;

#[tokio::test]
async fn test_rapid_calls_only_last_wins() {
    let provider = Debounced::new(EchoBackend::default());
    let options = SearchOptions::default();
    let delay = Duration::from_millis(40);

    let (c, ca, cat) = tokio::join!(
        provider.debounced_search("c", &options, delay),
        async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            provider.debounced_search("ca", &options, delay).await
        },
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            provider.debounced_search("cat", &options, delay).await
        },
    );

    assert!(c.unwrap().is_none());
    assert!(ca.unwrap().is_none());
    assert_eq!(hit_names(cat.unwrap()), Some(vec!["cat".to_string()]));
    assert_eq!(provider.backend().searches(), vec!["cat"]);
}

#[tokio::test]
async fn test_spaced_calls_all_answer() {
    let provider = Debounced::new(EchoBackend::default());
    let options = SearchOptions::default();

    for text in ["c", "ca", "cat"] {
        let response = provider
            .debounced_search(text, &options, Duration::from_millis(5))
            .await
            .unwrap();
        assert_eq!(hit_names(response), Some(vec![text.to_string()]));
    }
}

#[tokio::test]
async fn test_immediate_call_supersedes_pending_delay() {
    let provider = Debounced::new(EchoBackend::default());
    let options = SearchOptions::default();

    let (typed, toggled) = tokio::join!(
        provider.debounced_search("cat", &options, Duration::from_millis(50)),
        async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            provider.debounced_search("cat", &options, Duration::ZERO).await
        },
    );

    assert!(typed.unwrap().is_none());
    assert!(toggled.unwrap().is_some());
}

#[tokio::test]
async fn test_superseded_while_backend_in_flight() {
    let provider = Debounced::new(EchoBackend::with_latency(Duration::from_millis(40)));
    let options = SearchOptions::default();

    let (first, second) = tokio::join!(
        provider.debounced_search("dog", &options, Duration::ZERO),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            provider.debounced_search("cat", &options, Duration::ZERO).await
        },
    );

    assert!(first.unwrap().is_none());
    assert_eq!(hit_names(second.unwrap()), Some(vec!["cat".to_string()]));
    assert_eq!(provider.backend().searches(), vec!["dog", "cat"]);
}

#[tokio::test]
async fn test_superseded_failure_stays_silent() {
    let provider = Debounced::new(EchoBackend {
        failing: Some("dog".to_string()),
        ..EchoBackend::with_latency(Duration::from_millis(40))
    });
    let options = SearchOptions::default();

    let (first, second) = tokio::join!(
        provider.debounced_search("dog", &options, Duration::ZERO),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            provider.debounced_search("cat", &options, Duration::ZERO).await
        },
    );

    assert!(first.unwrap().is_none());
    assert_eq!(hit_names(second.unwrap()), Some(vec!["cat".to_string()]));
}

#[tokio::test]
async fn test_current_failure_is_reported() {
    let provider = Debounced::new(EchoBackend {
        failing: Some("dog".to_string()),
        ..Default::default()
    });

    let err = provider
        .debounced_search("dog", &SearchOptions::default(), Duration::ZERO)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Provider(_)));
}

#[tokio::test]
async fn test_configure_and_filters_pass_through() {
    let provider = Debounced::new(EchoBackend::default());
    provider.configure(&ProviderOptions::default()).await.unwrap();
    assert_eq!(provider.backend().configured.load(Ordering::SeqCst), 1);
    assert!(provider.list_filters().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_controller_renders_only_final_keystroke() {
    let config = ControllerConfig::default().with_debounce(Duration::from_millis(30));
    let controller = ResultsController::new(
        Debounced::new(EchoBackend::default()),
        TitlesView::default(),
        config,
    );
    controller.start().await.unwrap();

    let (a, b, c) = tokio::join!(
        controller.on_search_input("c"),
        async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            controller.on_search_input("ca").await
        },
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            controller.on_search_input("cat").await
        },
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    let view = controller.view();
    assert_eq!(*view.titles.lock().unwrap(), vec!["cat".to_string()]);
    assert_eq!(
        *view.statuses.lock().unwrap(),
        vec!["1 results for cat".to_string()]
    );
    assert_eq!(controller.input_text().await, "cat");
}
