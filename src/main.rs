use std::time::Duration;

use anyhow::anyhow;
use clap::Parser;
use once_cell::sync::Lazy;
use tokio::io::{AsyncBufReadExt, BufReader};

use search_results_ui::ResultsController;
use search_results_ui::api::HttpSearchBackend;
use search_results_ui::config::CONFIG;
use search_results_ui::provider::Debounced;
use search_results_ui::terminal::{Command, TerminalView};

/// Browse paginated search results from a search service.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Initial search text
    query: Option<String>,

    /// Search service root, overrides SEARCH_BASE_URL
    #[arg(long)]
    base_url: Option<String>,

    /// Results per page, overrides RESULTS_PAGE_SIZE
    #[arg(long)]
    page_size: Option<usize>,

    /// Debounce for typed searches in milliseconds, overrides RESULTS_DEBOUNCE_MS
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// Initial sort, e.g. `date` or `date:asc`
    #[arg(long)]
    sort: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Also captures `log` records from the library.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Lazy::force(&CONFIG).as_ref().map_err(|e| anyhow!("{e}"))?;

    let mut controller_config = config.controller.clone();
    if let Some(base_url) = args.base_url {
        controller_config.provider.base_url = base_url;
    }
    if let Some(page_size) = args.page_size {
        controller_config = controller_config.with_page_size(page_size)?;
    }
    if let Some(ms) = args.debounce_ms {
        controller_config = controller_config.with_debounce(Duration::from_millis(ms));
    }

    let provider = Debounced::new(HttpSearchBackend::default());
    let controller = ResultsController::new(provider, TerminalView::new(), controller_config);

    if let Some(query) = &args.query {
        controller.set_input_text(query).await;
    }
    if let Some(sort) = &args.sort {
        controller.select_sort(Some(sort)).await?;
    }
    controller.start().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        let outcome = match command {
            Command::Search(text) => controller.on_search_submit(&text).await,
            Command::More => controller.on_load_more().await,
            Command::Sort(selection) => controller.on_sort_change(selection.as_deref()).await,
            Command::Filter {
                group,
                value,
                selected,
            } => controller.on_filter_change(&group, &value, selected).await,
            Command::Filters => {
                controller.view().print_filters();
                Ok(())
            }
            Command::Quit => break,
        };
        if let Err(e) = outcome {
            tracing::error!("{:#}", anyhow::Error::from(e));
        }
    }
    Ok(())
}
