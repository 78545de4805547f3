//! Entity profile crawler.
//!
//! Walks paginated listing pages rendered by a WebDriver browser, follows
//! profile links up to a fixed depth, extracts entity fields with a
//! first-match-wins rule set and writes everything as one CSV table.

pub mod config;
pub mod crawlers;
pub mod error;
pub mod extract;
pub mod filter;
pub mod parsers;
pub mod results;
pub mod rules;

// Re-export commonly used types for convenience
pub use config::CrawlerConfig;
pub use crawlers::{CrawlSummary, PageFetcher, PaginationDelay, TraversalEngine};
pub use error::{ConfigError, CrawlError, FetchError, SinkError};
pub use filter::is_valid_url;
pub use results::{EntityRecord, ResultTable};
pub use rules::{Field, RuleSet};

use crawlers::{JitterDelay, WebDriverFetcher};
use filter::LinkScope;

/// Crawls the configured seeds with `fetcher` and writes the flattened table
/// to `config.output_path`.
///
/// Fetch failures are absorbed by the engine; only configuration and sink
/// errors surface here. Pass `&mut fetcher` to keep ownership of a fetcher
/// that needs releasing afterwards.
pub async fn crawl_and_write<F, D>(
    config: &CrawlerConfig,
    fetcher: F,
    delay: D,
) -> Result<CrawlSummary, CrawlError>
where
    F: PageFetcher,
    D: PaginationDelay,
{
    config.validate()?;
    let scope = LinkScope::new(&config.links)?;

    let mut engine = TraversalEngine::new(fetcher, delay, config.rules.clone(), scope)
        .with_max_depth(config.max_depth)
        .with_pagination_label(config.pagination.label.clone());
    engine.crawl(&config.seeds).await;

    let (_, results, summary) = engine.into_parts();
    ::log::info!("Crawling complete. Saving data...");
    results.flatten_and_write(&config.output_path)?;
    Ok(summary)
}

/// Runs a full crawl in a WebDriver browser session
pub async fn run(config: &CrawlerConfig) -> Result<CrawlSummary, CrawlError> {
    config.validate()?;

    let mut fetcher =
        WebDriverFetcher::connect(&config.webdriver_url, config.headless, &config.fetch).await?;
    let delay = JitterDelay::from_millis(
        config.pagination.min_delay_ms,
        config.pagination.max_delay_ms,
    );

    let result = crawl_and_write(config, &mut fetcher, delay).await;
    fetcher.close().await;
    result
}
