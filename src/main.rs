use clap::Parser;
use std::process::ExitCode;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if config.seeds.is_empty() {
        ::log::warn!("No seed URLs given; the output will contain headers only");
    }
    ::log::info!(
        "Starting crawl of {} seed(s), max depth {}",
        config.seeds.len(),
        config.max_depth
    );

    let start_time = std::time::Instant::now();
    match entity_crawl::run(&config).await {
        Ok(summary) => {
            ::log::info!(
                "Crawl finished in {:.2} seconds: {} seed(s) crawled, {} skipped, {} page(s) fetched, {} failed, {} record(s)",
                start_time.elapsed().as_secs_f64(),
                summary.seeds_crawled,
                summary.seeds_skipped,
                summary.pages_fetched,
                summary.fetch_failures,
                summary.records
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            ::log::error!("Crawl failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
