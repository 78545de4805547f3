use clap::Parser;
use entity_crawl::{ConfigError, CrawlerConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "entity-crawl")]
#[command(about = "Extracts entity profile records from paginated, script-rendered listings")]
#[command(version)]
pub struct Args {
    /// Seed listing URLs to crawl (appended to any seeds from --config)
    pub seeds: Vec<String>,

    /// Path to a JSON crawler configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Maximum nested-link depth below each listing page [default: 2]
    #[arg(short = 'd', long)]
    pub max_depth: Option<usize>,

    /// CSV file to write [default: extracted_data.csv]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// WebDriver server URL (overrides WEBDRIVER_URL)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Show the browser window instead of running headless
    #[arg(long)]
    pub no_headless: bool,
}

impl Args {
    /// Builds the run configuration: defaults, then the config file, then
    /// `WEBDRIVER_URL`, then command-line flags
    pub fn into_config(self) -> Result<CrawlerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => CrawlerConfig::from_file(path)?,
            None => CrawlerConfig::default(),
        };

        // Override the WebDriver URL with an environment variable if provided
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                config.webdriver_url = webdriver_url;
            }
        }

        config.seeds.extend(self.seeds);
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        if let Some(output) = self.output {
            config.output_path = output;
        }
        if let Some(webdriver_url) = self.webdriver_url {
            config.webdriver_url = webdriver_url;
        }
        if self.no_headless {
            config.headless = false;
        }

        config.validate()?;
        Ok(config)
    }
}
