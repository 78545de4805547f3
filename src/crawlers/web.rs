use crate::config::FetchConfig;
use crate::crawlers::crawler::PageFetcher;
use crate::error::{CrawlError, FetchError};
use fantoccini::error::CmdError;
use fantoccini::wd::Capabilities;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use url::Url;

/// Local driver endpoints tried when the configured one refuses a session
const FALLBACK_WEBDRIVER_URLS: [&str; 3] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4444", // Selenium / geckodriver default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// Page fetcher backed by a WebDriver browser session.
///
/// One session serves the whole run; pages are loaded one at a time.
pub struct WebDriverFetcher {
    client: Client,
    load_timeout: Duration,
    settle_delay: Duration,
    ready_selector: String,
}

impl WebDriverFetcher {
    /// Opens a browser session at `webdriver_url`, falling back to common
    /// local driver ports
    pub async fn connect(
        webdriver_url: &str,
        headless: bool,
        fetch: &FetchConfig,
    ) -> Result<Self, CrawlError> {
        let client = connect_to_webdriver(webdriver_url, headless).await?;
        Ok(Self {
            client,
            load_timeout: Duration::from_secs(fetch.timeout_secs),
            settle_delay: Duration::from_millis(fetch.settle_delay_ms),
            ready_selector: fetch.ready_selector.clone(),
        })
    }

    /// Ends the browser session
    pub async fn close(self) {
        if let Err(e) = self.client.close().await {
            ::log::warn!("Failed to close WebDriver session: {}", e);
        } else {
            ::log::debug!("WebDriver session closed");
        }
    }
}

impl PageFetcher for WebDriverFetcher {
    async fn fetch(&mut self, url: &Url) -> Result<String, FetchError> {
        let started = Instant::now();
        let secs = self.load_timeout.as_secs();

        match timeout(self.load_timeout, self.client.goto(url.as_str())).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(navigation_error(e, "navigate to", url, secs)),
            Err(_) => {
                return Err(FetchError::Timeout {
                    url: url.to_string(),
                    secs,
                });
            }
        }

        // Rendering is done once the baseline element exists
        self.client
            .wait()
            .at_most(self.load_timeout)
            .for_element(Locator::Css(&self.ready_selector))
            .await
            .map_err(|e| navigation_error(e, "wait for content on", url, secs))?;

        tokio::time::sleep(self.settle_delay).await;

        let html = self
            .client
            .source()
            .await
            .map_err(|e| navigation_error(e, "get source for", url, secs))?;

        ::log::debug!(
            "Loaded {} ({} bytes) in {:.2} seconds",
            url,
            html.len(),
            started.elapsed().as_secs_f64()
        );
        Ok(html)
    }
}

/// Browser capabilities requested for every session
fn capabilities(headless: bool) -> Capabilities {
    let args: Vec<&str> = if headless {
        vec!["--headless", "--disable-gpu"]
    } else {
        Vec::new()
    };
    let mut caps = Capabilities::new();
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    caps
}

async fn try_connect(webdriver_url: &str, headless: bool) -> Result<Client, String> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(capabilities(headless));
    builder.connect(webdriver_url).await.map_err(|e| e.to_string())
}

/// Connects to the WebDriver instance
async fn connect_to_webdriver(webdriver_url: &str, headless: bool) -> Result<Client, CrawlError> {
    let first_error = match try_connect(webdriver_url, headless).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
            e
        }
    };

    for url in FALLBACK_WEBDRIVER_URLS {
        if url == webdriver_url {
            continue;
        }
        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = try_connect(url, headless).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(CrawlError::WebDriver {
        url: webdriver_url.to_string(),
        reason: first_error,
    })
}

/// Maps a WebDriver command failure to a fetch error
fn navigation_error(error: CmdError, context: &str, url: &Url, secs: u64) -> FetchError {
    if matches!(error, CmdError::WaitTimeout) {
        return FetchError::Timeout {
            url: url.to_string(),
            secs,
        };
    }
    if error.to_string().contains("Unable to find session") {
        ::log::warn!("Lost WebDriver session while trying to {} {}", context, url);
    }
    FetchError::Failed {
        url: url.to_string(),
        reason: format!("could not {}: {}", context, error),
    }
}
