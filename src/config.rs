use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::crawlers::engine::{DEFAULT_MAX_DEPTH, DEFAULT_PAGINATION_LABEL};
use crate::error::ConfigError;
use crate::filter::{LinkScope, LinkScopeConfig};
use crate::rules::RuleSet;

/// Configuration for one crawl run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Listing pages to start from
    #[serde(default)]
    pub seeds: Vec<String>,

    /// Maximum nested-link depth below each listing page
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// CSV file the result table is written to
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Run the browser without a window
    #[serde(default = "default_headless")]
    pub headless: bool,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub links: LinkScopeConfig,

    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Per-field rule overrides; fields not listed keep the built-in rules
    #[serde(default, deserialize_with = "deserialize_rules")]
    pub rules: RuleSet,
}

/// How pages are loaded by the browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Upper bound for navigation and for the readiness wait
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra time given to client-side scripts after the page is ready
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// CSS selector whose presence means the page has rendered
    #[serde(default = "default_ready_selector")]
    pub ready_selector: String,
}

/// How pagination controls are found and followed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Visible text of the control
    #[serde(default = "default_pagination_label")]
    pub label: String,

    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_output_path() -> PathBuf {
    PathBuf::from("extracted_data.csv")
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_settle_delay_ms() -> u64 {
    2000
}

fn default_ready_selector() -> String {
    "body".to_string()
}

fn default_pagination_label() -> String {
    DEFAULT_PAGINATION_LABEL.to_string()
}

fn default_min_delay_ms() -> u64 {
    2000
}

fn default_max_delay_ms() -> u64 {
    5000
}

/// Reads a partial rule set and lays it over the defaults
fn deserialize_rules<'de, D>(deserializer: D) -> Result<RuleSet, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let overrides = RuleSet::deserialize(deserializer)?;
    Ok(RuleSet::default().merged_with(overrides))
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            settle_delay_ms: default_settle_delay_ms(),
            ready_selector: default_ready_selector(),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            label: default_pagination_label(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seeds: Vec::new(),
            max_depth: default_max_depth(),
            output_path: default_output_path(),
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
            fetch: FetchConfig::default(),
            links: LinkScopeConfig::default(),
            pagination: PaginationConfig::default(),
            rules: RuleSet::default(),
        }
    }
}

impl CrawlerConfig {
    /// Create a configuration for the given seeds with default values
    pub fn new(seeds: Vec<String>) -> Self {
        Self {
            seeds,
            ..Self::default()
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Checks the settings that can only fail at run time.
    /// Seeds are not checked here; invalid ones are skipped during the crawl.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pagination.min_delay_ms > self.pagination.max_delay_ms {
            return Err(ConfigError::InvalidDelay {
                min_ms: self.pagination.min_delay_ms,
                max_ms: self.pagination.max_delay_ms,
            });
        }
        LinkScope::new(&self.links)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{AttrFilter, Field, Rule};

    #[test]
    fn test_defaults() {
        let config = CrawlerConfig::from_json("{}").unwrap();
        assert!(config.seeds.is_empty());
        assert_eq!(config.max_depth, 2);
        assert_eq!(config.output_path, PathBuf::from("extracted_data.csv"));
        assert_eq!(config.webdriver_url, "http://localhost:4444");
        assert!(config.headless);
        assert_eq!(config.fetch, FetchConfig::default());
        assert_eq!(config.fetch.timeout_secs, 20);
        assert_eq!(config.links.path_prefix, "/members/profile");
        assert_eq!(config.pagination.label, "Next");
        assert_eq!(config.rules, RuleSet::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_overrides() {
        let config = CrawlerConfig::from_json(
            r#"{
                "seeds": ["https://example.org/list"],
                "max_depth": 1,
                "links": { "base_origin": "https://example.org" },
                "pagination": { "label": "Older" },
                "rules": { "Name": [ { "kind": "element", "tag": "h1" } ] }
            }"#,
        )
        .unwrap();

        assert_eq!(config.seeds, vec!["https://example.org/list"]);
        assert_eq!(config.max_depth, 1);
        assert_eq!(config.links.base_origin, "https://example.org");
        assert_eq!(config.links.path_prefix, "/members/profile");
        assert_eq!(config.pagination.label, "Older");
        assert_eq!(config.pagination.max_delay_ms, 5000);
        assert_eq!(
            config.rules.rules_for(Field::Name),
            &[Rule::element("h1", AttrFilter::Any)]
        );
        assert_eq!(
            config.rules.rules_for(Field::Images),
            RuleSet::default().rules_for(Field::Images)
        );
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let mut config = CrawlerConfig::default();
        config.pagination.min_delay_ms = 6000;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDelay { min_ms: 6000, max_ms: 5000 })
        ));

        let mut config = CrawlerConfig::default();
        config.links.base_origin = "/relative".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidOrigin(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            CrawlerConfig::from_json("{ \"max_depth\": \"two\" }"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crawler.json");
        fs::write(&path, r#"{ "seeds": ["https://example.org/a"], "headless": false }"#).unwrap();

        let config = CrawlerConfig::from_file(&path).unwrap();
        assert_eq!(config.seeds, vec!["https://example.org/a"]);
        assert!(!config.headless);

        let missing = CrawlerConfig::from_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
