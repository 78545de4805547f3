use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::crawlers::visited::VisitedSet;
use crate::error::ConfigError;
use crate::parsers::Document;

/// Returns true when `url` parses with both a scheme and a host.
///
/// Pure check, no network access. `mailto:`, `file:///...` and relative
/// paths are all rejected. The authority must be written out as `//host`:
/// the parser fills in a host for `https:example.org`, which has none.
pub fn is_valid_url(url: &str) -> bool {
    let Some((scheme, rest)) = url.split_once(':') else {
        return false;
    };
    if !rest.starts_with("//") {
        return false;
    }
    match Url::parse(url) {
        Ok(parsed) => {
            parsed.scheme().eq_ignore_ascii_case(scheme)
                && parsed.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}

/// Configuration for which hyperlinks count as entity profile links
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkScopeConfig {
    /// Origin that relative profile links are resolved against
    #[serde(default = "default_base_origin")]
    pub base_origin: String,

    /// Path prefix a link must start with to be followed
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,

    /// Regex patterns for in-scope URLs that should still be skipped
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

fn default_base_origin() -> String {
    "https://www.pap.gov.pk".to_string()
}

fn default_path_prefix() -> String {
    "/members/profile".to_string()
}

impl Default for LinkScopeConfig {
    fn default() -> Self {
        Self {
            base_origin: default_base_origin(),
            path_prefix: default_path_prefix(),
            exclude_patterns: Vec::new(),
        }
    }
}

/// Decides whether an `href` is an in-scope profile link and resolves it
#[derive(Debug)]
pub struct LinkScope {
    base: Url,
    path_prefix: String,
    exclude_regexes: Vec<Regex>,
}

impl LinkScope {
    /// Create a new link scope from configuration
    pub fn new(config: &LinkScopeConfig) -> Result<Self, ConfigError> {
        if !is_valid_url(&config.base_origin) {
            return Err(ConfigError::InvalidOrigin(config.base_origin.clone()));
        }
        let base = Url::parse(&config.base_origin)
            .map_err(|_| ConfigError::InvalidOrigin(config.base_origin.clone()))?;

        let mut exclude_regexes = Vec::with_capacity(config.exclude_patterns.len());
        for pattern in &config.exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            base,
            path_prefix: config.path_prefix.clone(),
            exclude_regexes,
        })
    }

    /// Resolves `href` to an absolute URL if it points at a profile page on
    /// the base origin. Fragments are dropped.
    pub fn resolve(&self, href: &str) -> Option<Url> {
        let mut url = self.base.join(href.trim()).ok()?;
        if url.origin() != self.base.origin() || !url.path().starts_with(&self.path_prefix) {
            return None;
        }
        url.set_fragment(None);

        let url_str = url.as_str();
        if self.exclude_regexes.iter().any(|regex| regex.is_match(url_str)) {
            ::log::debug!("Link excluded by pattern: {}", url_str);
            return None;
        }
        Some(url)
    }
}

/// Collects the in-scope profile links on a page, in document order.
///
/// Links already in `visited` are left out. This is a membership check only;
/// marking is done by the caller when it schedules the link.
pub fn discover_links(doc: &Document, scope: &LinkScope, visited: &VisitedSet) -> Vec<Url> {
    let mut links = Vec::new();
    for (href, _) in doc.anchors() {
        ::log::debug!("Extracted link: {}", href);
        let Some(url) = scope.resolve(href) else {
            continue;
        };
        if visited.contains(&url) {
            ::log::trace!("Skipping already visited link: {}", url);
            continue;
        }
        links.push(url);
    }
    links
}

/// Finds the pagination control labelled `label` and returns the page it
/// leads to.
///
/// Only anchors with a navigable http(s) target count; a bare `#` or a
/// `javascript:` handler is treated as no control at all.
pub fn find_pagination(doc: &Document, label: &str, page_url: &Url) -> Option<Url> {
    doc.anchors()
        .filter(|(_, text)| text == label)
        .find_map(|(href, _)| {
            let mut next = page_url.join(href.trim()).ok()?;
            if !matches!(next.scheme(), "http" | "https") {
                return None;
            }
            next.set_fragment(None);
            let mut current = page_url.clone();
            current.set_fragment(None);
            (next != current).then_some(next)
        })
}
