use std::collections::HashSet;
use url::Url;

/// Absolute URLs scheduled or fetched during one run.
///
/// `mark` is the only way in, and it checks and inserts in one step, so a URL
/// reachable from two pages is scheduled once. URLs are keyed without their
/// fragment: `profile/1#bio` and `profile/1` are the same document.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `url` as visited. Returns false if it already was.
    pub fn mark(&mut self, url: &Url) -> bool {
        self.seen.insert(document_key(url).to_string())
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.seen.contains(document_key(url))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

fn document_key(url: &Url) -> &str {
    &url[..url::Position::AfterQuery]
}
