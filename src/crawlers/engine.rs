use crate::crawlers::crawler::PageFetcher;
use crate::crawlers::delay::PaginationDelay;
use crate::crawlers::visited::VisitedSet;
use crate::extract;
use crate::filter::{self, LinkScope};
use crate::parsers::Document;
use crate::results::ResultTable;
use crate::rules::RuleSet;
use url::Url;

/// Default bound on nested-link hops from a listing page
pub const DEFAULT_MAX_DEPTH: usize = 2;

/// Default visible text of the pagination control
pub const DEFAULT_PAGINATION_LABEL: &str = "Next";

/// Counters reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub seeds_crawled: usize,
    pub seeds_skipped: usize,
    pub pages_fetched: usize,
    pub fetch_failures: usize,
    /// Pages whose links were not followed because of the depth bound
    pub depth_limited_pages: usize,
    pub records: usize,
}

/// A scheduled nested link
#[derive(Debug, Clone, PartialEq, Eq)]
struct FrontierEntry {
    url: Url,
    depth: usize,
}

/// What one fetched page contributed to the crawl
struct PageOutcome {
    children: Vec<FrontierEntry>,
    next_page: Option<Url>,
}

/// Depth-bounded, cycle-safe crawl over seed listings.
///
/// Each seed is drained completely (every pagination page and every nested
/// profile link below it) before the next seed starts. Only one fetch is in
/// flight at a time.
pub struct TraversalEngine<F, D> {
    fetcher: F,
    delay: D,
    rules: RuleSet,
    scope: LinkScope,
    max_depth: usize,
    pagination_label: String,
    visited: VisitedSet,
    results: ResultTable,
    summary: CrawlSummary,
}

impl<F: PageFetcher, D: PaginationDelay> TraversalEngine<F, D> {
    pub fn new(fetcher: F, delay: D, rules: RuleSet, scope: LinkScope) -> Self {
        Self {
            fetcher,
            delay,
            rules,
            scope,
            max_depth: DEFAULT_MAX_DEPTH,
            pagination_label: DEFAULT_PAGINATION_LABEL.to_string(),
            visited: VisitedSet::new(),
            results: ResultTable::new(),
            summary: CrawlSummary::default(),
        }
    }

    /// Set the maximum nested-link depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the visible text that identifies the pagination control
    pub fn with_pagination_label(mut self, label: impl Into<String>) -> Self {
        self.pagination_label = label.into();
        self
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    pub fn results(&self) -> &ResultTable {
        &self.results
    }

    pub fn summary(&self) -> CrawlSummary {
        self.summary
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Hands back the fetcher, the accumulated table and the summary
    pub fn into_parts(self) -> (F, ResultTable, CrawlSummary) {
        (self.fetcher, self.results, self.summary)
    }

    /// Crawls every seed in order. Invalid seeds are logged and skipped.
    pub async fn crawl(&mut self, seeds: &[String]) {
        for seed in seeds {
            let url = match Url::parse(seed) {
                Ok(url) if filter::is_valid_url(seed) => url,
                _ => {
                    ::log::warn!("Invalid URL skipped: {}", seed);
                    self.summary.seeds_skipped += 1;
                    continue;
                }
            };
            if self.visited.contains(&url) {
                ::log::warn!("Duplicate seed skipped: {}", url);
                self.summary.seeds_skipped += 1;
                continue;
            }
            ::log::info!("Crawling: {}", url);
            self.crawl_seed(url).await;
            self.summary.seeds_crawled += 1;
        }
        self.summary.records = self.results.len();
    }

    /// Follows the pagination chain of one seed, draining the nested links
    /// of each listing page before moving to the next one. Callers guarantee
    /// the seed is unvisited; later pages are checked before they are queued.
    async fn crawl_seed(&mut self, seed: Url) {
        let mut next = Some(seed);

        while let Some(page_url) = next.take() {
            self.visited.mark(&page_url);
            ::log::info!("Processing URL: {}", page_url);
            let Some(outcome) = self.visit(&page_url, 0, true).await else {
                break;
            };

            self.drain(outcome.children).await;

            match outcome.next_page {
                Some(next_url) if self.visited.contains(&next_url) => {
                    ::log::info!("Next page {} already visited. Ending pagination.", next_url);
                }
                Some(next_url) => {
                    let pause = self.delay.next_delay();
                    ::log::debug!(
                        "Following '{}' to {} after {:?}",
                        self.pagination_label,
                        next_url,
                        pause
                    );
                    if !pause.is_zero() {
                        tokio::time::sleep(pause).await;
                    }
                    next = Some(next_url);
                }
                None => {
                    ::log::info!(
                        "No '{}' control found. Ending pagination.",
                        self.pagination_label
                    );
                }
            }
        }
    }

    /// Depth-first walk of nested links using an explicit stack.
    ///
    /// Every entry was marked visited when it was pushed, so nothing on the
    /// stack can be fetched twice.
    async fn drain(&mut self, children: Vec<FrontierEntry>) {
        let mut stack = children;
        stack.reverse();

        while let Some(entry) = stack.pop() {
            ::log::info!("Crawling nested link: {} (depth {})", entry.url, entry.depth);
            if let Some(outcome) = self.visit(&entry.url, entry.depth, false).await {
                // Reversed so the first link on the page is popped first
                stack.extend(outcome.children.into_iter().rev());
            }
        }
    }

    /// Fetches, extracts and schedules one page. `None` means the fetch failed.
    async fn visit(&mut self, url: &Url, depth: usize, listing: bool) -> Option<PageOutcome> {
        let html = match self.fetcher.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                ::log::warn!("{}", e);
                self.summary.fetch_failures += 1;
                return None;
            }
        };
        self.summary.pages_fetched += 1;

        let document = Document::parse(&html);
        let records = extract::extract(&document, &self.rules);
        ::log::debug!("{} records extracted from {}", records.len(), url);
        self.results.extend(records);

        let children = self.schedule_links(&document, depth);
        let next_page = if listing {
            filter::find_pagination(&document, &self.pagination_label, url)
        } else {
            None
        };

        Some(PageOutcome {
            children,
            next_page,
        })
    }

    /// Marks and returns the unvisited profile links of a page at `depth`.
    /// Nothing is discovered or marked once the children would exceed the
    /// depth bound.
    fn schedule_links(&mut self, document: &Document, depth: usize) -> Vec<FrontierEntry> {
        let child_depth = depth + 1;
        if child_depth > self.max_depth {
            ::log::debug!("Reached maximum crawl depth ({})", self.max_depth);
            self.summary.depth_limited_pages += 1;
            return Vec::new();
        }

        filter::discover_links(document, &self.scope, &self.visited)
            .into_iter()
            .filter(|url| self.visited.mark(url))
            .map(|url| FrontierEntry {
                url,
                depth: child_depth,
            })
            .collect()
    }
}
