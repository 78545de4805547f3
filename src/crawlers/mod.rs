pub mod crawler;
pub mod delay;
pub mod engine;
pub mod visited;
pub mod web;

pub use crawler::PageFetcher;
pub use delay::{JitterDelay, NoDelay, PaginationDelay};
pub use engine::{CrawlSummary, TraversalEngine};
pub use visited::VisitedSet;
pub use web::WebDriverFetcher;
