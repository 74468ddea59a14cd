//! Crawler module for page fetching and table extraction
//!
//! This module contains the core pipeline:
//! - HTTP fetching behind the [`PageFetcher`] trait
//! - Content-page discovery from the seed page
//! - Entity table parsing into records
//! - Overall crawl coordination and tallying

mod coordinator;
mod discovery;
mod fetcher;
mod parser;

pub use coordinator::{
    run_crawl, Coordinator, CrawlReport, CrawlTally, PageFailure, PageTableSkip,
};
pub use discovery::LinkDiscoverer;
pub use fetcher::{build_http_client, fetch_url, HttpFetcher, PageFetcher};
pub use parser::{labels, ParsedPage, SkipReason, TableParser, TableSkip};

use crate::config::Config;
use crate::HarvestError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client
/// 2. Fetch the seed page and discover content pages
/// 3. Fetch and parse every content page
/// 4. Return the records and the run tally
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed, possibly with skipped pages
/// * `Err(HarvestError)` - The client could not be built or the seed failed
pub async fn crawl(config: &Config) -> Result<CrawlReport, HarvestError> {
    run_crawl(config).await
}
