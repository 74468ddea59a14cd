//! Crawler coordinator - main crawl orchestration logic
//!
//! This module sequences a whole run:
//! - Fetching the seed page (the only fatal step)
//! - Discovering content pages from it
//! - Fetching and parsing every content page in order
//! - Tallying successes, page failures and skipped tables

use crate::config::Config;
use crate::crawler::discovery::LinkDiscoverer;
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::parser::{TableParser, TableSkip};
use crate::record::Record;
use crate::url::{normalize_url, ContentFilter};
use crate::{CrawlError, HarvestError};
use chrono::{DateTime, Utc};

/// A content page that could not be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub url: String,
    pub cause: String,
}

/// A skipped table together with the page it was on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTableSkip {
    pub page_url: String,
    pub skip: TableSkip,
}

/// Per-run counts of pages, tables and records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlTally {
    /// Content pages the crawl tried to process
    pub pages_attempted: usize,
    /// Content pages whose HTML was retrieved
    pub pages_fetched: usize,
    /// Content pages dropped because the fetch failed
    pub pages_skipped: usize,
    pub tables_skipped: usize,
    pub records_produced: usize,
    pub failures: Vec<PageFailure>,
    pub table_skips: Vec<PageTableSkip>,
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Records in discovery order, then table order within each page
    pub records: Vec<Record>,
    pub tally: CrawlTally,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<F> {
    fetcher: F,
    discoverer: LinkDiscoverer,
    parser: TableParser,
    include_seed: bool,
}

impl<F: PageFetcher> Coordinator<F> {
    pub fn new(fetcher: F, discoverer: LinkDiscoverer) -> Self {
        Self {
            fetcher,
            discoverer,
            parser: TableParser::new(),
            include_seed: false,
        }
    }

    /// Creates a coordinator using the content convention and seed policy
    /// from the configuration
    pub fn from_config(fetcher: F, config: &Config) -> Self {
        let discoverer = LinkDiscoverer::new(ContentFilter::from_config(&config.content));
        Self::new(fetcher, discoverer).with_include_seed(config.crawler.include_seed)
    }

    /// Also parse the seed page when it follows the content convention
    pub fn with_include_seed(mut self, include_seed: bool) -> Self {
        self.include_seed = include_seed;
        self
    }

    /// Runs a complete crawl
    ///
    /// 1. Fetch the seed page; failure aborts the run
    /// 2. Discover content pages; an unusable seed payload aborts the run
    /// 3. For each content page in order: fetch, then parse its tables.
    ///    A failed fetch is logged, tallied and skipped.
    ///
    /// The seed page is never fetched twice: when it shows up among the
    /// content pages its HTML is reused.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The run reached the end of the discovered pages
    /// * `Err(CrawlError)` - The seed URL was invalid, unreachable or unusable
    pub async fn run(&self, seed_url: &str) -> Result<CrawlReport, CrawlError> {
        let started_at = Utc::now();
        let seed = normalize_url(seed_url)?;

        tracing::info!(seed = %seed, "Fetching seed page");
        let seed_html = match self.fetcher.fetch(seed.as_str()).await {
            Ok(html) => html,
            Err(e) => {
                tracing::error!(url = %seed, cause = %e, "Seed page fetch failed");
                return Err(CrawlError::SeedFetch(e));
            }
        };

        let mut urls = match self.discoverer.discover(&seed_html, &seed) {
            Ok(urls) => urls,
            Err(e) => {
                tracing::error!(url = %seed, cause = %e, "Seed page unusable for discovery");
                return Err(CrawlError::Discovery(e));
            }
        };

        if self.include_seed
            && self.discoverer.filter().classify(&seed, &seed).should_crawl()
            && !urls.contains(&seed)
        {
            urls.insert(0, seed.clone());
        }

        tracing::info!(pages = urls.len(), "Discovered content pages");

        let mut records = Vec::new();
        let mut tally = CrawlTally::default();

        for url in &urls {
            tally.pages_attempted += 1;

            let fetched;
            let html: &str = if *url == seed {
                &seed_html
            } else {
                match self.fetcher.fetch(url.as_str()).await {
                    Ok(body) => {
                        fetched = body;
                        &fetched
                    }
                    Err(e) => {
                        tracing::warn!(url = %url, cause = %e, "Page fetch failed, skipping");
                        tally.pages_skipped += 1;
                        tally.failures.push(PageFailure {
                            url: url.to_string(),
                            cause: e.to_string(),
                        });
                        continue;
                    }
                }
            };

            tally.pages_fetched += 1;

            let parsed = self.parser.parse_page(html, url);

            tracing::info!(
                url = %url,
                records = parsed.records.len(),
                skipped_tables = parsed.skipped.len(),
                "Crawled page"
            );

            tally.records_produced += parsed.records.len();
            tally.tables_skipped += parsed.skipped.len();
            tally
                .table_skips
                .extend(parsed.skipped.into_iter().map(|skip| PageTableSkip {
                    page_url: url.to_string(),
                    skip,
                }));
            records.extend(parsed.records);
        }

        tracing::info!(
            pages_attempted = tally.pages_attempted,
            pages_fetched = tally.pages_fetched,
            pages_skipped = tally.pages_skipped,
            tables_skipped = tally.tables_skipped,
            records = tally.records_produced,
            "Crawl finished"
        );

        Ok(CrawlReport {
            records,
            tally,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

/// Runs a crawl against the live site described by the configuration
///
/// # Example
///
/// ```no_run
/// use pokedex_harvest::config::Config;
/// use pokedex_harvest::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_crawl(&Config::default()).await?;
/// println!("{} records", report.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config) -> Result<CrawlReport, HarvestError> {
    let fetcher = HttpFetcher::from_config(config)?;
    let coordinator = Coordinator::from_config(fetcher, config);
    Ok(coordinator.run(&config.crawler.seed_url).await?)
}
