//! Pokédex Harvest: a table scraper for a Pokémon reference site
//!
//! This crate crawls a fixed-structure reference website starting from a single
//! seed page, extracts one record per entity table on every discovered content
//! page, and exports the accumulated records to CSV.

pub mod config;
pub mod crawler;
pub mod output;
pub mod record;
pub mod url;

use thiserror::Error;

/// Errors that stop a crawl started from a configuration
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Crawl aborted: {0}")]
    Crawl(#[from] CrawlError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Errors that abort a whole crawl run
///
/// Only the seed page can produce these; failures on later pages are
/// recorded in the tally instead.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid seed URL: {0}")]
    InvalidSeed(#[from] UrlError),

    #[error("seed page could not be fetched: {0}")]
    SeedFetch(#[from] FetchError),

    #[error("seed page could not be parsed: {0}")]
    Discovery(#[from] DiscoveryError),
}

/// Transport-level failures for a single URL
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timeout for {url}")]
    Timeout { url: String },

    #[error("connection failed for {url}: {source}")]
    Connect { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("failed to read body of {url}: {source}")]
    Body { url: String, source: reqwest::Error },

    #[error("request failed for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },
}

impl FetchError {
    /// The URL whose fetch failed
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url }
            | Self::Connect { url, .. }
            | Self::Status { url, .. }
            | Self::Body { url, .. }
            | Self::Transport { url, .. } => url,
        }
    }
}

/// The seed payload could not be used for link discovery
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("seed page {url} is empty")]
    Empty { url: String },

    #[error("seed page {url} does not contain HTML markup")]
    NotHtml { url: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlReport, CrawlTally};
pub use record::{Record, RecordBuilder, ValidationError};
