//! URL handling module for Pokédex Harvest
//!
//! This module provides URL normalization, link resolution, host comparison
//! and the content-page filtering policy used during discovery.

mod domain;
mod matcher;
mod normalize;

use crate::config::ContentConfig;
use url::Url;

// Re-export main functions
pub use domain::{extract_host, same_origin_host};
pub use matcher::matches_content_path;
pub use normalize::{normalize_url, resolve_link};

/// Classification of a link found on the seed page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkClassification {
    /// Same-site page following the content path convention
    Content,
    /// Same-site page outside the convention (menus, news, other sections)
    Navigational,
    /// Link to another host
    External,
}

impl LinkClassification {
    /// Returns true if the link should be crawled
    pub fn should_crawl(&self) -> bool {
        matches!(self, Self::Content)
    }
}

/// Filtering policy deciding which discovered links are content pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFilter {
    path_prefix: String,
    extension: String,
}

impl ContentFilter {
    pub fn new(path_prefix: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            path_prefix: path_prefix.into(),
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &ContentConfig) -> Self {
        Self::new(config.path_prefix.clone(), config.extension.clone())
    }

    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Classifies an absolute link relative to the seed URL
    ///
    /// Checks are applied in order:
    /// 1. Different host → External
    /// 2. Path outside the prefix/extension convention → Navigational
    /// 3. Otherwise → Content
    ///
    /// # Examples
    ///
    /// ```
    /// use pokedex_harvest::url::{ContentFilter, LinkClassification};
    /// use url::Url;
    ///
    /// let filter = ContentFilter::new("/conteudo/pokemon/", ".htm");
    /// let seed = Url::parse("https://example.com/conteudo/pokemon/lista01.htm").unwrap();
    /// let link = Url::parse("https://example.com/conteudo/pokemon/lista02.htm").unwrap();
    ///
    /// assert_eq!(filter.classify(&link, &seed), LinkClassification::Content);
    /// ```
    pub fn classify(&self, link: &Url, seed: &Url) -> LinkClassification {
        if !same_origin_host(link, seed) {
            return LinkClassification::External;
        }

        if matches_content_path(link.path(), &self.path_prefix, &self.extension) {
            LinkClassification::Content
        } else {
            LinkClassification::Navigational
        }
    }
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::from_config(&ContentConfig::default())
    }
}
