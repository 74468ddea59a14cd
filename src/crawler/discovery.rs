//! Content-page discovery from the seed page
//!
//! The seed page lists every content page of the site. Discovery reads its
//! anchors, resolves them against the seed URL, keeps the ones that follow
//! the content path convention and returns them sorted and deduplicated.

use crate::url::{resolve_link, ContentFilter, LinkClassification};
use crate::DiscoveryError;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Extracts content-page URLs from the seed page
#[derive(Debug, Clone, Default)]
pub struct LinkDiscoverer {
    filter: ContentFilter,
}

impl LinkDiscoverer {
    pub fn new(filter: ContentFilter) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> &ContentFilter {
        &self.filter
    }

    /// Returns the sorted, deduplicated content-page URLs linked from the seed
    ///
    /// # Link Rules
    ///
    /// **Skipped silently:**
    /// - `<a href="..." download>` anchors
    /// - empty, fragment-only, `javascript:`, `mailto:`, `tel:`, `data:` hrefs
    /// - links to other hosts
    /// - same-site links outside the content path convention
    ///
    /// # Arguments
    ///
    /// * `seed_html` - The seed page body
    /// * `seed_url` - The seed page URL, used as base for relative links
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Url>)` - Content URLs in lexicographic order
    /// * `Err(DiscoveryError)` - The payload is empty or contains no markup
    ///
    /// # Example
    ///
    /// ```
    /// use pokedex_harvest::crawler::LinkDiscoverer;
    /// use url::Url;
    ///
    /// let html = r#"<html><body>
    ///     <a href="/conteudo/pokemon/lista02.htm">002</a>
    ///     <a href="/index.htm">Home</a>
    /// </body></html>"#;
    /// let seed = Url::parse("https://example.com/conteudo/pokemon/lista01.htm").unwrap();
    ///
    /// let urls = LinkDiscoverer::default().discover(html, &seed).unwrap();
    /// assert_eq!(urls.len(), 1);
    /// assert_eq!(urls[0].as_str(), "https://example.com/conteudo/pokemon/lista02.htm");
    /// ```
    pub fn discover(&self, seed_html: &str, seed_url: &Url) -> Result<Vec<Url>, DiscoveryError> {
        if seed_html.trim().is_empty() {
            return Err(DiscoveryError::Empty {
                url: seed_url.to_string(),
            });
        }

        if !looks_like_markup(seed_html) {
            return Err(DiscoveryError::NotHtml {
                url: seed_url.to_string(),
            });
        }

        let document = Html::parse_document(seed_html);
        let mut found = BTreeSet::new();

        if let Ok(a_selector) = Selector::parse("a[href]") {
            for element in document.select(&a_selector) {
                if element.value().attr("download").is_some() {
                    continue;
                }

                let Some(href) = element.value().attr("href") else {
                    continue;
                };

                let Some(link) = resolve_link(href, seed_url) else {
                    tracing::debug!(href, "Skipping unresolvable link");
                    continue;
                };

                match self.filter.classify(&link, seed_url) {
                    LinkClassification::Content => {
                        found.insert(link);
                    }
                    classification => {
                        tracing::debug!(url = %link, ?classification, "Skipping non-content link");
                    }
                }
            }
        }

        tracing::debug!(count = found.len(), seed = %seed_url, "Discovered content pages");

        Ok(found.into_iter().collect())
    }
}

/// True when the payload contains at least one tag-like sequence
fn looks_like_markup(payload: &str) -> bool {
    payload
        .split('<')
        .skip(1)
        .any(|rest| rest.starts_with(|c: char| c.is_ascii_alphabetic() || c == '!' || c == '/'))
}
