//! Domain records extracted from entity tables
//!
//! A [`Record`] is immutable and can only be produced by
//! [`RecordBuilder::build`], which guarantees that the identifier and the
//! name are present and non-empty. Every text field is stored on a single
//! line without surrounding whitespace, so records survive a CSV export.

mod builder;

pub use builder::{RecordBuilder, ValidationError};
pub(crate) use builder::single_line;

use std::collections::BTreeMap;

/// Separates categories when they share one text field
pub const CATEGORY_SEPARATOR: &str = "/";

/// One crawled entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    identifier: String,
    name: String,
    categories: Vec<String>,
    image_url: Option<String>,
    extra_attributes: BTreeMap<String, String>,
}

impl Record {
    /// The site's catalog number
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Classification tags in the order they appeared on the page
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    /// Free-form attributes, iterated in key order
    pub fn extra_attributes(&self) -> &BTreeMap<String, String> {
        &self.extra_attributes
    }

    /// Looks up a single extra attribute
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.extra_attributes.get(key).map(String::as_str)
    }
}
