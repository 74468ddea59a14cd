use super::{Record, CATEGORY_SEPARATOR};
use std::collections::BTreeMap;
use thiserror::Error;

/// Reasons a builder refuses to produce a [`Record`]
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("record has no identifier")]
    MissingIdentifier,

    #[error("record has no name")]
    MissingName,
}

/// Stepwise constructor for [`Record`]
///
/// The builder is consumed by [`build`](RecordBuilder::build), so a fresh
/// builder is needed for every table. Values are folded onto one line and
/// trimmed as they are set; blank optional values are dropped.
///
/// # Example
///
/// ```
/// use pokedex_harvest::record::RecordBuilder;
///
/// let record = RecordBuilder::new()
///     .identifier("025")
///     .name("Pikachu")
///     .category("Elétrico")
///     .attribute("Altura", "0,4 m")
///     .build()
///     .unwrap();
///
/// assert_eq!(record.identifier(), "025");
/// assert_eq!(record.categories(), ["Elétrico"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    identifier: Option<String>,
    name: Option<String>,
    categories: Vec<String>,
    image_url: Option<String>,
    extra_attributes: BTreeMap<String, String>,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Appends a category; blank values are ignored
    ///
    /// A value containing [`CATEGORY_SEPARATOR`] is appended as several
    /// categories.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        let category: String = category.into();
        self.categories.extend(
            category
                .split(CATEGORY_SEPARATOR)
                .map(single_line)
                .filter(|part| !part.is_empty()),
        );
        self
    }

    /// Sets the main image; a blank URL clears it
    pub fn image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(single_line(&url.into())).filter(|url| !url.is_empty());
        self
    }

    /// Sets an extra attribute, replacing any earlier value for the key
    ///
    /// A blank key is ignored. A blank value leaves the attribute absent.
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = single_line(&key.into());
        if key.is_empty() {
            return self;
        }

        let value = single_line(&value.into());
        if value.is_empty() {
            self.extra_attributes.remove(&key);
        } else {
            self.extra_attributes.insert(key, value);
        }
        self
    }

    /// Validates the accumulated fields and freezes them into a [`Record`]
    ///
    /// # Returns
    ///
    /// * `Ok(Record)` - identifier and name are non-empty after trimming
    /// * `Err(ValidationError)` - a required field is missing or blank
    pub fn build(self) -> Result<Record, ValidationError> {
        let identifier = required(self.identifier).ok_or(ValidationError::MissingIdentifier)?;
        let name = required(self.name).ok_or(ValidationError::MissingName)?;

        Ok(Record {
            identifier,
            name,
            categories: self.categories,
            image_url: self.image_url,
            extra_attributes: self.extra_attributes,
        })
    }
}

fn required(value: Option<String>) -> Option<String> {
    value.map(|v| single_line(&v)).filter(|v| !v.is_empty())
}

/// Line breaks become spaces, surrounding whitespace is dropped
pub(crate) fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ").trim().to_string()
}
