//! Configuration module for Pokédex Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every field has a default, so running without a file crawls the public site.
//!
//! # Example
//!
//! ```no_run
//! use pokedex_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Seed page: {}", config.crawler.seed_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, ContentConfig, CrawlerConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{
    compute_config_hash, hash_content, load_config, load_config_with_hash, parse_config,
};
pub use validation::validate;
