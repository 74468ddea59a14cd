use serde::Deserialize;

pub const DEFAULT_SEED_URL: &str = "https://pokemythology.net/conteudo/pokemon/lista01.htm";
pub const DEFAULT_CSV_PATH: &str = "output/pokemons.csv";

/// Main configuration structure for Pokédex Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Page from which every content page is discovered
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Also parse the seed page itself when it is a content page
    #[serde(rename = "include-seed")]
    pub include_seed: bool,

    /// Charset used when a response does not declare one
    #[serde(rename = "fallback-charset")]
    pub fallback_charset: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed_url: DEFAULT_SEED_URL.to_string(),
            timeout_secs: 10,
            include_seed: false,
            fallback_charset: "windows-1252".to_string(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version` or `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "PokedexHarvest".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

/// Site layout conventions for content pages
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Path prefix every content page starts with
    #[serde(rename = "path-prefix")]
    pub path_prefix: String,

    /// File extension every content page ends with
    pub extension: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            path_prefix: "/conteudo/pokemon/".to_string(),
            extension: ".htm".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the CSV export
    #[serde(rename = "csv-path")]
    pub csv_path: String,

    /// Run the consistency report after export
    pub report: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: DEFAULT_CSV_PATH.to_string(),
            report: true,
        }
    }
}
