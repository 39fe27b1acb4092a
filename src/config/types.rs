use serde::Deserialize;

/// Main configuration structure for wikicat
///
/// Every section and key is optional in the TOML file; missing values fall
/// back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub markers: MarkerConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Do not follow subcategory or pagination links
    pub skip_subcats: bool,

    /// Do not download member pages
    pub skip_pages: bool,

    /// Pause after every live fetch (seconds)
    pub url_sleep: u64,

    /// Additional attempts when a response is rate limited
    pub max_retries: u32,

    /// Pause between rate-limited attempts (milliseconds)
    pub retry_pause_ms: u64,

    /// Maximum subcategory depth below the root (unbounded when absent)
    pub max_depth: Option<u32>,

    /// Transport timeout for a single request (seconds)
    pub request_timeout: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            skip_subcats: false,
            skip_pages: false,
            url_sleep: 1,
            max_retries: 3,
            retry_pause_ms: 5000,
            max_depth: None,
            request_timeout: 30,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: String,

    /// Email address for crawler-related contact
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "wikicat".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/wikicat".to_string(),
            contact_email: "wikicat@example.com".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory receiving the downloaded files
    pub output_dir: String,

    /// Recreate the category hierarchy as nested directories
    pub make_subdirs: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: ".".to_string(),
            make_subdirs: false,
        }
    }
}

/// Patterns bounding the regions of a category listing
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MarkerConfig {
    /// Start of the subcategories region
    pub subcategories: String,

    /// Start of the member pages region
    pub pages_start: String,

    /// End of the member pages region
    pub pages_end: String,

    /// Literal text signalling a throttled response
    pub access_denied: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            subcategories: "Subcategories".to_string(),
            pages_start: "Pages in category".to_string(),
            pages_end: "Media in category".to_string(),
            access_denied: "Error: ERR_ACCESS_DENIED".to_string(),
        }
    }
}
