//! Crawler module for category traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with cache lookup and rate-limit retries
//! - Line scanning of category listings and link extraction
//! - The per-run crawl context
//! - Overall traversal coordination

mod context;
mod coordinator;
mod fetcher;
mod parser;

pub use context::CrawlContext;
pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, FetchResult, Fetcher, RetryPolicy};
pub use parser::{LinkKind, LinkRecord, SectionParser};

use crate::config::Config;
use crate::output::CrawlStatistics;
use crate::Result;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the output directory
/// 2. Build the HTTP client
/// 3. Walk the root category, its continuations and subcategories
/// 4. Download every member page
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `root_url` - URL of the root category listing
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Crawl completed; failures below the root are counted
/// * `Err(WikicatError)` - The crawl could not start
pub async fn crawl(config: Config, root_url: &str) -> Result<CrawlStatistics> {
    run_crawl(config, root_url).await
}
