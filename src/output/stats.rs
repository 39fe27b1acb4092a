//! Statistics collected during a crawl
//!
//! This module provides the counters the coordinator updates as it works and
//! the end-of-run report printed by the CLI.

use crate::crawler::FetchResult;
use chrono::{DateTime, Utc};

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Category listings fetched or read from cache
    pub categories_processed: u64,

    /// Articles fetched or read from cache
    pub pages_downloaded: u64,

    /// Documents served from earlier downloads
    pub cache_hits: u64,

    /// HTTP requests sent, including retries
    pub requests_made: u64,

    /// Fetches that produced no content
    pub fetch_failures: u64,

    /// Fetches still throttled after every retry
    pub rate_limit_exhausted: u64,

    /// Documents that could not be written
    pub write_failures: u64,

    /// Categories beyond the maximum depth
    pub depth_skipped: u64,

    /// Links to URLs already processed
    pub duplicates_skipped: u64,

    /// When the crawl started
    pub started_at: DateTime<Utc>,

    /// When the crawl finished
    pub finished_at: Option<DateTime<Utc>>,
}

impl CrawlStatistics {
    pub fn new() -> Self {
        Self {
            categories_processed: 0,
            pages_downloaded: 0,
            cache_hits: 0,
            requests_made: 0,
            fetch_failures: 0,
            rate_limit_exhausted: 0,
            write_failures: 0,
            depth_skipped: 0,
            duplicates_skipped: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Updates the fetch counters from one result
    pub fn record_fetch(&mut self, result: &FetchResult) {
        self.requests_made += u64::from(result.attempts());

        match result {
            FetchResult::Cached { .. } => self.cache_hits += 1,
            FetchResult::RateLimited { .. } => self.rate_limit_exhausted += 1,
            FetchResult::HttpError { .. } | FetchResult::NetworkError { .. } => {
                self.fetch_failures += 1
            }
            FetchResult::Fetched { .. } => {}
        }
    }

    /// Marks the crawl as finished
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Elapsed seconds, up to now if the crawl is still running
    pub fn duration_seconds(&self) -> i64 {
        let end = self.finished_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_seconds()
    }

    /// Documents written or reused
    pub fn total_documents(&self) -> u64 {
        self.categories_processed + self.pages_downloaded
    }
}

impl Default for CrawlStatistics {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Categories processed: {}", stats.categories_processed);
    println!("  Pages downloaded: {}", stats.pages_downloaded);
    println!("  Served from cache: {}", stats.cache_hits);
    println!("  Requests made: {}", stats.requests_made);
    println!("  Duration: {}s", stats.duration_seconds());
    println!();

    let problems = [
        ("Failed fetches", stats.fetch_failures),
        ("Still rate limited after retries", stats.rate_limit_exhausted),
        ("Write failures", stats.write_failures),
        ("Skipped beyond max depth", stats.depth_skipped),
    ];

    if problems.iter().any(|(_, count)| *count > 0) {
        println!("Problems:");
        for (label, count) in problems.iter().filter(|(_, count)| *count > 0) {
            println!("  {}: {}", label, count);
        }
        println!();
    }

    println!("Duplicate links skipped: {}", stats.duplicates_skipped);
}
