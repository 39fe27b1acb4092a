//! Output module for crawl reporting
//!
//! This module handles recording crawl statistics and printing the summary
//! shown when a run completes.

pub mod stats;

pub use stats::{print_statistics, CrawlStatistics};
