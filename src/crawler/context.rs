use crate::config::Config;
use crate::output::CrawlStatistics;
use crate::state::VisitedSet;
use crate::storage::Storage;

/// Everything one crawl run shares: settings, visited URLs, output, counters
///
/// Passed explicitly to the traversal, so several crawls can run in one
/// process without interfering.
pub struct CrawlContext {
    /// Resolved configuration, read-only for the run
    pub config: Config,

    /// URLs claimed so far
    pub visited: VisitedSet,

    /// Counters reported at the end of the run
    pub stats: CrawlStatistics,

    storage: Box<dyn Storage>,
}

impl CrawlContext {
    pub fn new(config: Config, storage: Box<dyn Storage>) -> Self {
        Self {
            config,
            visited: VisitedSet::new(),
            stats: CrawlStatistics::new(),
            storage,
        }
    }

    /// Output backend rooted at the configured directory
    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }
}
