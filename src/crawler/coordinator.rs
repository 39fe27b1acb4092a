//! Crawler coordinator - main traversal logic
//!
//! This module drives the crawl from the root category:
//! - Claiming each URL in the visited set before it is fetched
//! - Fetching listings and articles (cache first)
//! - Persisting documents under sanitized names
//! - Scanning listings and scheduling the links they contain
//!
//! Traversal is depth-first over an explicit work list instead of recursion,
//! so deep category trees cannot exhaust the call stack.

use crate::config::Config;
use crate::crawler::fetcher::{FetchResult, Fetcher};
use crate::crawler::parser::{LinkKind, LinkRecord, SectionParser};
use crate::crawler::CrawlContext;
use crate::output::CrawlStatistics;
use crate::storage::{open_storage, Storage};
use crate::url::{article_file_name, category_dir_name, category_file_name, normalize};
use crate::{Result, UrlError};
use std::path::{Path, PathBuf};
use url::Url;

/// What a pending URL is expected to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkKind {
    Category,
    Page,
}

/// A pending unit of work
#[derive(Debug, Clone)]
struct WorkItem {
    url: Url,
    /// Subcategory levels below the root
    depth: u32,
    /// Output directory relative to the storage root
    dir: PathBuf,
    kind: WorkKind,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    context: CrawlContext,
    fetcher: Fetcher,
    parser: SectionParser,
}

impl Coordinator {
    /// Creates a coordinator writing to the configured output directory
    pub fn new(config: Config) -> Result<Self> {
        let storage = open_storage(Path::new(&config.output.output_dir))?;
        Self::with_storage(config, Box::new(storage))
    }

    /// Creates a coordinator with an explicit storage backend
    pub fn with_storage(config: Config, storage: Box<dyn Storage>) -> Result<Self> {
        let fetcher = Fetcher::from_config(&config)?;
        let parser = SectionParser::new(&config.markers)?;

        Ok(Self {
            context: CrawlContext::new(config, storage),
            fetcher,
            parser,
        })
    }

    pub fn context(&self) -> &CrawlContext {
        &self.context
    }

    pub fn into_context(self) -> CrawlContext {
        self.context
    }

    /// Crawls everything reachable from the root category
    ///
    /// Only an unparsable root URL is an error; failures below the root are
    /// logged and counted.
    pub async fn run(&mut self, root_url: &str) -> Result<()> {
        let root = Url::parse(root_url).map_err(|e| UrlError::Parse(e.to_string()))?;
        normalize(root.clone())?;
        tracing::info!("Starting crawl of {}", root);

        let mut stack = vec![WorkItem {
            url: root,
            depth: 0,
            dir: PathBuf::new(),
            kind: WorkKind::Category,
        }];

        let mut processed = 0u64;
        while let Some(item) = stack.pop() {
            if self.process(item, &mut stack).await {
                processed += 1;
                if processed % 10 == 0 {
                    tracing::info!(
                        "Progress: {} documents processed, {} pending",
                        processed,
                        stack.len()
                    );
                }
            }
        }

        self.context.stats.finish();
        tracing::info!(
            "Crawl completed: {} categories, {} pages in {}s",
            self.context.stats.categories_processed,
            self.context.stats.pages_downloaded,
            self.context.stats.duration_seconds()
        );

        Ok(())
    }

    /// Handles one work item, returning false if it was skipped
    ///
    /// The normalized URL is only the visited-set key; the request goes to the
    /// URL as it was discovered.
    async fn process(&mut self, item: WorkItem, stack: &mut Vec<WorkItem>) -> bool {
        let key = match normalize(item.url.clone()) {
            Ok(key) => key,
            Err(e) => {
                tracing::debug!("Skipping unusable URL {}: {}", item.url, e);
                return false;
            }
        };

        if item.kind == WorkKind::Category {
            if let Some(max_depth) = self.context.config.crawler.max_depth {
                if item.depth > max_depth {
                    tracing::debug!(
                        "Skipping {} at depth {} (max {})",
                        item.url,
                        item.depth,
                        max_depth
                    );
                    self.context.stats.depth_skipped += 1;
                    return false;
                }
            }
        }

        if !self.context.visited.insert(&key) {
            tracing::debug!("URL {} already processed", item.url);
            self.context.stats.duplicates_skipped += 1;
            return false;
        }

        match item.kind {
            WorkKind::Category => {
                self.process_category(item.url, item.depth, &item.dir, stack)
                    .await
            }
            WorkKind::Page => self.process_page(item.url, &item.dir).await,
        }

        true
    }

    /// Fetches, stores and scans a category listing
    async fn process_category(
        &mut self,
        url: Url,
        depth: u32,
        dir: &Path,
        stack: &mut Vec<WorkItem>,
    ) {
        tracing::debug!("{}Category {} (depth {})", "\t".repeat(depth as usize), url, depth);

        if !dir.as_os_str().is_empty() {
            if let Err(e) = self.context.storage().ensure_dir(dir) {
                tracing::error!("Unable to create directory: {}", e);
            }
        }

        let file = dir.join(category_file_name(&url));
        let Some(body) = self.fetch_and_store(&url, &file).await else {
            return;
        };
        self.context.stats.categories_processed += 1;

        let links = self.parser.parse(&body, &url);
        tracing::debug!("Found {} links in {}", links.len(), url);

        let children = self.plan_children(links, depth, dir);
        // Reversed so the first planned child is popped first
        stack.extend(children.into_iter().rev());
    }

    /// Fetches and stores an article
    async fn process_page(&mut self, url: Url, dir: &Path) {
        tracing::debug!("Downloading article URL: {}", url);

        let file = dir.join(article_file_name(&url));
        if self.fetch_and_store(&url, &file).await.is_some() {
            self.context.stats.pages_downloaded += 1;
        }
    }

    /// Fetches a document and writes it unless it came from `file` itself
    ///
    /// Returns the content, or None when the fetch failed.
    async fn fetch_and_store(&mut self, url: &Url, file: &Path) -> Option<String> {
        let result = self
            .fetcher
            .fetch(url, self.context.storage(), file)
            .await;
        self.context.stats.record_fetch(&result);

        if !result.ok() {
            tracing::warn!("Skipping {}: {}", url, describe_failure(&result));
            return None;
        }

        let cached = result.is_cached();
        let body = result.into_body();

        if !cached {
            match self.context.storage().write(file, &body) {
                Ok(()) => tracing::info!("Saved {}", self.context.storage().resolve(file).display()),
                Err(e) => {
                    tracing::error!("Unable to write file: {}", e);
                    self.context.stats.write_failures += 1;
                }
            }
        }

        Some(body)
    }

    /// Turns scanned links into work items in processing order
    ///
    /// Continuations first, then subcategories, then pages. A continuation
    /// stays at its listing's depth and directory; a subcategory goes one
    /// level deeper and, when mirroring, into its own directory.
    fn plan_children(&self, links: Vec<LinkRecord>, depth: u32, dir: &Path) -> Vec<WorkItem> {
        let crawler = &self.context.config.crawler;
        let make_subdirs = self.context.config.output.make_subdirs;

        let mut continuations = Vec::new();
        let mut subcategories = Vec::new();
        let mut pages = Vec::new();

        for link in links {
            match link.kind {
                LinkKind::Continuation if !crawler.skip_subcats => {
                    tracing::debug!("Continuing listing at {}", link.url);
                    continuations.push(WorkItem {
                        url: link.url,
                        depth,
                        dir: dir.to_path_buf(),
                        kind: WorkKind::Category,
                    });
                }
                LinkKind::Subcategory if !crawler.skip_subcats => {
                    let child_dir = if make_subdirs {
                        dir.join(category_dir_name(&link.url))
                    } else {
                        dir.to_path_buf()
                    };
                    subcategories.push(WorkItem {
                        url: link.url,
                        depth: depth + 1,
                        dir: child_dir,
                        kind: WorkKind::Category,
                    });
                }
                LinkKind::Page if !crawler.skip_pages => {
                    pages.push(WorkItem {
                        url: link.url,
                        depth,
                        dir: dir.to_path_buf(),
                        kind: WorkKind::Page,
                    });
                }
                _ => tracing::trace!("Not following {} link {}", link.kind, link.url),
            }
        }

        continuations
            .into_iter()
            .chain(subcategories)
            .chain(pages)
            .collect()
    }
}

fn describe_failure(result: &FetchResult) -> String {
    match result {
        FetchResult::HttpError { status_code } => format!("HTTP {}", status_code),
        FetchResult::NetworkError { error } => error.clone(),
        _ => "no content".to_string(),
    }
}

/// Runs a complete crawl from `root_url`
///
/// # Example
///
/// ```no_run
/// use wikicat::config::Config;
/// use wikicat::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let stats = run_crawl(
///     Config::default(),
///     "https://en.wikipedia.org/wiki/Category:Major_League_Baseball_players",
/// )
/// .await?;
/// println!("{} pages", stats.pages_downloaded);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, root_url: &str) -> Result<CrawlStatistics> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run(root_url).await?;
    Ok(coordinator.into_context().stats)
}
