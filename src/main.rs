//! wikicat main entry point
//!
//! This is the command-line interface for the wikicat category crawler.

use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wikicat::config::{resolve_config, validate, Config};
use wikicat::crawler::crawl;
use wikicat::output::print_statistics;

const AFTER_HELP: &str = "\
Example:
  wikicat 'https://en.wikipedia.org/wiki/Category:Major_League_Baseball_players'

Notes:
  - MAKE_SUBDIRS recreates category hierarchy in file system
  - SKIP_SUBCATS disables subcat traversals
  - SKIP_PAGES disables page downloading
  - OUTPUT_DIR, URL_SLEEP, MAX_DEPTH, SUBCATS_START, PAGES_START and PAGES_END
    are also read from the environment (or a .env file)";

/// wikicat: download every article in a category tree
///
/// Starting from a category listing, wikicat follows subcategories and
/// "next page" links and saves each listing and member article as an HTML
/// file. Files already present are reused instead of downloaded again.
#[derive(Parser, Debug)]
#[command(name = "wikicat")]
#[command(version)]
#[command(about = "Downloads all articles in a category and its subcategories", long_about = None)]
#[command(after_help = AFTER_HELP)]
struct Cli {
    /// URL of the root category listing
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory receiving the downloaded files
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Do not follow subcategories or listing continuations
    #[arg(long)]
    skip_subcats: bool,

    /// Do not download member pages
    #[arg(long)]
    skip_pages: bool,

    /// Recreate the category hierarchy as directories
    #[arg(long)]
    make_subdirs: bool,

    /// Seconds to pause after each download
    #[arg(long, value_name = "SECS")]
    url_sleep: Option<u64>,

    /// Maximum subcategory depth below the root
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show the resolved configuration without crawling
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Applies command-line flags on top of file and environment settings
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(dir) = &self.output_dir {
            config.output.output_dir = dir.clone();
        }
        if self.skip_subcats {
            config.crawler.skip_subcats = true;
        }
        if self.skip_pages {
            config.crawler.skip_pages = true;
        }
        if self.make_subdirs {
            config.output.make_subdirs = true;
        }
        if let Some(secs) = self.url_sleep {
            config.crawler.url_sleep = secs;
        }
        if let Some(depth) = self.max_depth {
            config.crawler.max_depth = Some(depth);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let Some(url) = cli.url.clone() else {
        eprintln!("{}", Cli::command().render_help());
        return Ok(());
    };

    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match resolve_config(cli.config.as_deref()) {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    if let Some(hash) = config_hash {
        tracing::info!("Configuration loaded (hash: {})", hash);
    }

    cli.apply_overrides(&mut config);
    validate(&config)?;

    if cli.dry_run {
        handle_dry_run(&config, &url);
        return Ok(());
    }

    handle_crawl(config, &url).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wikicat=info,warn"),
            1 => EnvFilter::new("wikicat=debug,info"),
            2 => EnvFilter::new("wikicat=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, url: &str) {
    println!("=== wikicat Dry Run ===\n");

    println!("Root: {}", url);

    println!("\nCrawler:");
    println!("  Follow subcategories: {}", !config.crawler.skip_subcats);
    println!("  Download pages: {}", !config.crawler.skip_pages);
    println!("  Pause after download: {}s", config.crawler.url_sleep);
    println!(
        "  Rate-limit retries: {} ({}ms apart)",
        config.crawler.max_retries, config.crawler.retry_pause_ms
    );
    match config.crawler.max_depth {
        Some(depth) => println!("  Max depth: {}", depth),
        None => println!("  Max depth: unlimited"),
    }

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Directory: {}", config.output.output_dir);
    println!("  Mirror subdirectories: {}", config.output.make_subdirs);

    println!("\nMarkers:");
    println!("  Subcategories: {}", config.markers.subcategories);
    println!("  Pages start: {}", config.markers.pages_start);
    println!("  Pages end: {}", config.markers.pages_end);
    println!("  Access denied: {}", config.markers.access_denied);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, url: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Writing to {}", config.output.output_dir);

    match crawl(config, url).await {
        Ok(stats) => {
            print_statistics(&stats);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
