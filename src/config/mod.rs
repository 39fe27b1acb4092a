//! Configuration module for wikicat
//!
//! Settings are resolved once at startup from built-in defaults, an optional
//! TOML file and environment overrides, then shared read-only by the crawler.
//!
//! # Example
//!
//! ```no_run
//! use wikicat::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("wikicat.toml")).unwrap();
//! println!("Pages go to: {}", config.output.output_dir);
//! ```

mod env;
mod parser;
mod types;
mod validation;

pub use types::{Config, CrawlerConfig, MarkerConfig, OutputConfig, UserAgentConfig};

pub use env::{apply_env_overrides, apply_overrides_from, to_bool};
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_config, resolve_config,
};
pub use validation::{compile_marker, validate};
