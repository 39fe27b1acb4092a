//! URL handling module for wikicat
//!
//! This module provides URL normalization for the visited set and the
//! derivation of output filenames from URLs.

mod filename;
mod normalize;

pub use filename::{
    article_file_name, category_dir_name, category_file_name, sanitize_article_name,
    sanitize_category_name, HTML_EXTENSION,
};
pub use normalize::{normalize, normalize_url};
