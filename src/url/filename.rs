//! Output filename derivation
//!
//! Category listings and articles use different substitution rules:
//!
//! | Kind     | Replaced with `_`        | Kept     |
//! |----------|--------------------------|----------|
//! | Category | space, `&`, `;`, `/`     | `:`      |
//! | Article  | space, `:`, `/`          | `&`, `;` |
//!
//! Names are percent-decoded first so `%20` and a literal space agree.

use std::borrow::Cow;
use url::Url;

/// Extension given to every downloaded document
pub const HTML_EXTENSION: &str = ".html";

/// Fallback stem when a URL has no usable path segment
const INDEX_STEM: &str = "index";

/// Path prefix of title URLs
const TITLE_PREFIX: &str = "/wiki/";

/// Filename for a category listing page
///
/// # Examples
///
/// ```
/// use url::Url;
/// use wikicat::url::category_file_name;
///
/// let url = Url::parse("https://en.wikipedia.org/wiki/Category:Baseball%20players").unwrap();
/// assert_eq!(category_file_name(&url), "Category:Baseball_players.html");
/// ```
pub fn category_file_name(url: &Url) -> String {
    format!("{}{}", category_dir_name(url), HTML_EXTENSION)
}

/// Directory name used when mirroring a category in the output tree
///
/// Built from the whole title after `/wiki/`, so titles containing `/` stay
/// distinct.
pub fn category_dir_name(url: &Url) -> String {
    sanitize_category_name(&url_tail(url))
}

/// Filename for an article page
pub fn article_file_name(url: &Url) -> String {
    format!("{}{}", sanitize_article_name(&slug(url)), HTML_EXTENSION)
}

/// Replaces characters not allowed in category filenames
pub fn sanitize_category_name(name: &str) -> String {
    non_empty(name.replace([' ', '&', ';', '/'], "_"))
}

/// Replaces characters not allowed in article filenames
pub fn sanitize_article_name(name: &str) -> String {
    non_empty(name.replace([' ', ':', '/'], "_"))
}

/// Title slug plus the query, percent-decoded
///
/// The query is kept so continuation pages of one listing get distinct names.
fn url_tail(url: &Url) -> String {
    let title = slug(url);
    match url.query() {
        Some(query) if !query.is_empty() => format!("{}?{}", title, decode(query)),
        _ => title,
    }
}

/// Everything after `/wiki/`, or the last segment for other paths
fn slug(url: &Url) -> String {
    match url.path().strip_prefix(TITLE_PREFIX) {
        Some(slug) if !slug.is_empty() => decode(slug),
        _ => decode(last_segment(url)),
    }
}

fn last_segment(url: &Url) -> &str {
    url.path().rsplit('/').next().unwrap_or_default()
}

fn decode(text: &str) -> String {
    urlencoding::decode(text)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| text.to_string())
}

fn non_empty(name: String) -> String {
    if name.is_empty() {
        INDEX_STEM.to_string()
    } else {
        name
    }
}
