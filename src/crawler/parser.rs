//! Line scanner for category listings
//!
//! Listings are not parsed as HTML. Each line is matched against the region
//! markers and a few link patterns, driving a small state machine:
//!
//! | Priority | Line matches | Effect |
//! |----------|--------------|--------|
//! | 1 | subcategories marker | state → `InSubcategories` |
//! | 2 | pages-start marker | state → `InPages` |
//! | 3 | pages-end marker | `InPages` → `Neutral` |
//! | 4 | `</table>` … `href` … `next N` … `</a>` | emit continuation, state → `Neutral` |
//! | 5 | `href="/wiki/Category:…"` while `InSubcategories` | emit subcategory |
//! | 6 | `<li>` … `href="/wiki/…"` while `InPages` | emit page |
//!
//! Rows 1–4 are exclusive (first match wins); rows 5 and 6 are then checked
//! against the updated state. Requiring `</table>` before the pagination
//! anchor skips "next" links that appear above the listing itself.

use crate::config::{compile_marker, MarkerConfig};
use crate::state::SectionState;
use crate::ConfigError;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use url::Url;

lazy_static! {
    static ref CONTINUATION_REGEX: Regex =
        Regex::new(r#"</table>.*href="([^"]+)".*>.*next (\d+).*</a>"#).unwrap();

    static ref SUBCATEGORY_REGEX: Regex =
        Regex::new(r#"href="(/wiki/Category:[^"]+)""#).unwrap();

    static ref PAGE_REGEX: Regex = Regex::new(r#"<li>.*href="(/wiki/[^"]+)""#).unwrap();
}

/// Kind of link found in a category listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// Another category below this one
    Subcategory,
    /// A member article
    Page,
    /// Next page of this same listing
    Continuation,
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Subcategory => "subcategory",
            Self::Page => "page",
            Self::Continuation => "continuation",
        };
        write!(f, "{}", name)
    }
}

/// A typed link extracted from a listing, resolved to an absolute URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub kind: LinkKind,
    pub url: Url,
}

/// Region-aware scanner built from the configured markers
#[derive(Debug, Clone)]
pub struct SectionParser {
    subcategories: Regex,
    pages_start: Regex,
    pages_end: Regex,
}

impl SectionParser {
    /// Compiles the region markers
    pub fn new(markers: &MarkerConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            subcategories: compile_marker(&markers.subcategories)?,
            pages_start: compile_marker(&markers.pages_start)?,
            pages_end: compile_marker(&markers.pages_end)?,
        })
    }

    /// Scans a whole document, returning its links in line order
    ///
    /// Relative hrefs are resolved against `base_url`. Malformed input never
    /// fails; at worst no links are returned.
    ///
    /// # Example
    ///
    /// ```
    /// use url::Url;
    /// use wikicat::config::MarkerConfig;
    /// use wikicat::crawler::{LinkKind, SectionParser};
    ///
    /// let parser = SectionParser::new(&MarkerConfig::default()).unwrap();
    /// let base = Url::parse("https://en.wikipedia.org/wiki/Category:Foo").unwrap();
    /// let html = "<h2>Pages in category Foo</h2>\n<li><a href=\"/wiki/Bar\">Bar</a></li>";
    ///
    /// let links = parser.parse(html, &base);
    /// assert_eq!(links.len(), 1);
    /// assert_eq!(links[0].kind, LinkKind::Page);
    /// assert_eq!(links[0].url.as_str(), "https://en.wikipedia.org/wiki/Bar");
    /// ```
    pub fn parse(&self, content: &str, base_url: &Url) -> Vec<LinkRecord> {
        let mut state = SectionState::Neutral;
        let mut links = Vec::new();

        for (line_num, line) in content.lines().enumerate() {
            let (next, link) = self.scan_line(state, line, base_url);
            if next != state {
                tracing::trace!("Line {}: {} -> {}", line_num + 1, state, next);
            }
            state = next;

            if let Some(link) = link {
                tracing::trace!("Line {}: {} link {}", line_num + 1, link.kind, link.url);
                links.push(link);
            }
        }

        links
    }

    /// Applies one line to the state machine
    ///
    /// Returns the new state and at most one link.
    pub fn scan_line(
        &self,
        state: SectionState,
        line: &str,
        base_url: &Url,
    ) -> (SectionState, Option<LinkRecord>) {
        let mut state = state;

        if self.subcategories.is_match(line) {
            state = SectionState::InSubcategories;
        } else if self.pages_start.is_match(line) {
            state = SectionState::InPages;
        } else if self.pages_end.is_match(line) {
            state = state.close_pages();
        } else if let Some(href) = capture(&CONTINUATION_REGEX, line) {
            let link = resolve_link(href, base_url).map(|url| LinkRecord {
                kind: LinkKind::Continuation,
                url,
            });
            return (SectionState::Neutral, link);
        }

        let link = if state.collects_subcategories() {
            capture(&SUBCATEGORY_REGEX, line)
                .and_then(|href| resolve_link(href, base_url))
                .map(|url| LinkRecord {
                    kind: LinkKind::Subcategory,
                    url,
                })
        } else if state.collects_pages() {
            capture(&PAGE_REGEX, line)
                .and_then(|href| resolve_link(href, base_url))
                .map(|url| LinkRecord {
                    kind: LinkKind::Page,
                    url,
                })
        } else {
            None
        };

        (state, link)
    }
}

fn capture<'a>(regex: &Regex, line: &'a str) -> Option<&'a str> {
    regex
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Resolves an href to an absolute http(s) URL
///
/// Listing markup escapes `&` in query strings as `&amp;`.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim().replace("&amp;", "&");
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    match base_url.join(&href) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(url),
        _ => None,
    }
}
