use std::collections::HashSet;
use url::Url;

/// Normalized URLs already submitted to the crawler
///
/// The set only grows. [`VisitedSet::insert`] is a single check-and-set so a
/// URL is claimed before it is fetched.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a URL, returning false if it was already claimed
    pub fn insert(&mut self, url: &Url) -> bool {
        self.urls.insert(url.as_str().to_string())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
