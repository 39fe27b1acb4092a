//! Region state for scanning a category listing
//!
//! Each fetched document starts in `Neutral`; the state never carries over
//! from one document to the next.
use std::fmt;

/// Which region of a category listing the scanner is currently inside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SectionState {
    /// Outside any link region
    #[default]
    Neutral,

    /// Inside the subcategories region; category links are collected
    InSubcategories,

    /// Inside the member pages region; list-item links are collected
    InPages,
}

impl SectionState {
    /// Returns true if subcategory links may be emitted in this state
    pub fn collects_subcategories(&self) -> bool {
        matches!(self, Self::InSubcategories)
    }

    /// Returns true if page links may be emitted in this state
    pub fn collects_pages(&self) -> bool {
        matches!(self, Self::InPages)
    }

    /// State after a pages-end marker: only the pages region is closed
    pub fn close_pages(self) -> Self {
        match self {
            Self::InPages => Self::Neutral,
            other => other,
        }
    }

    /// Short name used in trace output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::InSubcategories => "subcategories",
            Self::InPages => "pages",
        }
    }
}

impl fmt::Display for SectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
