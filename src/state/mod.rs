//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `SectionState`: Region of a category listing the line scanner is inside
//! - `VisitedSet`: Normalized URLs already claimed by the crawl

mod section_state;
mod visited;

pub use section_state::SectionState;
pub use visited::VisitedSet;
