//! Storage module for persisting downloaded documents
//!
//! This module handles writing category listings and articles to disk under
//! sanitized filenames, and reading back earlier downloads so they are not
//! fetched again.

mod fs;
mod traits;

pub use fs::FsStorage;
pub use traits::{Storage, StorageError, StorageResult};

use std::path::Path;

/// Opens filesystem storage rooted at the output directory
pub fn open_storage(root: &Path) -> StorageResult<FsStorage> {
    FsStorage::new(root)
}
