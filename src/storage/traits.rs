//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Path escapes the output directory: {0}")]
    OutsideRoot(PathBuf),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// All paths are relative to the backend's output root.
pub trait Storage {
    /// Returns previously stored content, if any
    ///
    /// Missing and empty files both yield `Ok(None)`.
    fn read_cached(&self, path: &Path) -> StorageResult<Option<String>>;

    /// Creates or overwrites a document
    ///
    /// A trailing newline is appended when the content lacks one.
    fn write(&self, path: &Path, content: &str) -> StorageResult<()>;

    /// Creates a directory (and its parents) for mirrored categories
    fn ensure_dir(&self, path: &Path) -> StorageResult<()>;

    /// Absolute location of a relative path, for log messages
    fn resolve(&self, path: &Path) -> PathBuf;
}
