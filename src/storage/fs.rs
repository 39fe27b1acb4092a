use crate::storage::traits::{Storage, StorageError, StorageResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Filesystem storage rooted at the output directory
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    /// Creates storage rooted at `root`, creating the directory if needed
    pub fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StorageError::CreateDir {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Joins a relative path onto the root, refusing `..` and absolute paths
    fn full_path(&self, path: &Path) -> StorageResult<PathBuf> {
        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(StorageError::OutsideRoot(path.to_path_buf()));
        }
        Ok(self.root.join(path))
    }
}

impl Storage for FsStorage {
    fn read_cached(&self, path: &Path) -> StorageResult<Option<String>> {
        let full = self.full_path(path)?;
        match fs::read(&full) {
            Ok(bytes) if bytes.is_empty() => Ok(None),
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read { path: full, source }),
        }
    }

    fn write(&self, path: &Path, content: &str) -> StorageResult<()> {
        let full = self.full_path(path)?;
        tracing::debug!("Writing {}", full.display());

        let result = if content.ends_with('\n') {
            fs::write(&full, content)
        } else {
            fs::write(&full, format!("{}\n", content))
        };

        result.map_err(|source| StorageError::Write { path: full, source })
    }

    fn ensure_dir(&self, path: &Path) -> StorageResult<()> {
        let full = self.full_path(path)?;
        fs::create_dir_all(&full).map_err(|source| StorageError::CreateDir { path: full, source })
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}
