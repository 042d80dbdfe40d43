//! Flat file storage confined to one root directory.
//!
//! Names are plain basenames: no separators, no `.`/`..`. Every operation
//! goes through a directory-wide lock so that concurrent connections never
//! observe a half-written upload or race a delete against a read.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid file name {0:?}")]
    InvalidName(String),

    #[error("file {0:?} not found")]
    NotFound(String),

    #[error("{0:?} is not a regular file")]
    NotAFile(String),

    #[error("storage I/O error on {name:?}: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    fn io(name: &str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            return StorageError::NotFound(name.to_string());
        }
        StorageError::Io {
            name: name.to_string(),
            source,
        }
    }
}

/// Handle to the storage root. Cheap to clone; clones share the lock.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
    lock: Arc<RwLock<()>>,
}

impl Storage {
    /// Opens `root`, creating it if it does not exist yet.
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            lock: Arc::new(RwLock::new(())),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of the regular files in the root, sorted.
    pub fn list(&self) -> Result<Vec<String>, StorageError> {
        let _guard = self.read_lock();

        let entries = fs::read_dir(&self.root).map_err(|e| StorageError::io(".", e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io(".", e))?;
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            // Temporary upload files are not part of the listing.
            match entry.file_name().into_string() {
                Ok(name) if !is_temp_name(&name) => names.push(name),
                Ok(_) => {}
                Err(raw) => tracing::debug!(name = ?raw, "skipping non UTF-8 file name"),
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn exists(&self, name: &str) -> bool {
        let Ok(path) = self.resolve(name) else {
            return false;
        };
        let _guard = self.read_lock();
        path.is_file()
    }

    /// Reads the whole file. Directories and other non-regular entries are
    /// reported as [`StorageError::NotAFile`].
    pub fn read(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(name)?;
        let _guard = self.read_lock();

        let meta = fs::metadata(&path).map_err(|e| StorageError::io(name, e))?;
        if !meta.is_file() {
            return Err(StorageError::NotAFile(name.to_string()));
        }
        fs::read(&path).map_err(|e| StorageError::io(name, e))
    }

    /// Writes `content` under `name`, replacing any existing file.
    ///
    /// The bytes go to a temporary sibling first and are renamed into place.
    pub fn write(&self, name: &str, content: &[u8]) -> Result<(), StorageError> {
        let path = self.resolve(name)?;
        let tmp = self.root.join(format!("{TEMP_PREFIX}{name}"));
        let _guard = self.write_lock();

        fs::write(&tmp, content).map_err(|e| StorageError::io(name, e))?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(StorageError::io(name, e));
        }
        Ok(())
    }

    pub fn delete(&self, name: &str) -> Result<(), StorageError> {
        let path = self.resolve(name)?;
        let _guard = self.write_lock();

        let meta = fs::symlink_metadata(&path).map_err(|e| StorageError::io(name, e))?;
        if meta.is_dir() {
            return Err(StorageError::NotAFile(name.to_string()));
        }
        fs::remove_file(&path).map_err(|e| StorageError::io(name, e))
    }

    /// Maps a stored name to its path under the root.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, StorageError> {
        if !is_valid_name(name) {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    fn read_lock(&self) -> RwLockReadGuard<'_, ()> {
        // The lock guards no data, so a poisoned lock is still usable.
        self.lock.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write().unwrap_or_else(|e| e.into_inner())
    }
}

const TEMP_PREFIX: &str = ".upload-";

fn is_temp_name(name: &str) -> bool {
    name.starts_with(TEMP_PREFIX)
}

/// A flat, non-empty name without separators or dot components.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !is_temp_name(name)
        && !name.contains(['/', '\\', '\0'])
}

/// Last path component of a client supplied filename, using either
/// separator style.
pub fn basename(filename: &str) -> &str {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_traversal_names() {
        for name in ["", ".", "..", "../x", "a/b", "a\\b", "nul\0", ".upload-a.txt"] {
            assert!(!is_valid_name(name), "{name:?} should be rejected");
        }
        assert!(is_valid_name("a.txt"));
        assert!(is_valid_name(".hidden"));
    }

    #[test]
    fn basename_strips_both_separator_styles() {
        assert_eq!(basename("a.txt"), "a.txt");
        assert_eq!(basename("/etc/passwd"), "passwd");
        assert_eq!(basename("C:\\Users\\me\\photo.png"), "photo.png");
        assert_eq!(basename("dir/"), "");
    }
}
