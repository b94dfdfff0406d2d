//! In-memory implementation of the port.
//!
//! Used for tests and for embedding callers that keep a theme in memory.
//! All data is lost when dropped.

use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::error::FsError;
use crate::fs::{DirEntry, DirHandle, EntryKind, FileSystem, Metadata};

#[derive(Debug, Clone)]
enum Entry {
    File(Vec<u8>),
    Directory,
}

/// In-memory filesystem.
///
/// Paths are normalized (leading `/`, `.` and `..` resolved), so `/theme`
/// and `theme` name the same directory. Paths marked with
/// [`deny`](MemoryFs::deny) fail every operation with
/// `FsError::PermissionDenied`.
#[derive(Debug)]
pub struct MemoryFs {
    entries: RwLock<HashMap<PathBuf, Entry>>,
    denied: RwLock<HashSet<PathBuf>>,
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFs {
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        // Root directory always exists
        entries.insert(PathBuf::new(), Entry::Directory);
        Self {
            entries: RwLock::new(entries),
            denied: RwLock::new(HashSet::new()),
        }
    }

    /// Add a file, creating parent directories.
    pub fn add_file(&self, path: impl AsRef<Path>, data: impl Into<Vec<u8>>) -> &Self {
        let path = Self::normalize(path.as_ref());
        self.ensure_parents(&path);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, Entry::File(data.into()));
        self
    }

    /// Add a directory and its parents.
    pub fn add_dir(&self, path: impl AsRef<Path>) -> &Self {
        let path = Self::normalize(path.as_ref());
        self.ensure_parents(&path);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, Entry::Directory);
        self
    }

    /// Make every operation on `path` fail with a permission error.
    pub fn deny(&self, path: impl AsRef<Path>) -> &Self {
        self.denied
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(Self::normalize(path.as_ref()));
        self
    }

    /// Normalize a path: drop the root, resolve `.` and `..`.
    fn normalize(path: &Path) -> PathBuf {
        let mut result = PathBuf::new();
        for component in path.components() {
            match component {
                Component::ParentDir => {
                    result.pop();
                }
                Component::Normal(s) => result.push(s),
                Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
            }
        }
        result
    }

    fn ensure_parents(&self, path: &Path) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut current = PathBuf::new();
        for component in path.parent().into_iter().flat_map(|p| p.components()) {
            if let Component::Normal(s) = component {
                current.push(s);
                entries.entry(current.clone()).or_insert(Entry::Directory);
            }
        }
    }

    fn check_access(&self, original: &Path, normalized: &Path) -> Result<(), FsError> {
        let denied = self.denied.read().unwrap_or_else(PoisonError::into_inner);
        if denied.contains(normalized) {
            return Err(FsError::PermissionDenied(original.display().to_string()));
        }
        Ok(())
    }

    fn lookup(&self, path: &Path) -> Result<(PathBuf, Entry), FsError> {
        let normalized = Self::normalize(path);
        self.check_access(path, &normalized)?;
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        match entries.get(&normalized) {
            Some(entry) => Ok((normalized, entry.clone())),
            None => Err(FsError::NotFound(path.display().to_string())),
        }
    }
}

#[async_trait]
impl FileSystem for MemoryFs {
    async fn stat(&self, path: &Path) -> Result<Metadata, FsError> {
        let (_, entry) = self.lookup(path)?;
        Ok(match entry {
            Entry::File(data) => Metadata {
                kind: EntryKind::File,
                size: data.len() as u64,
            },
            Entry::Directory => Metadata {
                kind: EntryKind::Directory,
                size: 0,
            },
        })
    }

    async fn open_dir(&self, path: &Path) -> Result<DirHandle, FsError> {
        match self.lookup(path)? {
            (_, Entry::Directory) => Ok(DirHandle::new(path)),
            (_, Entry::File(_)) => Err(FsError::NotADirectory(path.display().to_string())),
        }
    }

    async fn list_dir(&self, path: &Path) -> Result<Vec<DirEntry>, FsError> {
        let normalized = match self.lookup(path)? {
            (normalized, Entry::Directory) => normalized,
            (_, Entry::File(_)) => {
                return Err(FsError::NotADirectory(path.display().to_string()));
            }
        };

        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let listed = entries
            .iter()
            .filter(|(child, _)| {
                child.parent() == Some(normalized.as_path()) && **child != normalized
            })
            .filter_map(|(child, entry)| {
                let name = child.file_name()?.to_string_lossy().into_owned();
                Some(match entry {
                    Entry::File(_) => DirEntry::file(name),
                    Entry::Directory => DirEntry::directory(name),
                })
            })
            .collect();
        Ok(listed)
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        match self.lookup(path)? {
            (_, Entry::File(data)) => Ok(data),
            (_, Entry::Directory) => Err(FsError::Io(format!(
                "{}: is a directory",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn files_create_parent_directories() {
        let fs = MemoryFs::new();
        fs.add_file("/theme/assets/theme.css", "body {}");

        assert!(fs.stat(Path::new("/theme")).await.unwrap().is_dir());
        assert!(fs.stat(Path::new("theme/assets")).await.unwrap().is_dir());
        let meta = fs.stat(Path::new("/theme/assets/theme.css")).await.unwrap();
        assert!(meta.is_file());
        assert_eq!(meta.size, 7);
    }

    #[tokio::test]
    async fn list_dir_returns_direct_children_only() {
        let fs = MemoryFs::new();
        fs.add_file("/t/a.txt", "a")
            .add_file("/t/sub/b.txt", "b")
            .add_dir("/t/empty");

        let mut entries = fs.list_dir(Path::new("/t")).await.unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(
            entries,
            vec![
                DirEntry::file("a.txt"),
                DirEntry::directory("empty"),
                DirEntry::directory("sub"),
            ]
        );
    }

    #[tokio::test]
    async fn root_lists_top_level() {
        let fs = MemoryFs::new();
        fs.add_file("/top.txt", "x");

        let entries = fs.list_dir(Path::new("/")).await.unwrap();
        assert_eq!(entries, vec![DirEntry::file("top.txt")]);
    }

    #[tokio::test]
    async fn denied_paths_fail() {
        let fs = MemoryFs::new();
        fs.add_dir("/locked").deny("/locked");

        let err = fs.list_dir(Path::new("/locked")).await.unwrap_err();
        assert!(matches!(err, FsError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn open_dir_rejects_files() {
        let fs = MemoryFs::new();
        fs.add_file("/file.txt", "x");

        let err = fs.open_dir(Path::new("/file.txt")).await.unwrap_err();
        assert!(matches!(err, FsError::NotADirectory(_)));
        assert!(matches!(
            fs.open_dir(Path::new("/missing")).await,
            Err(FsError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn read_file_returns_contents() {
        let fs = MemoryFs::new();
        fs.add_file("a/b.liquid", "{{ x }}");
        assert_eq!(fs.read_file(Path::new("/a/b.liquid")).await.unwrap(), b"{{ x }}");
        assert!(fs.read_file(Path::new("/a")).await.is_err());
    }
}
