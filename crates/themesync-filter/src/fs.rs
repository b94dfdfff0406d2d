//! Filesystem port.
//!
//! The builder validates its directory and the walk lists entries only
//! through [`FileSystem`], so matching never touches the disk directly and
//! tests can substitute [`MemoryFs`](crate::MemoryFs).

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::FsError;

/// Kind of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
}

/// Metadata returned by [`FileSystem::stat`].
#[derive(Debug, Clone)]
pub struct Metadata {
    pub kind: EntryKind,
    /// Size in bytes (0 for directories).
    pub size: u64,
}

impl Metadata {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// A single entry returned by [`FileSystem::list_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name, not the full path.
    pub name: String,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
        }
    }

    pub fn symlink(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Symlink,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// An opened directory.
///
/// Not `Clone`: a `FileSet` owns its handle exclusively.
#[derive(Debug, PartialEq, Eq)]
pub struct DirHandle {
    path: PathBuf,
}

impl DirHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path the directory was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Minimal read-only filesystem capability.
///
/// Paths are passed through exactly as the caller supplied them;
/// implementations decide how to resolve them.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Metadata for `path`, following symlinks.
    async fn stat(&self, path: &Path) -> Result<Metadata, FsError>;

    /// Open a directory for walking.
    async fn open_dir(&self, path: &Path) -> Result<DirHandle, FsError>;

    /// Entries directly inside `path`, in no particular order.
    ///
    /// Entry kinds do not follow symlinks.
    async fn list_dir(&self, path: &Path) -> Result<Vec<DirEntry>, FsError>;

    /// Read a whole file into memory.
    async fn read_file(&self, path: &Path) -> Result<Vec<u8>, FsError>;
}
