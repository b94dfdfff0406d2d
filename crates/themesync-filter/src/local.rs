//! Real filesystem implementation of the port, backed by `tokio::fs`.

use std::path::Path;

use async_trait::async_trait;
use tokio::fs;

use crate::error::FsError;
use crate::fs::{DirEntry, DirHandle, EntryKind, FileSystem, Metadata};

/// The local disk. Paths are used as given, relative paths resolve
/// against the process working directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

fn kind_of(file_type: std::fs::FileType) -> EntryKind {
    if file_type.is_dir() {
        EntryKind::Directory
    } else if file_type.is_symlink() {
        EntryKind::Symlink
    } else {
        EntryKind::File
    }
}

#[async_trait]
impl FileSystem for LocalFs {
    async fn stat(&self, path: &Path) -> Result<Metadata, FsError> {
        let meta = fs::metadata(path)
            .await
            .map_err(|e| FsError::from_io(path, &e))?;
        Ok(Metadata {
            kind: kind_of(meta.file_type()),
            size: if meta.is_dir() { 0 } else { meta.len() },
        })
    }

    async fn open_dir(&self, path: &Path) -> Result<DirHandle, FsError> {
        // Opening proves the directory is readable; the walk re-lists it.
        fs::read_dir(path)
            .await
            .map_err(|e| FsError::from_io(path, &e))?;
        Ok(DirHandle::new(path))
    }

    async fn list_dir(&self, path: &Path) -> Result<Vec<DirEntry>, FsError> {
        let mut dir = fs::read_dir(path)
            .await
            .map_err(|e| FsError::from_io(path, &e))?;
        let mut entries = Vec::new();

        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| FsError::from_io(path, &e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| FsError::from_io(&entry.path(), &e))?;
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind: kind_of(file_type),
            });
        }

        Ok(entries)
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        fs::read(path).await.map_err(|e| FsError::from_io(path, &e))
    }
}
