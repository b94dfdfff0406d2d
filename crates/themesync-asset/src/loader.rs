//! Reads accepted paths into assets through the filesystem port.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::{Stream, StreamExt};
use themesync_filter::{FileStream, FileSystem, LocalFs};

use crate::asset::Asset;
use crate::error::AssetError;

/// Loads files under a theme root as [`Asset`]s.
pub struct AssetLoader {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
}

impl AssetLoader {
    pub fn new(fs: Arc<dyn FileSystem>, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
        }
    }

    /// A loader reading from the local disk.
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(LocalFs), root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load one file, given relative to the root.
    ///
    /// The asset key is the relative path with `\` turned into `/`.
    pub async fn load(&self, relative: &str) -> Result<Asset, AssetError> {
        let path = self.root.join(relative);

        let meta = self
            .fs
            .stat(&path)
            .await
            .map_err(|source| AssetError::Read {
                path: path.clone(),
                source,
            })?;
        if meta.is_dir() {
            return Err(AssetError::IsDirectory { path });
        }

        let data = self
            .fs
            .read_file(&path)
            .await
            .map_err(|source| AssetError::Read {
                path: path.clone(),
                source,
            })?;

        let asset = Asset::from_bytes(relative.replace('\\', "/"), data);
        tracing::trace!(key = %asset.key, binary = asset.is_binary(), "loaded asset");
        Ok(asset)
    }

    /// Load every path of a file stream, in stream order.
    ///
    /// The stream's file set must be bound to this loader's root and emit
    /// `PathMode::Relative` paths.
    pub fn load_all(
        &self,
        paths: FileStream,
    ) -> impl Stream<Item = Result<Asset, AssetError>> + '_ {
        paths.then(move |path| async move { self.load(&path).await })
    }
}

impl std::fmt::Debug for AssetLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLoader")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}
