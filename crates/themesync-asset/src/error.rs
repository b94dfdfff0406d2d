use std::path::PathBuf;

use themesync_filter::FsError;
use thiserror::Error;

/// Errors loading a single asset.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("cannot read asset {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: FsError,
    },
    #[error("asset path {} is a directory", path.display())]
    IsDirectory { path: PathBuf },
}
