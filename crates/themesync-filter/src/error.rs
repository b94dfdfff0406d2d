//! Error types for the filter crate.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from the filesystem port.
#[derive(Debug, Clone, Error)]
pub enum FsError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("not a directory: {0}")]
    NotADirectory(String),
    #[error("io error: {0}")]
    Io(String),
}

impl FsError {
    /// Map an `io::Error` for `path` onto the port's error kinds.
    pub fn from_io(path: &std::path::Path, err: &io::Error) -> Self {
        let shown = path.display().to_string();
        match err.kind() {
            io::ErrorKind::NotFound => FsError::NotFound(shown),
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied(shown),
            io::ErrorKind::NotADirectory => FsError::NotADirectory(shown),
            _ => FsError::Io(format!("{shown}: {err}")),
        }
    }
}

/// Errors raised while turning a builder into a `FileSet`.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no directory given; call in_dir() before build()")]
    MissingDirectory,
    #[error("cannot stat {}: {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: FsError,
    },
    #[error("provided path {} is not a directory", path.display())]
    NotADirectory { path: PathBuf },
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: FsError,
    },
}

/// Errors when compiling a matcher from a user-supplied pattern.
#[derive(Debug, Clone, Error)]
pub enum PatternError {
    #[error("invalid regex {pattern:?}: {message}")]
    Regex { pattern: String, message: String },
}

/// Errors a matcher may report while testing a path.
///
/// None of the built-in matchers fail; the variant exists for matchers
/// that have to consult the filesystem.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum MatchError {
    #[error("matcher i/o failed: {0}")]
    Io(String),
}

/// Unknown path-rewrite identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown path mode {0:?} (expected relative, absolute or unchanged)")]
pub struct ParsePathModeError(pub String);

/// Errors loading a `FileSetConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("channel_capacity must be at least 1")]
    InvalidCapacity,
}
