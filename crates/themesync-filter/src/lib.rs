//! themesync-filter: file selection for theme synchronization.
//!
//! Provides:
//! - **Matcher**: glob, regex, always and never predicates over path strings
//! - **MatcherSet**: include matchers AND-NOT exclude matchers
//! - **FileSetBuilder**: validates a directory and compiles patterns into a `FileSet`
//! - **FileSet**: enumerates accepted files as a list or a cancellable `FileStream`
//! - **FileSetConfig**: the same, described in TOML
//!
//! All directory access goes through `FileSystem`, a minimal read-only
//! async port. `LocalFs` talks to the disk, `MemoryFs` keeps a tree in
//! memory.

mod builder;
mod config;
mod error;
mod fileset;
mod fs;
pub mod glob;
mod local;
mod matcher;
mod matcher_set;
mod memory;

pub use builder::{DEFAULT_EXCLUDES, DefaultExcludes, FileSetBuilder};
pub use config::FileSetConfig;
pub use error::{
    BuildError, ConfigError, FsError, MatchError, ParsePathModeError, PatternError,
};
pub use fileset::{
    DEFAULT_CHANNEL_CAPACITY, Enumeration, FileSet, FileSetSettings, FileStream, PathMode,
    SkippedEntry,
};
pub use fs::{DirEntry, DirHandle, EntryKind, FileSystem, Metadata};
pub use glob::{GlobPattern, glob_match};
pub use local::LocalFs;
pub use matcher::{Matcher, Matchers, RegexMatcher};
pub use matcher_set::MatcherSet;
pub use memory::MemoryFs;
