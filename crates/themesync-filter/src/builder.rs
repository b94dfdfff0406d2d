//! Fluent construction of a [`FileSet`].

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::BuildError;
use crate::fileset::{FileSet, FileSetSettings, PathMode};
use crate::fs::FileSystem;
use crate::local::LocalFs;
use crate::matcher::Matcher;
use crate::matcher_set::MatcherSet;

/// Editor and OS droppings excluded by [`FileSetBuilder::with_default_excludes`].
pub const DEFAULT_EXCLUDES: &[&str] = &["*/.DS_Store", "*/.AppleDouble", "*.swp", "*~"];

/// Include used when none is given.
const CATCH_ALL: &str = "*";

/// The exclude list added by `with_default_excludes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultExcludes(Vec<String>);

impl DefaultExcludes {
    /// [`DEFAULT_EXCLUDES`].
    pub fn standard() -> Self {
        Self::from_patterns(DEFAULT_EXCLUDES.iter().copied())
    }

    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(patterns.into_iter().map(Into::into).collect())
    }

    pub fn patterns(&self) -> &[String] {
        &self.0
    }
}

impl Default for DefaultExcludes {
    fn default() -> Self {
        Self::standard()
    }
}

/// Collects a directory and patterns, then validates them into a
/// [`FileSet`].
///
/// ```no_run
/// # async fn demo() -> Result<(), themesync_filter::BuildError> {
/// use themesync_filter::{FileSetBuilder, PathMode};
///
/// let set = FileSetBuilder::new()
///     .in_dir("theme")
///     .with_exclude(["*.min.js"])
///     .with_default_excludes()
///     .paths_relative_to(PathMode::Unchanged)
///     .build()
///     .await?;
/// for path in set.all_files().await {
///     println!("{path}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct FileSetBuilder {
    dir: Option<PathBuf>,
    includes: Vec<String>,
    excludes: Vec<String>,
    include_matchers: Vec<Matcher>,
    exclude_matchers: Vec<Matcher>,
    default_excludes: DefaultExcludes,
    fs: Arc<dyn FileSystem>,
    settings: FileSetSettings,
}

impl Default for FileSetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSetBuilder {
    pub fn new() -> Self {
        Self {
            dir: None,
            includes: Vec::new(),
            excludes: Vec::new(),
            include_matchers: Vec::new(),
            exclude_matchers: Vec::new(),
            default_excludes: DefaultExcludes::standard(),
            fs: Arc::new(LocalFs),
            settings: FileSetSettings::default(),
        }
    }

    /// Directory to enumerate. A later call replaces an earlier one.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Add include globs. Duplicates are ignored.
    pub fn with_include<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        add_unique(&mut self.includes, patterns);
        self
    }

    /// Add exclude globs. Duplicates are ignored.
    pub fn with_exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        add_unique(&mut self.excludes, patterns);
        self
    }

    /// Add the default exclude list to the excludes.
    pub fn with_default_excludes(mut self) -> Self {
        let defaults = self.default_excludes.patterns().to_vec();
        add_unique(&mut self.excludes, defaults);
        self
    }

    /// Replace the list `with_default_excludes` adds.
    pub fn with_default_exclude_list(mut self, list: DefaultExcludes) -> Self {
        self.default_excludes = list;
        self
    }

    pub fn default_excludes(&self) -> &DefaultExcludes {
        &self.default_excludes
    }

    pub fn with_include_matcher(mut self, matcher: Matcher) -> Self {
        self.include_matchers.push(matcher);
        self
    }

    pub fn with_exclude_matcher(mut self, matcher: Matcher) -> Self {
        self.exclude_matchers.push(matcher);
        self
    }

    /// Filesystem used to validate and walk the directory.
    /// Defaults to [`LocalFs`].
    pub fn with_filesystem(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_settings(mut self, settings: FileSetSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn paths_relative_to(mut self, mode: PathMode) -> Self {
        self.settings.paths_relative_to = mode;
        self
    }

    /// Validate the directory and assemble the file set.
    ///
    /// With no include patterns or include matchers, everything not
    /// excluded is selected.
    #[tracing::instrument(level = "debug", skip(self), fields(dir = ?self.dir), err)]
    pub async fn build(self) -> Result<FileSet, BuildError> {
        let FileSetBuilder {
            dir,
            mut includes,
            excludes,
            include_matchers,
            exclude_matchers,
            default_excludes: _,
            fs,
            settings,
        } = self;

        let dir = dir.ok_or(BuildError::MissingDirectory)?;

        let meta = fs.stat(&dir).await.map_err(|source| BuildError::Stat {
            path: dir.clone(),
            source,
        })?;
        if !meta.is_dir() {
            return Err(BuildError::NotADirectory { path: dir });
        }

        let handle = fs.open_dir(&dir).await.map_err(|source| BuildError::Open {
            path: dir.clone(),
            source,
        })?;

        if includes.is_empty() && include_matchers.is_empty() {
            includes.push(CATCH_ALL.to_string());
        }

        let mut matchers = MatcherSet::new();
        for pattern in &includes {
            matchers.add_include(Matcher::glob(pattern));
        }
        for matcher in include_matchers {
            matchers.add_include(matcher);
        }
        for pattern in &excludes {
            matchers.add_exclude(Matcher::glob(pattern));
        }
        for matcher in exclude_matchers {
            matchers.add_exclude(matcher);
        }

        tracing::debug!(%matchers, mode = %settings.paths_relative_to, "file set built");
        Ok(FileSet::new(handle, fs, matchers, settings))
    }
}

fn add_unique<I, S>(into: &mut Vec<String>, patterns: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    for pattern in patterns {
        let pattern = pattern.into();
        if !into.contains(&pattern) {
            into.push(pattern);
        }
    }
}
