//! The file set: an immutable, validated directory plus a matcher set,
//! enumerated as a lazy, cancellable stream.
//!
//! ```text
//!   files() ──spawn──▶ producer task (DFS walk through FileSystem)
//!                        │ bounded mpsc (backpressure)
//!                        ▼
//!                      FileStream ──▶ consumer
//!   cancel()/drop ──▶ CancellationToken, checked before every send
//!                     and before every directory descent
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{FsError, ParsePathModeError};
use crate::fs::{DirEntry, DirHandle, FileSystem};
use crate::matcher_set::MatcherSet;

/// Default number of paths buffered between the walk and its consumer.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// How accepted paths are rewritten before they are emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathMode {
    /// Relative to the file set's directory, `/`-separated.
    #[default]
    Relative,
    /// Absolute path of the entry (resolved lexically, not through symlinks).
    Absolute,
    /// The directory as given to the builder, joined with the entry.
    Unchanged,
}

impl PathMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            PathMode::Relative => "relative",
            PathMode::Absolute => "absolute",
            PathMode::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for PathMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PathMode {
    type Err = ParsePathModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relative" => Ok(PathMode::Relative),
            "absolute" => Ok(PathMode::Absolute),
            "unchanged" => Ok(PathMode::Unchanged),
            other => Err(ParsePathModeError(other.to_string())),
        }
    }
}

/// Enumeration settings of a `FileSet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSetSettings {
    pub paths_relative_to: PathMode,
    /// Paths buffered ahead of the consumer. Values below 1 are treated as 1.
    pub channel_capacity: usize,
}

impl Default for FileSetSettings {
    fn default() -> Self {
        Self {
            paths_relative_to: PathMode::default(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// A directory or entry the walk could not read and skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub error: String,
}

/// Result of a fully drained enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enumeration {
    /// Accepted paths in walk order.
    pub files: Vec<String>,
    /// Subtrees that were skipped because they could not be listed.
    pub skipped: Vec<SkippedEntry>,
}

/// A validated directory and the policy selecting files under it.
///
/// Only [`FileSetBuilder`](crate::FileSetBuilder) creates file sets. A file
/// set never changes after construction; any number of enumerations may run
/// against it concurrently, each with its own walk.
pub struct FileSet {
    dir: DirHandle,
    dir_name: Arc<str>,
    fs: Arc<dyn FileSystem>,
    matchers: Arc<MatcherSet>,
    settings: FileSetSettings,
}

impl FileSet {
    pub(crate) fn new(
        dir: DirHandle,
        fs: Arc<dyn FileSystem>,
        matchers: MatcherSet,
        settings: FileSetSettings,
    ) -> Self {
        Self {
            dir_name: dir_name(dir.path()),
            dir,
            fs,
            matchers: Arc::new(matchers),
            settings,
        }
    }

    /// The directory this set was built over.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn settings(&self) -> FileSetSettings {
        self.settings
    }

    pub fn matcher_set(&self) -> &MatcherSet {
        &self.matchers
    }

    /// True if `path` (relative to the directory, `/`-separated) would be
    /// selected by an enumeration.
    pub fn matches(&self, path: &str) -> bool {
        self.matchers.matches_entry(&self.dir_name, path)
    }

    /// Walk the directory and collect every accepted path in walk order.
    ///
    /// Each call walks the tree again.
    pub async fn all_files(&self) -> Vec<String> {
        self.all_files_with_report().await.files
    }

    /// Like [`all_files`](Self::all_files), also returning what was skipped.
    pub async fn all_files_with_report(&self) -> Enumeration {
        let mut stream = self.files();
        let mut files = Vec::new();
        while let Some(path) = stream.next_path().await {
            files.push(path);
        }
        stream.finished().await;
        Enumeration {
            files,
            skipped: stream.skipped(),
        }
    }

    /// Start a walk and return the stream of accepted, rewritten paths.
    ///
    /// The walk runs on its own task and is paused while the stream's buffer
    /// is full. Dropping or cancelling the stream stops it.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn files(&self) -> FileStream {
        let (tx, rx) = mpsc::channel(self.settings.channel_capacity.max(1));
        let cancel = CancellationToken::new();
        let skipped = Arc::new(Mutex::new(Vec::new()));

        let walk = Walk {
            fs: Arc::clone(&self.fs),
            root: self.dir.path().to_path_buf(),
            dir_name: Arc::clone(&self.dir_name),
            matchers: Arc::clone(&self.matchers),
            relativizer: Relativizer {
                mode: self.settings.paths_relative_to,
                root: self.dir.path().to_path_buf(),
            },
            tx,
            cancel: cancel.clone(),
            skipped: Arc::clone(&skipped),
        };
        let producer = tokio::spawn(walk.run());

        FileStream {
            rx,
            cancel,
            skipped,
            producer: Some(producer),
        }
    }
}

impl fmt::Debug for FileSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSet")
            .field("dir", &self.dir)
            .field("matchers", &self.matchers)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for FileSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FileSet{{dir={}; {}}}",
            self.dir.path().display(),
            self.matchers
        )
    }
}

/// Lazy stream of accepted paths from one walk.
///
/// Implements [`futures::Stream`]. Dropping the stream cancels the walk.
#[derive(Debug)]
pub struct FileStream {
    rx: mpsc::Receiver<String>,
    cancel: CancellationToken,
    skipped: Arc<Mutex<Vec<SkippedEntry>>>,
    producer: Option<JoinHandle<()>>,
}

impl FileStream {
    /// Receive the next path, or `None` once the walk has ended.
    pub async fn next_path(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Stop the walk. Paths already buffered may still be received.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// A handle that cancels this walk from elsewhere.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Entries skipped so far. Complete once the stream has ended.
    pub fn skipped(&self) -> Vec<SkippedEntry> {
        self.skipped
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Wait for the producer task to exit.
    ///
    /// Returns promptly after [`cancel`](Self::cancel); otherwise the walk
    /// only ends once the consumer has drained it.
    pub async fn finished(&mut self) {
        if let Some(producer) = self.producer.take()
            && let Err(err) = producer.await
        {
            tracing::warn!(error = %err, "file walk task failed");
        }
    }
}

impl Stream for FileStream {
    type Item = String;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<String>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl Drop for FileStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Path rewrite applied to accepted entries.
#[derive(Debug, Clone)]
struct Relativizer {
    mode: PathMode,
    root: PathBuf,
}

impl Relativizer {
    fn apply(&self, relative: &str) -> String {
        match self.mode {
            PathMode::Relative => relative.to_string(),
            PathMode::Unchanged => self.root.join(relative).to_string_lossy().into_owned(),
            PathMode::Absolute => {
                let joined = self.root.join(relative);
                std::path::absolute(&joined)
                    .unwrap_or(joined)
                    .to_string_lossy()
                    .into_owned()
            }
        }
    }
}

/// State owned by one producer task.
struct Walk {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    dir_name: Arc<str>,
    matchers: Arc<MatcherSet>,
    relativizer: Relativizer,
    tx: mpsc::Sender<String>,
    cancel: CancellationToken,
    skipped: Arc<Mutex<Vec<SkippedEntry>>>,
}

impl Walk {
    /// Preorder depth-first walk. Entries of each directory are visited in
    /// name order and a subdirectory is walked completely at the point its
    /// name sorts. Directories are never emitted.
    async fn run(self) {
        let mut emitted = 0usize;
        // Each frame: directory path relative to root, remaining entries
        let mut stack: Vec<(String, std::vec::IntoIter<DirEntry>)> = Vec::new();

        if let Some(entries) = self.list_sorted(&self.root).await {
            stack.push((String::new(), entries.into_iter()));
        }

        loop {
            let Some((prefix, entries)) = stack.last_mut() else {
                break;
            };
            let Some((relative, is_dir)) = entries
                .next()
                .map(|entry| (join_relative(prefix, &entry.name), entry.is_dir()))
            else {
                stack.pop();
                continue;
            };

            if is_dir {
                if self.cancel.is_cancelled() {
                    break;
                }
                if let Some(children) = self.list_sorted(&self.root.join(&relative)).await {
                    stack.push((relative, children.into_iter()));
                }
                continue;
            }

            if !self.matchers.matches_entry(&self.dir_name, &relative) {
                continue;
            }

            let path = self.relativizer.apply(&relative);
            tracing::trace!(path = %path, "accepted");

            if self.cancel.is_cancelled() {
                break;
            }
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                sent = self.tx.send(path) => {
                    if sent.is_err() {
                        // Receiver gone
                        break;
                    }
                }
            }
            emitted += 1;
        }

        tracing::debug!(
            root = %self.root.display(),
            emitted,
            cancelled = self.cancel.is_cancelled(),
            "file walk finished"
        );
    }

    /// List a directory sorted by name, recording a skip on failure.
    async fn list_sorted(&self, dir: &Path) -> Option<Vec<DirEntry>> {
        match self.fs.list_dir(dir).await {
            Ok(mut entries) => {
                entries.sort_by(|a, b| a.name.cmp(&b.name));
                Some(entries)
            }
            Err(err) => {
                self.record_skip(dir, &err);
                None
            }
        }
    }

    fn record_skip(&self, path: &Path, err: &FsError) {
        tracing::warn!(path = %path.display(), error = %err, "skipping unreadable directory");
        self.skipped
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SkippedEntry {
                path: path.to_path_buf(),
                error: err.to_string(),
            });
    }
}

/// Last component of the bound directory, `.` when it has none.
fn dir_name(path: &Path) -> Arc<str> {
    match path.file_name() {
        Some(name) => Arc::from(name.to_string_lossy().as_ref()),
        None => Arc::from("."),
    }
}

fn join_relative(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}
