//! themesync-asset: turns accepted theme files into uploadable assets.
//!
//! Text files are carried as UTF-8 in `value`, everything else as base64
//! in `attachment`. Paths come from a `themesync_filter::FileSet`; this
//! crate never decides which files belong to a theme.

mod asset;
mod error;
mod loader;

pub use asset::{Asset, ContentKind, classify};
pub use error::AssetError;
pub use loader::AssetLoader;
