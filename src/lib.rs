/*!
 * treecopy - Render selected files and folders as text
 *
 * Walks a selection of files and directories and produces either a directory
 * tree followed by the contents of every text file, or a compressed listing
 * of the selected paths grouped by directory.
 */

pub mod cancel;
pub mod classify;
pub mod common_dir;
pub mod compress;
pub mod config;
pub mod error;
pub mod listing;
pub mod logger;
pub mod report;
pub mod types;
pub mod utils;
pub mod walker;
pub mod writer;


use std::path::Path;
use std::sync::Arc;

use indicatif::ProgressBar;

// Re-export main components for easier access
pub use cancel::CancellationToken;
pub use common_dir::{common_ancestor, resolve_common_directory};
pub use compress::{CompressionLevel, DirectoryMap, PathCompressor};
pub use config::{Config, WalkOptions};
pub use error::{Result, TreeCopyError};
pub use report::{ExtractionReport, Reporter, TextStats};
pub use types::{ContentBlock, Entry, EntryKind, Selection, TraversalResult, TreeLine};
pub use walker::TreeWalker;
pub use writer::{ContextWriter, OutputFormat};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Walk `roots` and collect tree lines and text file contents.
///
/// Displayed paths are relative to `base_path`, or to the common ancestor of
/// the roots when it is `None`.
pub fn walk_selection<P: AsRef<Path>>(
    roots: &[P],
    base_path: Option<&Path>,
    options: &WalkOptions,
) -> Result<TraversalResult> {
    let selection = Selection::new(roots)?;
    let walker = TreeWalker::new(options.clone(), Arc::new(ProgressBar::hidden()));
    walker.walk(&selection, base_path)
}

/// Render `roots` as a compressed path listing anchored near `candidate_root`
pub fn compress_selection<P: AsRef<Path>>(
    roots: &[P],
    candidate_root: &Path,
    level: CompressionLevel,
    options: &WalkOptions,
) -> Result<String> {
    let selection = Selection::new(roots)?;
    let candidate_root = std::fs::canonicalize(candidate_root)
        .map_err(|_| TreeCopyError::PathNotFound(candidate_root.display().to_string()))?;

    PathCompressor::new(options.clone()).compress(&selection, &candidate_root, level)
}
