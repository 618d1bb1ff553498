/*!
 * Selection walking: tree lines plus the contents of every text file
 */

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::ProgressBar;
use log::{debug, warn};
use rayon::prelude::*;

use crate::cancel::CancellationToken;
use crate::classify::{self, SNIFF_LEN};
use crate::common_dir::common_ancestor;
use crate::config::WalkOptions;
use crate::error::{Result, TreeCopyError};
use crate::listing::{list_children, Child};
use crate::types::{
    ContentBlock, Diagnostic, Entry, EntryKind, Selection, TraversalResult, TreeLine,
};
use crate::utils::{file_name, format_file_size, relative_slash_path};

/// Outcome of reading and classifying one file
#[derive(Debug)]
struct FileRead {
    path: PathBuf,
    name: String,
    kind: EntryKind,
    /// Block content for text files, error message for unreadable ones
    text: String,
}

/// Walker over a selection of files and directories
pub struct TreeWalker {
    /// Filtering options
    options: WalkOptions,
    /// Progress bar, ticked once per file
    pub progress: Arc<ProgressBar>,
    /// Checked before each root and each directory descent
    cancel: CancellationToken,
}

impl TreeWalker {
    /// Create a new walker
    pub fn new(options: WalkOptions, progress: Arc<ProgressBar>) -> Self {
        Self {
            options,
            progress,
            cancel: CancellationToken::new(),
        }
    }

    /// Abandon the walk once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Walk every root of `selection` in order.
    ///
    /// Paths in the result are relative to `base_path`, or to the common
    /// ancestor of the selection when none is given.
    pub fn walk(
        &self,
        selection: &Selection,
        base_path: Option<&Path>,
    ) -> Result<TraversalResult> {
        let base = match base_path {
            Some(base) => fs::canonicalize(base)
                .map_err(|_| TreeCopyError::PathNotFound(base.display().to_string()))?,
            None => default_base_path(selection.paths()),
        };
        debug!(
            "Walking {} roots relative to {}",
            selection.len(),
            base.display()
        );

        let mut result = TraversalResult::default();
        for root in selection.paths() {
            self.check_cancelled()?;

            if root.is_dir() {
                self.walk_directory(root, 0, &base, &mut result)?;
            } else {
                self.record_extension(root, &mut result);
                self.walk_files(&[root.clone()], 0, &base, &mut result);
            }
        }

        Ok(result)
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            debug!("Walk cancelled");
            return Err(TreeCopyError::Cancelled);
        }
        Ok(())
    }

    /// Walk a directory and everything below it
    pub(crate) fn walk_directory(
        &self,
        dir: &Path,
        depth: usize,
        base: &Path,
        result: &mut TraversalResult,
    ) -> Result<()> {
        self.check_cancelled()?;

        let name = file_name(dir);
        result.tree_lines.push(TreeLine::directory(depth, &name));
        result.entries.push(Entry {
            path: dir.to_path_buf(),
            name,
            kind: EntryKind::Directory,
        });

        let children = match list_children(dir, &self.options) {
            Ok(children) => children,
            Err(e) => {
                warn!("Error listing directory {}: {}", dir.display(), e);
                result.diagnostics.push(Diagnostic {
                    path: dir.to_path_buf(),
                    message: e.to_string(),
                });
                return Ok(());
            }
        };

        if children.is_empty() {
            result.tree_lines.push(TreeLine::empty(depth + 1));
            return Ok(());
        }

        self.walk_children(children, depth + 1, base, result)
    }

    /// Walk already listed children of a directory, subdirectories first.
    ///
    /// A subdirectory that cannot be listed by the time it is reached keeps
    /// its own tree line and a diagnostic; its siblings are still walked.
    pub(crate) fn walk_children(
        &self,
        children: Vec<Child>,
        depth: usize,
        base: &Path,
        result: &mut TraversalResult,
    ) -> Result<()> {
        let (dirs, files): (Vec<Child>, Vec<Child>) =
            children.into_iter().partition(|child| child.is_dir);

        for child in dirs {
            self.walk_directory(&child.path, depth, base, result)?;
        }

        let files: Vec<PathBuf> = files
            .into_iter()
            .inspect(|child| self.record_extension(&child.path, result))
            .filter(|child| self.options.is_allowed(&child.path))
            .map(|child| child.path)
            .collect();
        self.walk_files(&files, depth, base, result);

        Ok(())
    }

    fn record_extension(&self, path: &Path, result: &mut TraversalResult) {
        if let Some(ext) = classify::extension(path) {
            result.file_types.insert(ext);
        }
    }

    /// Read sibling files in parallel, then record them in the given order.
    ///
    /// Text files and unreadable files both add a content block and count as
    /// visited; an unreadable file's block holds the read error.
    fn walk_files(
        &self,
        files: &[PathBuf],
        depth: usize,
        base: &Path,
        result: &mut TraversalResult,
    ) {
        let reads: Vec<FileRead> = files.par_iter().map(|path| self.read_file(path)).collect();

        for read in reads {
            result.tree_lines.push(TreeLine::file(depth, &read.name));

            let content = match read.kind {
                EntryKind::TextFile => Some(read.text.clone()),
                EntryKind::Unreadable => {
                    warn!("Error reading file {}: {}", read.path.display(), read.text);
                    result.diagnostics.push(Diagnostic {
                        path: read.path.clone(),
                        message: read.text.clone(),
                    });
                    Some(format!("error reading file: {}", read.text))
                }
                EntryKind::BinaryFile | EntryKind::Directory => None,
            };

            if let Some(content) = content {
                let rel_path = relative_slash_path(&read.path, base);
                if !result.visited_files.insert(rel_path.clone()) {
                    debug!("Skipping already visited file {}", rel_path);
                    continue;
                }
                result
                    .content_blocks
                    .push(ContentBlock::new(rel_path, &content));
            }

            result.entries.push(Entry {
                path: read.path,
                name: read.name,
                kind: read.kind,
            });
        }
    }

    /// Read and classify a single file
    fn read_file(&self, path: &Path) -> FileRead {
        self.progress.inc(1);

        let name = file_name(path);
        self.progress.set_message(format!("Current file: {}", name));

        let (kind, text) = match self.classify_file(path) {
            Ok(classified) => classified,
            Err(e) => (EntryKind::Unreadable, e.to_string()),
        };

        FileRead {
            path: path.to_path_buf(),
            name,
            kind,
            text,
        }
    }

    fn classify_file(&self, path: &Path) -> io::Result<(EntryKind, String)> {
        let size = fs::metadata(path)?.len();

        if size > self.options.max_file_size {
            let mut sample = Vec::with_capacity(SNIFF_LEN);
            File::open(path)?
                .take(SNIFF_LEN as u64)
                .read_to_end(&mut sample)?;

            if !classify::is_likely_text(&sample) {
                return Ok((EntryKind::BinaryFile, String::new()));
            }

            let message = format!(
                "File too large to include content. Size: {}",
                format_file_size(size)
            );
            return Ok((EntryKind::TextFile, message));
        }

        let bytes = fs::read(path)?;
        if !classify::is_likely_text(&bytes) {
            return Ok((EntryKind::BinaryFile, String::new()));
        }

        match String::from_utf8(bytes) {
            Ok(content) => Ok((EntryKind::TextFile, content)),
            Err(e) => Ok((EntryKind::TextFile, format!("error reading file: {}", e))),
        }
    }
}

/// Common ancestor of the roots, or the parent of a lone file root
pub fn default_base_path(roots: &[PathBuf]) -> PathBuf {
    let ancestor = common_ancestor(roots).unwrap_or_default();

    if ancestor.is_file() {
        ancestor
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(ancestor)
    } else {
        ancestor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn walker() -> TreeWalker {
        TreeWalker::new(WalkOptions::default(), Arc::new(ProgressBar::hidden()))
    }

    #[test]
    fn test_default_base_path() -> io::Result<()> {
        let dir = tempdir()?;
        let root = fs::canonicalize(dir.path())?;
        fs::create_dir(root.join("src"))?;
        fs::write(root.join("src").join("a.rs"), "fn a() {}")?;
        fs::write(root.join("readme.md"), "# hi")?;

        assert_eq!(default_base_path(&[root.join("src")]), root.join("src"));
        assert_eq!(default_base_path(&[root.join("src").join("a.rs")]), root.join("src"));
        assert_eq!(
            default_base_path(&[root.join("src").join("a.rs"), root.join("readme.md")]),
            root
        );

        Ok(())
    }

    #[test]
    fn test_large_file_keeps_placeholder_content() -> io::Result<()> {
        let dir = tempdir()?;
        let mut file = File::create(dir.path().join("large.txt"))?;
        for _ in 0..100 {
            writeln!(file, "a line of plain text")?;
        }

        let options = WalkOptions {
            max_file_size: 64,
            ..WalkOptions::default()
        };
        let walker = TreeWalker::new(options, Arc::new(ProgressBar::hidden()));
        let selection = Selection::new(&[dir.path()]).unwrap();
        let result = walker.walk(&selection, None).unwrap();

        assert_eq!(result.content_blocks.len(), 1);
        assert!(result.content_blocks[0]
            .content
            .starts_with("File too large to include content. Size: "));

        Ok(())
    }

    #[test]
    fn test_invalid_utf8_after_sample_is_reported_inline() -> io::Result<()> {
        let dir = tempdir()?;
        let mut bytes = vec![b'a'; SNIFF_LEN + 10];
        bytes.extend_from_slice(&[0xff, 0xfe, b'b']);
        fs::write(dir.path().join("latin.txt"), &bytes)?;

        let selection = Selection::new(&[dir.path()]).unwrap();
        let result = walker().walk(&selection, None).unwrap();

        assert_eq!(result.visited_files.len(), 1);
        assert!(result.content_blocks[0]
            .content
            .starts_with("error reading file: "));

        Ok(())
    }

    #[test]
    fn test_overlapping_roots_emit_each_file_once() -> io::Result<()> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("src"))?;
        fs::write(dir.path().join("src").join("a.rs"), "fn a() {}")?;

        let selection =
            Selection::new(&[dir.path().to_path_buf(), dir.path().join("src")]).unwrap();
        let result = walker().walk(&selection, None).unwrap();

        assert_eq!(result.content_blocks.len(), 1);
        assert_eq!(result.visited_files.len(), 1);
        assert_eq!(result.count(EntryKind::TextFile), 1);

        Ok(())
    }

    #[test]
    fn test_cancelled_walk() -> io::Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("a.txt"), "A")?;

        let token = CancellationToken::new();
        token.cancel();
        let walker = walker().with_cancellation(token);
        let selection = Selection::new(&[dir.path()]).unwrap();

        assert!(matches!(
            walker.walk(&selection, None),
            Err(TreeCopyError::Cancelled)
        ));

        Ok(())
    }
}
