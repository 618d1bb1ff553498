/*!
 * Core types and data structures for treecopy
 */

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Result, TreeCopyError};

/// Indentation added to a tree line per depth level
pub const INDENT_UNIT: &str = "  ";

/// Marker emitted as the only child of an empty directory
pub const EMPTY_MARKER: &str = "(empty)";

/// Classification of a filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryKind {
    /// Directory containing other entries
    Directory,
    /// Text file with readable content
    TextFile,
    /// Binary file (non-text)
    BinaryFile,
    /// File whose bytes could not be read
    Unreadable,
}

/// A classified filesystem entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Absolute path
    pub path: PathBuf,
    /// Basename
    pub name: String,
    /// Classification made at traversal time
    pub kind: EntryKind,
}

/// Kind of a rendered tree line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineKind {
    Directory,
    File,
    Empty,
}

/// One line of the directory tree, rendered to text in a final pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeLine {
    pub depth: usize,
    pub kind: LineKind,
    pub name: String,
}

impl TreeLine {
    pub fn directory(depth: usize, name: impl Into<String>) -> Self {
        Self {
            depth,
            kind: LineKind::Directory,
            name: name.into(),
        }
    }

    pub fn file(depth: usize, name: impl Into<String>) -> Self {
        Self {
            depth,
            kind: LineKind::File,
            name: name.into(),
        }
    }

    pub fn empty(depth: usize) -> Self {
        Self {
            depth,
            kind: LineKind::Empty,
            name: EMPTY_MARKER.to_string(),
        }
    }

    /// Render this line with its indentation and directory marker
    pub fn render(&self) -> String {
        let indent = INDENT_UNIT.repeat(self.depth);
        match self.kind {
            LineKind::Directory => format!("{}{}/", indent, self.name),
            LineKind::File | LineKind::Empty => format!("{}{}", indent, self.name),
        }
    }
}

/// Contents of one text file, keyed by its display path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentBlock {
    /// Path relative to the base path, `/`-separated
    pub path: String,
    /// File content with trailing whitespace trimmed
    pub content: String,
}

impl ContentBlock {
    pub fn new(path: impl Into<String>, content: &str) -> Self {
        Self {
            path: path.into(),
            content: content.trim_end().to_string(),
        }
    }

    /// Render the block with its path header
    pub fn render(&self) -> String {
        format!("\n--- {} ---\n{}\n", self.path, self.content)
    }
}

/// A recovered problem encountered during a walk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub path: PathBuf,
    pub message: String,
}

/// Everything produced by one walk over a selection
#[derive(Debug, Clone, Default, Serialize)]
pub struct TraversalResult {
    /// Tree lines in traversal order
    pub tree_lines: Vec<TreeLine>,
    /// Lower-cased extensions of every file seen
    pub file_types: BTreeSet<String>,
    /// Relative paths of the text and unreadable files with a content block
    pub visited_files: BTreeSet<String>,
    /// File contents in traversal order
    pub content_blocks: Vec<ContentBlock>,
    /// Every classified entry
    pub entries: Vec<Entry>,
    /// Recovered per-entry problems
    pub diagnostics: Vec<Diagnostic>,
}

impl TraversalResult {
    /// The tree as text, one line per entry
    pub fn tree(&self) -> String {
        self.tree_lines
            .iter()
            .map(TreeLine::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// All content blocks concatenated in order
    pub fn contents(&self) -> String {
        self.content_blocks.iter().map(ContentBlock::render).collect()
    }

    /// Number of entries of the given kind
    pub fn count(&self, kind: EntryKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }
}

/// An ordered, de-duplicated set of absolute paths chosen by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    paths: Vec<PathBuf>,
}

impl Selection {
    /// Canonicalize and de-duplicate the given paths, keeping first occurrences
    pub fn new<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        if paths.is_empty() {
            return Err(TreeCopyError::EmptySelection);
        }

        let mut seen = BTreeSet::new();
        let mut unique = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let abs = fs::canonicalize(path)
                .map_err(|_| TreeCopyError::PathNotFound(path.display().to_string()))?;
            if seen.insert(abs.clone()) {
                unique.push(abs);
            }
        }

        Ok(Self { paths: unique })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_tree_line_render() {
        assert_eq!(TreeLine::directory(0, "src").render(), "src/");
        assert_eq!(TreeLine::file(2, "main.rs").render(), "    main.rs");
        assert_eq!(TreeLine::empty(1).render(), "  (empty)");
    }

    #[test]
    fn test_content_block_trims_trailing_whitespace() {
        let block = ContentBlock::new("a.txt", "X\n\n  \t\n");
        assert_eq!(block.content, "X");
        assert_eq!(block.render(), "\n--- a.txt ---\nX\n");
    }

    #[test]
    fn test_selection_dedup_keeps_order() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "A").unwrap();
        fs::write(&b, "B").unwrap();

        let again = dir.path().join(".").join("a.txt");
        let selection = Selection::new(&[b.clone(), a.clone(), again]).unwrap();

        assert_eq!(selection.len(), 2);
        assert_eq!(selection.paths()[0], fs::canonicalize(&b).unwrap());
        assert_eq!(selection.paths()[1], fs::canonicalize(&a).unwrap());
    }

    #[test]
    fn test_selection_errors() {
        let empty: [PathBuf; 0] = [];
        assert!(matches!(
            Selection::new(&empty),
            Err(TreeCopyError::EmptySelection)
        ));

        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");
        assert!(matches!(
            Selection::new(&[missing]),
            Err(TreeCopyError::PathNotFound(_))
        ));
    }
}
