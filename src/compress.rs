/*!
 * Compressed path listings grouped by parent directory
 */

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use clap::ValueEnum;
use log::{debug, warn};
use serde::Serialize;
use strum::{Display, EnumIter, EnumString};

use crate::cancel::CancellationToken;
use crate::common_dir::resolve_common_directory;
use crate::config::WalkOptions;
use crate::error::{Result, TreeCopyError};
use crate::listing::list_children;
use crate::types::Selection;
use crate::utils::{file_name, relative_slash_path};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const FILE_INDENT: &str = "    ";

/// Verbosity of a compressed listing
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Display,
    EnumString,
    EnumIter,
    ValueEnum,
    Serialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// Tree with branch characters
    Light,
    /// Directory lines followed by `/`-prefixed files
    Medium,
    /// One line per directory
    Hard,
}

impl CompressionLevel {
    /// Parse a level name, case-insensitively
    pub fn parse(name: &str) -> Result<Self> {
        name.trim()
            .parse()
            .map_err(|_| TreeCopyError::InvalidCompressionLevel(name.to_string()))
    }
}

/// File basenames grouped by directory, relative to the common directory.
///
/// Keys remember their insertion order; basenames are kept sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryMap {
    entries: Vec<(String, BTreeSet<String>)>,
    index: HashMap<String, usize>,
}

impl DirectoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `dir` is a key, returning its file set
    pub fn ensure_dir(&mut self, dir: &str) -> &mut BTreeSet<String> {
        let idx = match self.index.get(dir) {
            Some(&idx) => idx,
            None => {
                self.entries.push((dir.to_string(), BTreeSet::new()));
                self.index.insert(dir.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    /// Record a file basename under `dir`
    pub fn insert(&mut self, dir: &str, file: impl Into<String>) {
        self.ensure_dir(dir).insert(file.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.entries.iter().map(|(dir, files)| (dir.as_str(), files))
    }

    /// Keys in lexicographic order, with the common directory's own `.` first
    pub fn sorted(&self) -> Vec<(&str, &BTreeSet<String>)> {
        let mut sorted: Vec<_> = self.iter().collect();
        sorted.sort_by(|a, b| (a.0 != ".").cmp(&(b.0 != ".")).then_with(|| a.0.cmp(b.0)));
        sorted
    }
}

impl<D, F, I> FromIterator<(D, I)> for DirectoryMap
where
    D: AsRef<str>,
    F: Into<String>,
    I: IntoIterator<Item = F>,
{
    fn from_iter<T: IntoIterator<Item = (D, I)>>(iter: T) -> Self {
        let mut map = DirectoryMap::new();
        for (dir, files) in iter {
            let set = map.ensure_dir(dir.as_ref());
            set.extend(files.into_iter().map(Into::into));
        }
        map
    }
}

/// Builds and renders compressed listings of a selection
pub struct PathCompressor {
    options: WalkOptions,
    cancel: CancellationToken,
}

impl PathCompressor {
    pub fn new(options: WalkOptions) -> Self {
        Self {
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Abandon map construction once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Resolve the common directory, build the map and render it at `level`
    pub fn compress(
        &self,
        selection: &Selection,
        candidate_root: &Path,
        level: CompressionLevel,
    ) -> Result<String> {
        let common_dir = resolve_common_directory(selection.paths(), candidate_root);
        let map = self.build_map(selection, &common_dir)?;
        debug!(
            "Rendering {} directories at {} level under {}",
            map.len(),
            level,
            common_dir.display()
        );

        Ok(render(level, &common_dir, &map))
    }

    /// Group the files of `selection` by directory relative to `common_dir`.
    ///
    /// A directory becomes a key when it directly holds a recorded file or
    /// has no entries at all. Keys are inserted in pre-order.
    pub fn build_map(&self, selection: &Selection, common_dir: &Path) -> Result<DirectoryMap> {
        let mut map = DirectoryMap::new();

        for root in selection.paths() {
            self.check_cancelled()?;

            if root.is_dir() {
                self.collect_directory(root, common_dir, &mut map)?;
            } else {
                let parent = root.parent().unwrap_or(common_dir);
                map.insert(&relative_slash_path(parent, common_dir), file_name(root));
            }
        }

        Ok(map)
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(TreeCopyError::Cancelled);
        }
        Ok(())
    }

    /// Record the files below `dir`; a directory that cannot be listed adds nothing
    pub(crate) fn collect_directory(
        &self,
        dir: &Path,
        common_dir: &Path,
        map: &mut DirectoryMap,
    ) -> Result<()> {
        self.check_cancelled()?;

        let children = match list_children(dir, &self.options) {
            Ok(children) => children,
            Err(e) => {
                warn!("Error listing directory {}: {}", dir.display(), e);
                return Ok(());
            }
        };

        let files: Vec<String> = children
            .iter()
            .filter(|child| !child.is_dir && self.options.is_allowed(&child.path))
            .map(|child| child.name.clone())
            .collect();

        if children.is_empty() || !files.is_empty() {
            map.ensure_dir(&relative_slash_path(dir, common_dir))
                .extend(files);
        }

        for child in children.iter().filter(|child| child.is_dir) {
            self.collect_directory(&child.path, common_dir, map)?;
        }

        Ok(())
    }
}

/// Render `map` at `level`, prefixed by the common directory
pub fn render(level: CompressionLevel, common_dir: &Path, map: &DirectoryMap) -> String {
    let lines = match level {
        CompressionLevel::Light => render_light(map),
        CompressionLevel::Medium => render_medium(map),
        CompressionLevel::Hard => render_hard(map),
    };

    format!("{}\n{}", common_dir.display(), lines.join("\n"))
}

/// `<dir>\<a>,<b>` per key, keys left in insertion order
fn render_hard(map: &DirectoryMap) -> Vec<String> {
    map.iter()
        .map(|(dir, files)| {
            if files.is_empty() {
                dir.to_string()
            } else {
                let names: Vec<&str> = files.iter().map(String::as_str).collect();
                format!("{}\\{}", dir, names.join(","))
            }
        })
        .collect()
}

fn render_medium(map: &DirectoryMap) -> Vec<String> {
    let mut lines = Vec::new();

    for (dir, files) in map.sorted() {
        if dir == "." {
            lines.extend(files.iter().cloned());
        } else {
            lines.push(dir.to_string());
            lines.extend(files.iter().map(|f| format!("/{}", f)));
        }
    }

    lines
}

fn render_light(map: &DirectoryMap) -> Vec<String> {
    let sorted = map.sorted();
    let mut lines = Vec::new();

    for (i, (dir, files)) in sorted.iter().enumerate() {
        let last_dir = i + 1 == sorted.len();

        if *dir == "." {
            // Top-level files share their level with the directory keys
            for (j, file) in files.iter().enumerate() {
                let last = last_dir && j + 1 == files.len();
                lines.push(format!("{}{}", branch(last), file));
            }
        } else {
            lines.push(format!("{}{}", branch(last_dir), dir));
            for (j, file) in files.iter().enumerate() {
                lines.push(format!("{}{}{}", FILE_INDENT, branch(j + 1 == files.len()), file));
            }
        }
    }

    lines
}

fn branch(last: bool) -> &'static str {
    if last {
        LAST_BRANCH
    } else {
        BRANCH
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io;
    use tempfile::tempdir;

    fn sample_map() -> DirectoryMap {
        vec![
            ("src", vec!["b.ts", "a.ts"]),
            (".", vec!["readme.md"]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(CompressionLevel::parse("light").unwrap(), CompressionLevel::Light);
        assert_eq!(CompressionLevel::parse("MEDIUM").unwrap(), CompressionLevel::Medium);
        assert_eq!(CompressionLevel::parse(" Hard ").unwrap(), CompressionLevel::Hard);
        assert!(matches!(
            CompressionLevel::parse("extreme"),
            Err(TreeCopyError::InvalidCompressionLevel(_))
        ));
        assert_eq!(CompressionLevel::Medium.to_string(), "medium");
    }

    #[test]
    fn test_render_light() {
        let output = render(CompressionLevel::Light, Path::new("/proj"), &sample_map());
        assert_eq!(
            output,
            "/proj\n├── readme.md\n└── src\n    ├── a.ts\n    └── b.ts"
        );
    }

    #[test]
    fn test_render_light_root_files_only() {
        let map: DirectoryMap = vec![(".", vec!["a.md", "b.md"])].into_iter().collect();
        let output = render(CompressionLevel::Light, Path::new("/proj"), &map);
        assert_eq!(output, "/proj\n├── a.md\n└── b.md");
    }

    #[test]
    fn test_render_medium() {
        let output = render(CompressionLevel::Medium, Path::new("/proj"), &sample_map());
        assert_eq!(output, "/proj\nreadme.md\nsrc\n/a.ts\n/b.ts");
    }

    #[test]
    fn test_sorted_puts_common_directory_first() {
        let map: DirectoryMap = vec![("-assets", vec!["logo.svg"]), (".", vec!["readme.md"])]
            .into_iter()
            .collect();

        let keys: Vec<&str> = map.sorted().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![".", "-assets"]);

        let medium = render(CompressionLevel::Medium, Path::new("/proj"), &map);
        assert_eq!(medium, "/proj\nreadme.md\n-assets\n/logo.svg");

        let light = render(CompressionLevel::Light, Path::new("/proj"), &map);
        assert_eq!(light, "/proj\n├── readme.md\n└── -assets\n    └── logo.svg");
    }

    #[test]
    fn test_render_hard_keeps_insertion_order() {
        let mut map = sample_map();
        map.ensure_dir("assets/empty");
        let output = render(CompressionLevel::Hard, Path::new("/proj"), &map);
        assert_eq!(output, "/proj\nsrc\\a.ts,b.ts\n.\\readme.md\nassets/empty");
    }

    #[test]
    fn test_build_map() -> io::Result<()> {
        let dir = tempdir()?;
        let root = fs::canonicalize(dir.path())?;
        fs::create_dir_all(root.join("src").join("util"))?;
        fs::create_dir(root.join("docs"))?;
        fs::create_dir(root.join("empty"))?;
        fs::write(root.join("readme.md"), "# readme")?;
        fs::write(root.join("src").join("main.rs"), "fn main() {}")?;
        fs::write(root.join("src").join("util").join("mod.rs"), "")?;
        fs::write(root.join("docs").join("logo.png"), [0u8, 1, 2])?;

        let options = WalkOptions::default().with_extensions(&["rs", "md"]);
        let compressor = PathCompressor::new(options);
        let selection = Selection::new(&[root.clone()]).unwrap();
        let map = compressor.build_map(&selection, &root).unwrap();

        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![".", "empty", "src", "src/util"]);

        let (_, src_files) = map.iter().find(|(k, _)| *k == "src").unwrap();
        assert_eq!(src_files.iter().collect::<Vec<_>>(), vec!["main.rs"]);

        Ok(())
    }

    #[test]
    fn test_unlistable_directory_keeps_siblings() -> io::Result<()> {
        let dir = tempdir()?;
        let root = fs::canonicalize(dir.path())?;
        fs::create_dir(root.join("kept"))?;
        fs::write(root.join("kept").join("a.rs"), "")?;

        let compressor = PathCompressor::new(WalkOptions::default());
        let mut map = DirectoryMap::new();
        compressor
            .collect_directory(&root.join("gone"), &root, &mut map)
            .unwrap();
        assert!(map.is_empty());

        compressor
            .collect_directory(&root.join("kept"), &root, &mut map)
            .unwrap();
        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["kept"]);

        Ok(())
    }

    #[test]
    fn test_compress_selected_files() -> io::Result<()> {
        let dir = tempdir()?;
        let ws = fs::canonicalize(dir.path())?;
        fs::create_dir_all(ws.join("proj").join("src"))?;
        fs::write(ws.join("proj").join("readme.md"), "# proj")?;
        fs::write(ws.join("proj").join("src").join("b.ts"), "b")?;
        fs::write(ws.join("proj").join("src").join("a.ts"), "a")?;

        let selection = Selection::new(&[
            ws.join("proj").join("src").join("b.ts"),
            ws.join("proj").join("readme.md"),
            ws.join("proj").join("src").join("a.ts"),
        ])
        .unwrap();
        let compressor = PathCompressor::new(WalkOptions::default());
        let output = compressor
            .compress(&selection, &ws, CompressionLevel::Medium)
            .unwrap();

        assert_eq!(
            output,
            format!("{}\nreadme.md\nsrc\n/a.ts\n/b.ts", ws.join("proj").display())
        );

        Ok(())
    }
}
