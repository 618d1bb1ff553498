/*!
 * Directory listing shared by the walker and the compressor
 */

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use log::{debug, warn};
use walkdir::WalkDir;

use crate::config::WalkOptions;
use crate::utils::file_name;

/// A direct child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Child {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
}

/// List the direct children of `dir` that survive the ignore rules.
///
/// Children are sorted directories first, then by name. Symbolic links to
/// directories are skipped so a walk cannot loop. An error is returned only
/// when `dir` itself cannot be read; unreadable children are logged and
/// skipped.
pub fn list_children(dir: &Path, options: &WalkOptions) -> io::Result<Vec<Child>> {
    // Surface an unreadable directory before handing it to the walkers,
    // which would otherwise swallow the error.
    fs::read_dir(dir)?;

    let mut children = if options.respect_gitignore {
        list_with_gitignore(dir, options)
    } else {
        list_plain(dir)
    };

    children.retain(|child| !options.should_ignore(&child.path));
    children.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));

    Ok(children)
}

fn list_plain(dir: &Path) -> Vec<Child> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => {
                let is_link = entry.path_is_symlink();
                to_child(entry.path(), entry.file_type().is_dir(), is_link)
            }
            Err(e) => {
                warn!("Error listing entry in {}: {}", dir.display(), e);
                None
            }
        })
        .collect()
}

fn list_with_gitignore(dir: &Path, options: &WalkOptions) -> Vec<Child> {
    let mut walker = WalkBuilder::new(dir);
    walker.max_depth(Some(1)).hidden(false).require_git(false);

    if let Some(gitignore_path) = &options.gitignore_path {
        walker.add_custom_ignore_filename(gitignore_path);
    }

    walker
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) if entry.depth() == 0 => None,
            Ok(entry) => {
                let file_type = entry.file_type()?;
                to_child(entry.path(), file_type.is_dir(), entry.path_is_symlink())
            }
            Err(e) => {
                warn!("Error listing entry in {}: {}", dir.display(), e);
                None
            }
        })
        .collect()
}

fn to_child(path: &Path, is_dir: bool, is_link: bool) -> Option<Child> {
    if is_link && path.is_dir() {
        debug!("Skipping symlinked directory {}", path.display());
        return None;
    }

    Some(Child {
        path: path.to_path_buf(),
        name: file_name(path),
        is_dir,
    })
}
