/*!
 * Display anchor resolution for a selection
 */

use std::path::{Component, Path, PathBuf};

use log::debug;

/// Deepest path that is a prefix of every path in `paths`.
///
/// Comparison is component-wise, so `/a/bc` and `/a/b` share `/a`. Returns
/// `None` for an empty slice or when the paths share nothing at all.
pub fn common_ancestor<P: AsRef<Path>>(paths: &[P]) -> Option<PathBuf> {
    let mut iter = paths.iter();
    let first = iter.next()?.as_ref();
    let mut common: Vec<Component> = first.components().collect();

    for path in iter {
        let shared = common
            .iter()
            .zip(path.as_ref().components())
            .take_while(|(a, b)| **a == *b)
            .count();
        common.truncate(shared);
    }

    if common.is_empty() {
        return None;
    }
    Some(common.iter().collect())
}

/// Directory used as the anchor of a compressed listing.
///
/// Starts from `candidate_root` when it contains the whole selection, or
/// from the selection's common ancestor otherwise. When every selected path
/// lies under the same first-level child directory of that anchor, the
/// anchor moves one level down into it. Selections that do not all share
/// that first segment leave the anchor unchanged.
pub fn resolve_common_directory(selection: &[PathBuf], candidate_root: &Path) -> PathBuf {
    let anchor = if selection.iter().all(|p| p.starts_with(candidate_root)) {
        candidate_root.to_path_buf()
    } else {
        let ancestor = common_ancestor(selection).unwrap_or_else(|| candidate_root.to_path_buf());
        if ancestor.is_file() {
            ancestor.parent().map(Path::to_path_buf).unwrap_or(ancestor)
        } else {
            ancestor
        }
    };

    let mut shared_segment = None;
    for path in selection {
        let first = path
            .strip_prefix(&anchor)
            .ok()
            .and_then(|rel| rel.components().next());

        match (first, shared_segment) {
            (Some(Component::Normal(segment)), None) => shared_segment = Some(segment),
            (Some(Component::Normal(segment)), Some(prev)) if segment == prev => {}
            _ => return anchor,
        }
    }

    match shared_segment {
        Some(segment) if anchor.join(segment).is_dir() => {
            let adjusted = anchor.join(segment);
            debug!(
                "Common directory moved from {} to {}",
                anchor.display(),
                adjusted.display()
            );
            adjusted
        }
        _ => anchor,
    }
}
