/*!
 * Utility functions for treecopy
 */

use std::path::{Component, Path};

use once_cell::sync::Lazy;

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

/// Join the normal components of a path with `/`, whatever the platform
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// `path` relative to `base` with `/` separators.
///
/// Returns `"."` when both are equal and the full path when `path` does not
/// live under `base`.
pub fn relative_slash_path(path: &Path, base: &Path) -> String {
    match path.strip_prefix(base) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => to_slash(rel),
        Err(_) => {
            let full = to_slash(path);
            if path.has_root() {
                format!("/{}", full)
            } else {
                full
            }
        }
    }
}

/// Basename of a path as an owned string
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Entries skipped unless selected explicitly
pub static DEFAULT_IGNORE: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // Version Control
        ".git",
        ".svn",
        ".hg",
        // OS Files
        ".DS_Store",
        "Thumbs.db",
        "desktop.ini",
        // Dependencies
        "node_modules",
        "bower_components",
        ".pnpm-store",
        "package-lock.json",
        "yarn.lock",
        // Build output
        "dist",
        "target",
        "*.min.js",
        "*.min.css",
        "*.tsbuildinfo",
        // Python
        "__pycache__",
        ".pytest_cache",
        ".venv",
        "*.pyc",
        // Editor state
        ".idea",
        ".vscode",
        "*.swp",
        // Caches
        ".cache",
        ".next",
        ".nuxt",
        ".turbo",
        "coverage",
        ".eslintcache",
        // Archives and databases
        "*.zip",
        "*.tar.gz",
        "*.sqlite",
        "*.sqlite3",
    ]
});
