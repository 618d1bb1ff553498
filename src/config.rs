/*!
 * Configuration handling for treecopy
 */

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};
use clap_complete::Shell;
use glob_match::glob_match;

use crate::classify;
use crate::compress::CompressionLevel;
use crate::error::{Result, TreeCopyError};
use crate::utils::DEFAULT_IGNORE;
use crate::{bail, ensure};

/// Content size limit used when none is configured (1 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576;

/// Command-line arguments for treecopy
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "treecopy",
    version = env!("CARGO_PKG_VERSION"),
    about = "Render selected files and folders as a directory tree with contents",
    long_about = concat!(
        "Walks the selected files and folders and prints a directory tree followed by ",
        "the contents of every text file, or a compressed listing of the selected paths."
    )
)]
pub struct Args {
    /// Files or directories to include
    #[clap(required_unless_present = "generate")]
    pub paths: Vec<String>,

    /// Directory that displayed paths are relative to (defaults to the common ancestor)
    #[clap(long)]
    pub base: Option<String>,

    /// Print a compressed path listing at the given level instead of the tree and contents
    #[clap(long, value_enum)]
    pub compress: Option<CompressionLevel>,

    /// Candidate root for the compressed listing (defaults to the current directory)
    #[clap(long)]
    pub root: Option<String>,

    /// Comma-separated list of patterns to ignore
    #[clap(long, value_delimiter = ',')]
    pub ignore_patterns: Vec<String>,

    /// Comma-separated list of file extensions to include (if specified, only these are included)
    #[clap(long, value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Respect .gitignore files
    #[clap(long)]
    pub respect_gitignore: bool,

    /// Name of an additional gitignore-style file to respect
    #[clap(long)]
    pub gitignore_path: Option<String>,

    /// Files larger than this many bytes are listed without their content
    #[clap(long, default_value_t = DEFAULT_MAX_FILE_SIZE)]
    pub max_file_size: u64,

    /// Number of threads to use for reading files
    #[clap(long, default_value = "4")]
    pub threads: usize,

    /// Write output to this file instead of stdout
    #[clap(short, long)]
    pub output: Option<String>,

    /// Print the traversal result as JSON
    #[clap(long, conflicts_with = "compress")]
    pub json: bool,

    /// Print a summary table to stderr when done
    #[clap(long)]
    pub report: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Filtering and reading options shared by the walker and the compressor
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Glob patterns matched against basenames
    pub ignore_patterns: Vec<String>,
    /// Lower-cased extensions to include; empty means all
    pub allowed_extensions: Vec<String>,
    /// Whether to respect .gitignore files
    pub respect_gitignore: bool,
    /// Extra gitignore-style file name to respect
    pub gitignore_path: Option<PathBuf>,
    /// Files above this size are listed without content
    pub max_file_size: u64,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            ignore_patterns: Vec::new(),
            allowed_extensions: Vec::new(),
            respect_gitignore: false,
            gitignore_path: None,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl WalkOptions {
    /// Restrict file contents to the given extensions (leading dots are stripped)
    pub fn with_extensions<S: AsRef<str>>(mut self, extensions: &[S]) -> Self {
        self.allowed_extensions = normalize_extensions(extensions);
        self
    }

    /// Add basename glob patterns to ignore
    pub fn with_ignore_patterns<S: AsRef<str>>(mut self, patterns: &[S]) -> Self {
        self.ignore_patterns
            .extend(patterns.iter().map(|p| p.as_ref().to_string()));
        self
    }

    /// Check if an entry should be ignored based on patterns and defaults
    pub fn should_ignore(&self, path: &Path) -> bool {
        let file_name = path.file_name().unwrap_or_default().to_string_lossy();

        if self
            .ignore_patterns
            .iter()
            .any(|pattern| glob_match(pattern, &file_name))
        {
            return true;
        }

        DEFAULT_IGNORE
            .iter()
            .any(|&pattern| pattern == file_name || glob_match(pattern, &file_name))
    }

    /// Check if a file passes the extension allow-list
    pub fn is_allowed(&self, path: &Path) -> bool {
        if self.allowed_extensions.is_empty() {
            return true;
        }

        classify::extension(path)
            .map(|ext| self.allowed_extensions.iter().any(|a| *a == ext))
            .unwrap_or(false)
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Selected roots, in selection order
    pub paths: Vec<PathBuf>,
    /// Base for relative paths in the walk output
    pub base_path: Option<PathBuf>,
    /// Compressed listing level, if requested
    pub compression: Option<CompressionLevel>,
    /// Candidate root for the compressed listing
    pub candidate_root: PathBuf,
    /// Filtering options
    pub walk: WalkOptions,
    /// Number of threads to use for reading files
    pub num_threads: usize,
    /// Output file; stdout when absent
    pub output_file: Option<PathBuf>,
    /// Emit JSON instead of text
    pub json: bool,
    /// Print a summary table when done
    pub report: bool,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Self {
        let candidate_root = match args.root {
            Some(root) => PathBuf::from(root),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        };

        Self {
            paths: args.paths.into_iter().map(PathBuf::from).collect(),
            base_path: args.base.map(PathBuf::from),
            compression: args.compress,
            candidate_root,
            walk: WalkOptions {
                ignore_patterns: args.ignore_patterns,
                allowed_extensions: normalize_extensions(&args.extensions),
                respect_gitignore: args.respect_gitignore,
                gitignore_path: args.gitignore_path.map(PathBuf::from),
                max_file_size: args.max_file_size,
            },
            num_threads: args.threads,
            output_file: args.output.map(PathBuf::from),
            json: args.json,
            report: args.report,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.paths.is_empty() {
            return Err(TreeCopyError::EmptySelection);
        }

        for path in &self.paths {
            ensure!(path.exists(), PathNotFound, "{}", path.display());
        }

        if let Some(base) = &self.base_path {
            ensure!(
                base.is_dir(),
                Config,
                "Base path is not a directory: {}",
                base.display()
            );
        }

        if self.compression.is_some() && !self.candidate_root.is_dir() {
            bail!(
                Config,
                "Root is not a directory: {}",
                self.candidate_root.display()
            );
        }

        ensure!(self.num_threads > 0, InvalidArgument, "threads must be at least 1");

        if let Some(parent) = self.output_file.as_ref().and_then(|p| p.parent()) {
            if !parent.exists() && parent != Path::new("") {
                bail!(Config, "Output directory not found: {}", parent.display());
            }
        }

        if let Some(path) = &self.walk.gitignore_path {
            if path.components().count() > 1 && !path.exists() {
                bail!(Config, "Custom gitignore file not found: {}", path.display());
            }
        }

        Ok(())
    }
}

fn normalize_extensions<S: AsRef<str>>(extensions: &[S]) -> Vec<String> {
    extensions
        .iter()
        .map(|e| e.as_ref().trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_should_ignore_defaults_and_patterns() {
        let options = WalkOptions::default().with_ignore_patterns(&["*.log", "secret*"]);

        assert!(options.should_ignore(Path::new("/p/.git")));
        assert!(options.should_ignore(Path::new("/p/node_modules")));
        assert!(options.should_ignore(Path::new("/p/app.min.js")));
        assert!(options.should_ignore(Path::new("/p/debug.log")));
        assert!(options.should_ignore(Path::new("/p/secrets.txt")));
        assert!(!options.should_ignore(Path::new("/p/src")));
        assert!(!options.should_ignore(Path::new("/p/main.rs")));
    }

    #[test]
    fn test_extension_allow_list() {
        let options = WalkOptions::default().with_extensions(&[".RS", "md", " "]);
        assert_eq!(options.allowed_extensions, vec!["rs", "md"]);

        assert!(options.is_allowed(Path::new("lib.rs")));
        assert!(options.is_allowed(Path::new("README.MD")));
        assert!(!options.is_allowed(Path::new("index.ts")));
        assert!(!options.is_allowed(Path::new("Makefile")));

        assert!(WalkOptions::default().is_allowed(Path::new("Makefile")));
    }

    #[test]
    fn test_from_args() {
        let args = Args::parse_from([
            "treecopy",
            "src",
            "README.md",
            "--compress",
            "medium",
            "--root",
            "/proj",
            "--extensions",
            "rs,.TOML",
            "--ignore-patterns",
            "*.lock",
            "-vv",
        ]);
        assert_eq!(args.verbose, 2);

        let config = Config::from_args(args);
        assert_eq!(
            config.paths,
            vec![PathBuf::from("src"), PathBuf::from("README.md")]
        );
        assert_eq!(config.compression, Some(CompressionLevel::Medium));
        assert_eq!(config.candidate_root, PathBuf::from("/proj"));
        assert_eq!(config.walk.allowed_extensions, vec!["rs", "toml"]);
        assert_eq!(config.walk.ignore_patterns, vec!["*.lock"]);
        assert_eq!(config.walk.max_file_size, DEFAULT_MAX_FILE_SIZE);
    }

    #[test]
    fn test_invalid_compression_level_is_rejected_by_parser() {
        let result = Args::try_parse_from(["treecopy", "src", "--compress", "extreme"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate() {
        let dir = tempdir().unwrap();
        let args = Args::parse_from(["treecopy", dir.path().to_str().unwrap()]);
        let config = Config::from_args(args);
        assert!(config.validate().is_ok());

        let mut missing = config.clone();
        missing.paths = vec![dir.path().join("nope")];
        assert!(matches!(
            missing.validate(),
            Err(TreeCopyError::PathNotFound(_))
        ));

        let mut empty = config.clone();
        empty.paths.clear();
        assert!(matches!(empty.validate(), Err(TreeCopyError::EmptySelection)));

        let mut no_threads = config;
        no_threads.num_threads = 0;
        assert!(matches!(
            no_threads.validate(),
            Err(TreeCopyError::InvalidArgument(_))
        ));
    }
}
